//! Tests for the Merkle Sum Sparse Merkle Tree implementation
use std::convert::Infallible;

use hex_literal::hex;
use proptest::prelude::*;
use sha2::Sha256;

use crate::{
    node::{Branch, CompactLeaf, Hasher, Leaf, Node},
    tree::{CompactMSSMT, EmptyTree, MSSMT},
    ComputedNode, Db, MemoryDb, ThreadSafe,
};

type Tree = MSSMT<32, Sha256, Infallible>;
type CompactTree = CompactMSSMT<32, Sha256, Infallible>;

fn trees() -> (Tree, CompactTree) {
    (
        MSSMT::new(Box::new(MemoryDb::default())),
        CompactMSSMT::new(Box::new(MemoryDb::default())),
    )
}

#[test]
fn test_empty_tree() {
    let (tree, compact_tree) = trees();
    let empty_root = hex!("b1e8e8f2dc3b266452988cfe169aa73be25405eeead02ab5dd6b3c6fd0ca8d67");
    assert_eq!(tree.root().unwrap().hash(), empty_root);
    assert_eq!(compact_tree.root().unwrap().hash(), empty_root);
    assert_eq!(tree.root().unwrap().sum(), 0);
}

#[test]
fn test_leaves_insertion() {
    let (mut tree, mut compact_tree) = trees();
    let expected = [
        hex!("b46e250d98aa9917abdd1012f72c03ab9a59f6de5253d963a99b7d69c2eca3da"),
        hex!("dc5ab9a0f0b56e215b550b2946cdc72aae2b013aa4790ee4d809a9b43cf2d9aa"),
        hex!("37cb0517efdaaeb2c2c32fac206d8f14070864a1fd69d5368127dba161569ca2"),
    ];
    for (byte, root) in [1u8, 2, 3].into_iter().zip(expected) {
        let leaf = Leaf::new([byte; 32].to_vec(), byte as u64);
        tree.insert([byte; 32], leaf.clone()).unwrap();
        compact_tree.insert([byte; 32], leaf).unwrap();
        assert_eq!(tree.root().unwrap().hash(), root);
        assert_eq!(compact_tree.root().unwrap().hash(), root);
    }
    assert_eq!(tree.root().unwrap().sum(), 6);
}

#[test]
fn test_history_independant() {
    let (mut tree, mut compact_tree) = trees();
    for byte in [1u8, 3, 2] {
        tree.insert([byte; 32], Leaf::new([byte; 32].to_vec(), byte as u64))
            .unwrap();
    }
    for byte in [2u8, 3, 1] {
        compact_tree
            .insert([byte; 32], Leaf::new([byte; 32].to_vec(), byte as u64))
            .unwrap();
    }
    let expected = hex!("37cb0517efdaaeb2c2c32fac206d8f14070864a1fd69d5368127dba161569ca2");
    assert_eq!(tree.root().unwrap().hash(), expected);
    assert_eq!(compact_tree.root().unwrap().hash(), expected);
}

#[test]
fn test_keys_splitting_on_last_bit() {
    // the compact tree stores these two as plain leaves at the bottom level
    let k1 = [0u8; 32];
    let mut k2 = [0u8; 32];
    k2[31] = 0x80;

    let (mut tree, mut compact_tree) = trees();
    for (key, leaf) in [(k1, Leaf::new(vec![1], 1)), (k2, Leaf::new(vec![2], 2))] {
        tree.insert(key, leaf.clone()).unwrap();
        compact_tree.insert(key, leaf).unwrap();
    }
    let expected = hex!("eacd84cd4e9c8f40e039300610c6bfd6ba59f04baab28d6536b7d8449184f034");
    assert_eq!(tree.root().unwrap().hash(), expected);
    assert_eq!(compact_tree.root().unwrap().hash(), expected);

    tree.insert(k1, Leaf::new(vec![3], 5)).unwrap();
    compact_tree.insert(k1, Leaf::new(vec![3], 5)).unwrap();
    let expected = hex!("eccfc2bb7bcb3ca5df7061380e59a0657cae881725371cf80bb9260b9149701a");
    assert_eq!(tree.root().unwrap().hash(), expected);
    assert_eq!(compact_tree.root().unwrap().hash(), expected);
    assert_eq!(compact_tree.get(&k1).unwrap().value(), &[3]);
    assert_eq!(compact_tree.get(&k2).unwrap().value(), &[2]);
}

#[test]
fn test_insertion() {
    // tests that branches and leaves stored in the database are found back as
    // the children of their parent.
    fn test_children<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone + ThreadSafe>(
        leaves: Vec<Leaf<HASH_SIZE, H>>,
        compact_leaves: Vec<CompactLeaf<HASH_SIZE, H>>,
        check_branches: Vec<Vec<Branch<HASH_SIZE, H>>>,
        top_level: usize,
    ) {
        let mut db = MemoryDb::<HASH_SIZE, H>::default();
        for leaf in leaves {
            db.insert_leaf(leaf).unwrap();
        }
        for compact in compact_leaves {
            db.insert_compact_leaf(compact).unwrap();
        }
        for branches in check_branches.clone() {
            for branch in branches {
                db.insert_branch(branch).unwrap();
            }
        }
        for (index, level) in check_branches.into_iter().enumerate() {
            for branch in level {
                let (left, right) = db.get_children(top_level + index, branch.hash()).unwrap();
                assert_eq!(branch.left().hash(), left.hash());
                assert_eq!(branch.right().hash(), right.hash());
            }
        }
    }
    let empty_tree = EmptyTree::<32, Sha256>::empty_tree();
    let l1 = Leaf::<32, Sha256>::new([1; 32].to_vec(), 1);
    let l2 = Leaf::<32, Sha256>::new([2; 32].to_vec(), 2);
    let l3 = Leaf::<32, Sha256>::new([3; 32].to_vec(), 3);
    let l4 = Leaf::<32, Sha256>::new([4; 32].to_vec(), 4);
    let branch_l1_l2 = Branch::new(Node::Leaf(l1.clone()), Node::Leaf(l2.clone()));
    let branch_l3_l4 = Branch::new(Node::Leaf(l3.clone()), Node::Leaf(l4.clone()));
    let branch_el_l1 = Branch::new(Node::new_empty_leaf(), Node::Leaf(l1.clone()));

    //       R
    //     /  \
    //    B1  Empty
    //   /  \
    //  L1  L2
    let root_branch = Branch::new(Node::Branch(branch_l1_l2.clone()), empty_tree[255].clone());
    test_children(
        vec![l1.clone(), l2.clone()],
        vec![],
        vec![vec![root_branch], vec![branch_l1_l2.clone()]],
        254,
    );

    //         R
    //       /  \
    //   Empty  B2
    //         /  \
    //     Empty  L1
    let root_branch = Branch::new(empty_tree[255].clone(), Node::Branch(branch_el_l1.clone()));
    test_children(
        vec![l1.clone()],
        vec![],
        vec![vec![root_branch], vec![branch_el_l1]],
        254,
    );

    //             R
    //           /  \
    //         B3    B4
    //        /  \  /  \
    //      B1   E E   B2
    //     / \        /  \
    //    L1 L2      L3  L4
    let b3 = Branch::new(Node::Branch(branch_l1_l2.clone()), empty_tree[255].clone());
    let b4 = Branch::new(empty_tree[255].clone(), Node::Branch(branch_l3_l4.clone()));
    let root_branch = Branch::new(Node::Branch(b3.clone()), Node::Branch(b4.clone()));
    test_children(
        vec![l1.clone(), l2.clone(), l3.clone(), l4.clone()],
        vec![],
        vec![
            vec![root_branch],
            vec![b3, b4],
            vec![branch_l1_l2, branch_l3_l4],
        ],
        253,
    );

    //            R
    //          /   \
    //        B2     B3
    //       /  \   /  \
    //     B1  CL3 CL4 E
    //    /  \
    //  CL1 CL2
    let cl1 = CompactLeaf::new(100, [1; 32], l1, &empty_tree);
    let cl2 = CompactLeaf::new(100, [2; 32], l2, &empty_tree);
    let cl3 = CompactLeaf::new(99, [3; 32], l3, &empty_tree);
    let cl4 = CompactLeaf::new(99, [4; 32], l4, &empty_tree);
    let b1 = Branch::new(Node::Compact(cl1.clone()), Node::Compact(cl2.clone()));
    let b2 = Branch::new(Node::Branch(b1.clone()), Node::Compact(cl3.clone()));
    let b3 = Branch::new(Node::Compact(cl4.clone()), empty_tree[99].clone());
    let root_branch = Branch::new(Node::Branch(b2.clone()), Node::Branch(b3.clone()));
    test_children(
        vec![],
        vec![cl1, cl2, cl3, cl4],
        vec![vec![root_branch], vec![b2, b3], vec![b1]],
        97,
    );
}

#[test]
fn test_layouts_give_the_same_proofs() {
    let (mut tree, mut compact_tree) = trees();
    for byte in [1u8, 2, 3, 200] {
        let leaf = Leaf::new(vec![byte], byte as u64);
        tree.insert([byte; 32], leaf.clone()).unwrap();
        compact_tree.insert([byte; 32], leaf).unwrap();
    }
    for key in [[1u8; 32], [200; 32], [7; 32]] {
        assert_eq!(
            tree.merkle_proof(&key).unwrap(),
            compact_tree.merkle_proof(&key).unwrap()
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_layouts_agree(
        entries in proptest::collection::btree_map(any::<[u8; 32]>(), (1u8..=255, 0u64..1 << 40), 1..12)
    ) {
        let (mut tree, mut compact_tree) = trees();
        for (key, (value, sum)) in &entries {
            tree.insert(*key, Leaf::new(vec![*value], *sum)).unwrap();
            compact_tree.insert(*key, Leaf::new(vec![*value], *sum)).unwrap();
        }
        let root = tree.root().unwrap();
        prop_assert_eq!(root.hash(), compact_tree.root().unwrap().hash());
        prop_assert_eq!(root.sum(), entries.values().map(|(_, sum)| sum).sum::<u64>());

        let root = ComputedNode::new(root.hash(), root.sum());
        for (key, (value, sum)) in &entries {
            let proof = compact_tree.inclusion_proof(key).unwrap();
            prop_assert!(proof.verify_inclusion(key, Leaf::new(vec![*value], *sum), &root));
            prop_assert!(!proof.verify_inclusion(key, Leaf::new(vec![*value], *sum + 1), &root));
        }
    }
}
