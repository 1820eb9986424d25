//! A compact representation of a Merkle Sum Sparse Merkle Tree (MS-SMT).
//!
//! Subtrees that contain a single leaf are stored as one compacted leaf instead
//! of a chain of branches down to the leaf. Roots and proofs are identical to
//! the ones of the full [`super::MSSMT`].

use std::marker::PhantomData;

use crate::{
    node::{Branch, CompactLeaf, Hasher, Leaf, Node},
    Db, Proof, TreeError,
};

use super::bit_index;

/// A compact Merkle Sum Sparse Merkle Tree implementation.
///
/// # Type Parameters
///
/// * `HASH_SIZE`: The size of the hash output in bytes
/// * `H`: The hash function implementation that implements the [`Hasher`] trait
/// * `DbError`: The error type of the node store
pub struct CompactMSSMT<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, DbError> {
    db: Box<dyn Db<HASH_SIZE, H, DbError = DbError>>,
    _phantom: PhantomData<H>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, DbError>
    CompactMSSMT<HASH_SIZE, H, DbError>
{
    pub fn new(db: Box<dyn Db<HASH_SIZE, H, DbError = DbError>>) -> Self {
        Self {
            db,
            _phantom: PhantomData,
        }
    }

    /// Returns the maximum number of levels in the tree (HASH_SIZE * 8)
    pub const fn max_levels() -> usize {
        HASH_SIZE * 8
    }

    pub fn db(&self) -> &dyn Db<HASH_SIZE, H, DbError = DbError> {
        self.db.as_ref()
    }

    /// Root node of the tree, the empty root until something is inserted.
    pub fn root(&self) -> Result<Branch<HASH_SIZE, H>, TreeError<DbError>> {
        if let Some(branch) = self.db.get_root_node() {
            return Ok(branch);
        }
        match &self.db.empty_tree()[0] {
            Node::Branch(branch) => Ok(branch.clone()),
            _ => Err(TreeError::ExpectedBranch),
        }
    }

    /// Walks down the tree following `path`, calling `for_each` at each level with
    /// the height, the next node, its sibling and the current node.
    ///
    /// Compacted leaves met on the way are extracted back into branches so the
    /// callback sees exactly what a full tree would show.
    pub fn walk_down(
        &self,
        path: &[u8; HASH_SIZE],
        mut for_each: impl FnMut(usize, &Node<HASH_SIZE, H>, &Node<HASH_SIZE, H>, &Node<HASH_SIZE, H>),
    ) -> Result<Leaf<HASH_SIZE, H>, TreeError<DbError>> {
        let empty_tree = self.db.empty_tree();
        let mut current = Node::Branch(self.root()?);
        for i in 0..Self::max_levels() {
            let (left, right) = self.db.get_children(i, current.hash())?;
            let (next, sibling) = Self::step_order(i, path, left, right);
            let compact = match next {
                Node::Compact(compact) => compact,
                next => {
                    for_each(i, &next, &sibling, &current);
                    current = next;
                    continue;
                }
            };

            // Rebuild the compacted branches on the path, and the sibling's
            // if it is compacted too, then finish the walk on them.
            let mut next = compact.extract(i, &empty_tree);
            let mut sibling = match sibling {
                Node::Compact(comp_sibling) => comp_sibling.extract(i, &empty_tree),
                other => other,
            };
            for j in i..Self::max_levels() {
                for_each(j, &next, &sibling, &current);
                current = next.clone();
                if j < Self::max_levels() - 1 {
                    let Node::Branch(branch) = &current else {
                        return Err(TreeError::ExpectedBranch);
                    };
                    (next, sibling) = Self::step_order(
                        j + 1,
                        path,
                        branch.left().clone(),
                        branch.right().clone(),
                    );
                }
            }
            break;
        }
        let Node::Leaf(leaf) = current else {
            return Err(TreeError::ExpectedLeaf);
        };
        Ok(leaf)
    }

    /// Creates a common subtree from two leaves that share a partial path,
    /// returning the branch at `height` that roots it.
    fn merge(
        &mut self,
        height: usize,
        key1: [u8; HASH_SIZE],
        leaf1: Leaf<HASH_SIZE, H>,
        key2: [u8; HASH_SIZE],
        leaf2: Leaf<HASH_SIZE, H>,
    ) -> Result<Branch<HASH_SIZE, H>, TreeError<DbError>> {
        let empty_tree = self.db.empty_tree();
        // Length of the common prefix.
        let mut i = 0;
        while i < Self::max_levels() && bit_index(i, &key1) == bit_index(i, &key2) {
            i += 1;
        }

        // The keys diverge at `i`: both leaves become compacted children of a
        // new branch at that height.
        let node1 = CompactLeaf::new(i + 1, key1, leaf1.clone(), &empty_tree);
        let node2 = CompactLeaf::new(i + 1, key2, leaf2.clone(), &empty_tree);
        self.db.insert_leaf(leaf1)?;
        self.db.insert_leaf(leaf2)?;
        self.db.insert_compact_leaf(node1.clone())?;
        self.db.insert_compact_leaf(node2.clone())?;
        let (left, right) = Self::step_order(i, &key1, Node::Compact(node1), Node::Compact(node2));
        let mut parent = Branch::new(left, right);
        self.db.insert_branch(parent.clone())?;

        // Walk up to `height`, pairing with empty subtrees along the shared prefix.
        for level in (height..i).rev() {
            let (left, right) = Self::step_order(
                level,
                &key1,
                Node::Branch(parent),
                empty_tree[level + 1].clone(),
            );
            parent = Branch::new(left, right);
            self.db.insert_branch(parent.clone())?;
        }

        Ok(parent)
    }

    /// Inserts a leaf below the branch `root_hash` sitting at `height` and
    /// returns the replacement branch.
    ///
    /// Three cases:
    /// 1. the path reaches an empty subtree: it becomes a compacted leaf
    /// 2. it reaches a compacted leaf with the same key: the leaf is replaced
    /// 3. it reaches a compacted leaf with another key: both are merged
    fn insert_leaf(
        &mut self,
        key: &[u8; HASH_SIZE],
        height: usize,
        root_hash: &[u8; HASH_SIZE],
        leaf: Leaf<HASH_SIZE, H>,
    ) -> Result<Branch<HASH_SIZE, H>, TreeError<DbError>> {
        let empty_tree = self.db.empty_tree();
        let (left, right) = self.db.get_children(height, *root_hash)?;
        let is_left = bit_index(height, key) == 0;
        let (next, sibling) = if is_left { (left, right) } else { (right, left) };

        let next_height = height + 1;

        let new_node = match next {
            Node::Branch(_) | Node::Computed(_) if next.hash() == empty_tree[next_height].hash() => {
                let new_leaf = CompactLeaf::new(next_height, *key, leaf.clone(), &empty_tree);
                self.db.insert_leaf(leaf)?;
                self.db.insert_compact_leaf(new_leaf.clone())?;
                Node::Compact(new_leaf)
            }
            Node::Branch(_) | Node::Computed(_) => {
                Node::Branch(self.insert_leaf(key, next_height, &next.hash(), leaf)?)
            }
            Node::Compact(node) => {
                self.db.delete_leaf(&node.leaf().hash())?;
                self.db.delete_compact_leaf(&node.hash())?;

                if *key == *node.key() {
                    let new_leaf = CompactLeaf::new(next_height, *key, leaf.clone(), &empty_tree);
                    self.db.insert_leaf(leaf)?;
                    self.db.insert_compact_leaf(new_leaf.clone())?;
                    Node::Compact(new_leaf)
                } else {
                    Node::Branch(self.merge(
                        next_height,
                        *key,
                        leaf,
                        *node.key(),
                        node.leaf().clone(),
                    )?)
                }
            }
            // Keys that only differ on their last bit are merged into plain
            // leaves at the bottom level. The path pins the key there.
            Node::Leaf(old) if next_height == Self::max_levels() => {
                self.db.delete_leaf(&old.hash())?;
                let new_leaf = CompactLeaf::new(next_height, *key, leaf.clone(), &empty_tree);
                self.db.insert_leaf(leaf)?;
                self.db.insert_compact_leaf(new_leaf.clone())?;
                Node::Compact(new_leaf)
            }
            Node::Leaf(_) => return Err(TreeError::ExpectedBranch),
        };

        if *root_hash != empty_tree[height].hash() {
            self.db.delete_branch(root_hash)?;
        }
        let branch = if is_left {
            Branch::new(new_node, sibling)
        } else {
            Branch::new(sibling, new_node)
        };

        if branch.hash() != empty_tree[height].hash() {
            self.db.insert_branch(branch.clone())?;
        }

        Ok(branch)
    }

    /// Inserts `leaf` at `key`, replacing any previous leaf there.
    ///
    /// Returns [`TreeError::SumOverflow`] if the root sum would overflow.
    pub fn insert(
        &mut self,
        key: [u8; HASH_SIZE],
        leaf: Leaf<HASH_SIZE, H>,
    ) -> Result<(), TreeError<DbError>> {
        let root = self.root()?;
        let replaced = self.get(&key)?.sum();
        root.sum()
            .checked_sub(replaced)
            .and_then(|rest| rest.checked_add(leaf.sum()))
            .ok_or(TreeError::SumOverflow)?;

        let new_root = self.insert_leaf(&key, 0, &root.hash(), leaf)?;
        self.db.update_root(new_root)
    }

    /// Orders two children as `(next, sibling)` following the key bit at `height`.
    #[inline]
    fn step_order(
        height: usize,
        key: &[u8; HASH_SIZE],
        left: Node<HASH_SIZE, H>,
        right: Node<HASH_SIZE, H>,
    ) -> (Node<HASH_SIZE, H>, Node<HASH_SIZE, H>) {
        if bit_index(height, key) == 0 {
            (left, right)
        } else {
            (right, left)
        }
    }

    /// Sibling path for `key`, whether or not a leaf lives there.
    pub fn merkle_proof(&self, key: &[u8; HASH_SIZE]) -> Result<Proof<HASH_SIZE, H>, TreeError<DbError>> {
        let mut proof = Vec::with_capacity(Self::max_levels());
        self.walk_down(key, |_, _next, sibling, _| {
            proof.push(sibling.clone());
        })?;
        proof.reverse();
        Ok(Proof::new(proof))
    }

    /// Sibling path for a key that holds a leaf.
    pub fn inclusion_proof(
        &self,
        key: &[u8; HASH_SIZE],
    ) -> Result<Proof<HASH_SIZE, H>, TreeError<DbError>> {
        let mut proof = Vec::with_capacity(Self::max_levels());
        let leaf = self.walk_down(key, |_, _next, sibling, _| {
            proof.push(sibling.clone());
        })?;
        if leaf.is_empty() {
            return Err(TreeError::KeyNotFound(hex::encode(key)));
        }
        proof.reverse();
        Ok(Proof::new(proof))
    }

    pub fn get(&self, key: &[u8; HASH_SIZE]) -> Result<Leaf<HASH_SIZE, H>, TreeError<DbError>> {
        self.walk_down(key, |_, _, _, _| {})
    }
}

#[cfg(test)]
mod test {
    use std::convert::Infallible;

    use super::CompactMSSMT;
    use crate::{EmptyTree, Leaf, MemoryDb, TreeError};
    use hex_literal::hex;
    use sha2::Sha256;

    fn new_tree() -> CompactMSSMT<32, Sha256, Infallible> {
        CompactMSSMT::new(Box::new(MemoryDb::<32, Sha256>::new()))
    }

    #[test]
    fn test_compact_mssmt_new() {
        let compact_mssmt = new_tree();
        assert_eq!(
            compact_mssmt.root().unwrap().hash(),
            EmptyTree::<32, Sha256>::empty_tree()[0].hash()
        );
    }

    #[test]
    fn test_compact_overwrite_near_max_sum() {
        let mut compact_mssmt = new_tree();
        compact_mssmt
            .insert([1; 32], Leaf::new(vec![1; 32], u64::MAX))
            .unwrap();
        compact_mssmt
            .insert([1; 32], Leaf::new(vec![2; 32], 1))
            .unwrap();
        assert_eq!(compact_mssmt.root().unwrap().sum(), 1);
        assert_eq!(compact_mssmt.get(&[1; 32]).unwrap().sum(), 1);
        // a second key still overflows
        assert_eq!(
            compact_mssmt
                .insert([2; 32], Leaf::new(vec![3; 32], u64::MAX))
                .unwrap_err(),
            TreeError::SumOverflow
        );
    }

    #[test]
    fn test_compact_mssmt_sum_overflow() {
        let mut compact_mssmt = new_tree();
        let leaf = Leaf::new(vec![1; 32], u64::MAX);
        compact_mssmt
            .insert(
                hex!("0000000000000000000000000000000000000000000000000000000000000000"),
                leaf.clone(),
            )
            .unwrap();
        assert_eq!(
            compact_mssmt.insert(
                hex!("0000000000000000000000000000000000000000000000000000000000000001"),
                leaf
            ),
            Err(TreeError::SumOverflow)
        );
    }

    #[test]
    fn test_mssmt_merkle_proof() {
        let mut mssmt = new_tree();
        let leaf = Leaf::new(vec![0; 32], 1);
        mssmt.insert([0; 32], leaf.clone()).unwrap();
        let proof = mssmt.inclusion_proof(&[0; 32]).unwrap();
        let root = mssmt.root().unwrap();
        proof
            .verify_merkle_proof::<Infallible>(&[0; 32], leaf, root.hash())
            .unwrap();
    }

    #[test]
    fn test_mssmt_merkle_proof_invalid() {
        let mut mssmt = new_tree();
        let leaf = Leaf::new(vec![0; 32], 1);
        mssmt.insert([0; 32], leaf.clone()).unwrap();
        let proof = mssmt.merkle_proof(&[1; 32]).unwrap();
        let root = mssmt.root().unwrap();
        assert_eq!(
            proof
                .verify_merkle_proof::<Infallible>(&[0; 32], leaf, root.hash())
                .unwrap_err(),
            TreeError::InvalidMerkleProof
        );
    }

    #[test]
    fn test_inclusion_proof_on_empty_tree() {
        let tree = new_tree();
        assert!(matches!(
            tree.inclusion_proof(&[7; 32]),
            Err(TreeError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_replace_and_get() {
        let mut tree = new_tree();
        tree.insert([3; 32], Leaf::new(vec![1], 10)).unwrap();
        tree.insert([4; 32], Leaf::new(vec![2], 20)).unwrap();
        tree.insert([3; 32], Leaf::new(vec![3], 5)).unwrap();
        assert_eq!(tree.root().unwrap().sum(), 25);
        assert_eq!(tree.get(&[3; 32]).unwrap().value(), &[3]);
        assert_eq!(tree.get(&[4; 32]).unwrap().value(), &[2]);
        assert!(tree.get(&[5; 32]).unwrap().is_empty());
    }
}
