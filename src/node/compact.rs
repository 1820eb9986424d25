use std::fmt::Display;

use super::leaf::Leaf;
use super::Hasher;
use super::Node;
use crate::tree::bit_index;

/// A leaf standing in for the only non-empty path of a subtree.
///
/// The hash is the hash of the whole subtree rooted at the height the compact
/// leaf was created for, so a compacted tree has the same root as a full one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactLeaf<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> {
    node_hash: [u8; HASH_SIZE],
    leaf: Leaf<HASH_SIZE, H>,
    key: [u8; HASH_SIZE],
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> CompactLeaf<HASH_SIZE, H> {
    /// Compacts the subtree at `height` that only holds `leaf` under `key`.
    /// `empty_tree` is the cached empty tree, indexed by height.
    pub fn new(
        height: usize,
        key: [u8; HASH_SIZE],
        leaf: Leaf<HASH_SIZE, H>,
        empty_tree: &[Node<HASH_SIZE, H>],
    ) -> Self {
        let mut current = Node::Leaf(leaf.clone());
        for i in (height..HASH_SIZE * 8).rev() {
            current = if bit_index(i, &key) == 0 {
                Node::new_branch(current, empty_tree[i + 1].clone())
            } else {
                Node::new_branch(empty_tree[i + 1].clone(), current)
            };
        }

        Self {
            node_hash: current.hash(),
            leaf,
            key,
        }
    }

    pub fn hash(&self) -> [u8; HASH_SIZE] {
        self.node_hash
    }

    pub fn leaf(&self) -> &Leaf<HASH_SIZE, H> {
        &self.leaf
    }

    pub fn key(&self) -> &[u8; HASH_SIZE] {
        &self.key
    }

    pub fn sum(&self) -> u64 {
        self.leaf.sum()
    }

    /// Rebuilds the branches that were compacted away, returning the node at
    /// `height + 1`.
    pub fn extract(&self, height: usize, empty_tree: &[Node<HASH_SIZE, H>]) -> Node<HASH_SIZE, H> {
        let mut current = Node::Leaf(self.leaf.clone());

        for j in (height + 2..=(HASH_SIZE * 8)).rev() {
            current = if bit_index(j - 1, &self.key) == 0 {
                Node::new_branch(current, empty_tree[j].clone())
            } else {
                Node::new_branch(empty_tree[j].clone(), current)
            };
        }

        current
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Display for CompactLeaf<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Compact {{ hash: {}, leaf: {} }}",
            hex::encode(self.hash()),
            self.leaf(),
        )
    }
}
