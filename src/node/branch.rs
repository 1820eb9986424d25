use std::sync::Arc;
use std::{fmt::Display, marker::PhantomData};

use super::Node;
use super::{Hasher, Sum};

/// A branch is a node that has exactly 2 children.
/// It holds the sum of all its descendants and commits to it in its hash:
/// `H(left.hash ‖ right.hash ‖ sum)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> {
    left: Arc<Node<HASH_SIZE, H>>,
    right: Arc<Node<HASH_SIZE, H>>,
    sum: Sum,
    node_hash: [u8; HASH_SIZE],
    _phantom: PhantomData<H>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Branch<HASH_SIZE, H> {
    /// Creates a new [`Branch`]. This function performs a hash and an addition.
    ///
    /// The caller guarantees the children sums do not overflow, trees check it
    /// before inserting and [`crate::walk_up`] before combining proof nodes.
    pub fn new(left: Node<HASH_SIZE, H>, right: Node<HASH_SIZE, H>) -> Self {
        Self::new_with_arc_children(Arc::new(left), Arc::new(right))
    }

    pub fn new_with_arc_children(
        left: Arc<Node<HASH_SIZE, H>>,
        right: Arc<Node<HASH_SIZE, H>>,
    ) -> Self {
        let sum = left.sum() + right.sum();
        let node_hash = H::hash(
            &[
                left.hash().as_slice(),
                right.hash().as_slice(),
                sum.to_be_bytes().as_slice(),
            ]
            .concat(),
        );

        Self {
            sum,
            left,
            right,
            node_hash,
            _phantom: PhantomData,
        }
    }

    /// Returns the hash of the node. NO HASHING IS DONE HERE.
    pub fn hash(&self) -> [u8; HASH_SIZE] {
        self.node_hash
    }

    pub fn sum(&self) -> Sum {
        self.sum
    }

    pub fn children(&self) -> (&Node<HASH_SIZE, H>, &Node<HASH_SIZE, H>) {
        (&self.left, &self.right)
    }

    pub fn left(&self) -> &Node<HASH_SIZE, H> {
        &self.left
    }

    pub fn right(&self) -> &Node<HASH_SIZE, H> {
        &self.right
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Display for Branch<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Branch {{ sum: {}, hash: {} }}",
            self.sum(),
            hex::encode(self.hash())
        )
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::Branch;
    use crate::{node::Node, Leaf};
    use hex_literal::hex;
    use sha2::Sha256;

    fn leaves() -> (Node<32, Sha256>, Node<32, Sha256>) {
        (
            Node::Leaf(Leaf::new(vec![1, 2, 3], 1)),
            Node::Leaf(Leaf::new(vec![4, 5, 6], 2)),
        )
    }

    #[test]
    fn test_branch_hash_and_sum() {
        let (left, right) = leaves();
        let branch = Branch::new(left, right);
        assert_eq!(
            branch.hash(),
            hex!("c3171e69d789087eea2e9a1f0a7cb0068421e5af3727455ea5ec24ef764184a6")
        );
        assert_eq!(branch.sum(), 3);
    }

    #[test]
    fn test_branch_with_empty_leaves() {
        let branch = Branch::<32, Sha256>::new(Node::new_empty_leaf(), Node::new_empty_leaf());
        assert_eq!(
            branch.hash(),
            hex!("5a61e238f07e3a8114e39670c1e5ff430913d5793028258cf8a49282efee4411")
        );
        assert_eq!(branch.sum(), 0);
    }

    #[test]
    fn test_branch_children() {
        let (left, right) = leaves();
        let branch = Branch::new(left.clone(), right.clone());
        let (children_left, children_right) = branch.children();
        assert_eq!(children_left.hash(), left.hash());
        assert_eq!(children_right.hash(), right.hash());
        assert_eq!(branch.left().hash(), left.hash());
        assert_eq!(branch.right().hash(), right.hash());
    }

    #[test]
    fn test_branch_only_depends_on_children_hash_and_sum() {
        let (left, right) = leaves();
        let full = Branch::new_with_arc_children(Arc::new(left.clone()), Arc::new(right.clone()));
        let computed = Branch::new(left.to_computed(), right.to_computed());
        assert_eq!(full.hash(), computed.hash());
        assert_eq!(full.sum(), computed.sum());
    }
}
