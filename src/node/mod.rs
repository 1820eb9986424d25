mod branch;
mod compact;
mod computed;
mod empty;
mod leaf;

use sha2::{Digest, Sha256};
use std::fmt::Debug;
use std::fmt::Display;

pub use branch::Branch;
pub use compact::CompactLeaf;
pub use computed::ComputedNode;
pub use empty::EmptyLeaf;
pub use leaf::{Leaf, NonEmptyLeaf};

impl Hasher<32> for Sha256 {
    fn hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.finalize().into()
    }
}

pub type Sum = u64;

/// Simple hash trait required to hash the nodes in the tree
///
/// # Type Parameters
/// * `HASH_SIZE` - The size of the hash digest in bytes
pub trait Hasher<const HASH_SIZE: usize> {
    fn hash(data: &[u8]) -> [u8; HASH_SIZE];
}

/// All possible nodes in the tree.
///
/// # Type Parameters
/// * `HASH_SIZE` - The size of the hash digest in bytes
/// * `H` - The hasher implementation used for this node
#[derive(Clone, PartialEq, Eq)]
pub enum Node<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> {
    /// A leaf node, possibly empty
    Leaf(Leaf<HASH_SIZE, H>),
    /// A branch node with two children
    Branch(Branch<HASH_SIZE, H>),
    /// A single leaf standing in for a whole subtree
    Compact(CompactLeaf<HASH_SIZE, H>),
    /// Only a hash and a sum, as found in decoded proofs
    Computed(ComputedNode<HASH_SIZE>),
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Debug for Node<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Leaf(_) => "Leaf",
            Self::Branch(_) => "Branch",
            Self::Compact(_) => "Compact",
            Self::Computed(_) => "Computed",
        };
        write!(
            f,
            "{} {{ sum: {}, hash: {} }}",
            kind,
            self.sum(),
            hex::encode(self.hash())
        )
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Display for Node<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf(leaf) => write!(f, "{}", leaf),
            Self::Branch(branch) => write!(f, "{}", branch),
            Self::Compact(compact) => write!(f, "{}", compact),
            Self::Computed(computed) => write!(f, "{}", computed),
        }
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Node<HASH_SIZE, H> {
    /// Creates a [`Node::Branch`] from 2 [`Node`]
    pub fn new_branch(left: Node<HASH_SIZE, H>, right: Node<HASH_SIZE, H>) -> Self {
        Self::Branch(Branch::new(left, right))
    }

    /// Creates a [`Node::Leaf`] from a `value` and a `sum`
    pub fn new_leaf(value: Vec<u8>, sum: Sum) -> Self {
        Self::Leaf(Leaf::new(value, sum))
    }

    pub fn new_empty_leaf() -> Self {
        Self::Leaf(Leaf::Empty(EmptyLeaf::new()))
    }

    /// Returns the hash of the node. NO HASHING IS DONE HERE.
    pub fn hash(&self) -> [u8; HASH_SIZE] {
        match self {
            Self::Leaf(leaf) => leaf.hash(),
            Self::Branch(branch) => branch.hash(),
            Self::Compact(compact) => compact.hash(),
            Self::Computed(computed) => computed.hash(),
        }
    }

    /// Returns the sum of a [`Node`]. NO OPERATION IS DONE HERE.
    pub fn sum(&self) -> Sum {
        match self {
            Self::Leaf(leaf) => leaf.sum(),
            Self::Branch(branch) => branch.sum(),
            Self::Compact(compact) => compact.sum(),
            Self::Computed(computed) => computed.sum(),
        }
    }

    /// Drops everything but the hash and the sum. Branches no longer keep their
    /// subtrees alive once converted.
    pub fn to_computed(&self) -> Node<HASH_SIZE, H> {
        Node::Computed(ComputedNode::new(self.hash(), self.sum()))
    }
}
