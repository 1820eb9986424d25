use std::{fmt::Display, marker::PhantomData};

use super::{EmptyLeaf, Hasher, Sum};

/// A tree leaf. Absent keys hold the [`EmptyLeaf`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> {
    NonEmpty(NonEmptyLeaf<HASH_SIZE, H>),
    Empty(EmptyLeaf<HASH_SIZE, H>),
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Leaf<HASH_SIZE, H> {
    /// An empty `value` always gives the empty leaf, whatever the sum.
    pub fn new(value: Vec<u8>, sum: Sum) -> Self {
        if value.is_empty() {
            Self::Empty(EmptyLeaf::new())
        } else {
            Self::NonEmpty(NonEmptyLeaf::new(value, sum))
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    pub fn hash(&self) -> [u8; HASH_SIZE] {
        match self {
            Self::NonEmpty(leaf) => leaf.hash(),
            Self::Empty(leaf) => leaf.hash(),
        }
    }

    pub fn sum(&self) -> Sum {
        match self {
            Self::NonEmpty(leaf) => leaf.sum(),
            Self::Empty(leaf) => leaf.sum(),
        }
    }

    pub fn value(&self) -> &[u8] {
        match self {
            Self::NonEmpty(leaf) => leaf.value(),
            Self::Empty(_) => &[],
        }
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Display for Leaf<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonEmpty(leaf) => write!(f, "{}", leaf),
            Self::Empty(leaf) => write!(f, "{}", leaf),
        }
    }
}

/// A Leaf is a node that has no children and simply hold information.
/// They are the last row of the tree.
/// Each leaf contains a `value` represented as bytes and a `sum`; its hash is
/// `H(value ‖ sum)` with the sum big-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyLeaf<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> {
    value: Vec<u8>,
    sum: Sum,
    node_hash: [u8; HASH_SIZE],
    _phantom: PhantomData<H>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> NonEmptyLeaf<HASH_SIZE, H> {
    /// Creates a new [`NonEmptyLeaf`]. This function performs a hash.
    pub fn new(value: Vec<u8>, sum: Sum) -> Self {
        let node_hash = H::hash(&[value.as_slice(), sum.to_be_bytes().as_slice()].concat());
        Self {
            value,
            sum,
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

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Display for NonEmptyLeaf<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Leaf {{ sum: {}, hash: {}, value: {:?} }}",
            self.sum(),
            hex::encode(self.hash()),
            self.value()
        )
    }
}
