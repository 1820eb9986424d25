use std::fmt::Display;
use std::marker::PhantomData;

use super::{Hasher, Sum};

/// Represents an empty leaf in the tree. Those leaves have no `value` and hold `0` as sum value.
/// Its hash is the hash of a zero sum, so every empty subtree of a given height hashes the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyLeaf<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> {
    node_hash: [u8; HASH_SIZE],
    _phantom: PhantomData<H>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Default for EmptyLeaf<HASH_SIZE, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> EmptyLeaf<HASH_SIZE, H> {
    /// Creates a new [`EmptyLeaf`]. This function performs a hash.
    pub fn new() -> Self {
        Self {
            node_hash: H::hash(&Sum::default().to_be_bytes()),
            _phantom: PhantomData,
        }
    }

    pub fn hash(&self) -> [u8; HASH_SIZE] {
        self.node_hash
    }

    pub fn sum(&self) -> Sum {
        0
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Display for EmptyLeaf<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Empty {{ sum: {}, hash: {} }}",
            self.sum(),
            hex::encode(self.hash())
        )
    }
}
