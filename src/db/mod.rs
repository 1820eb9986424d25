//! Storage backend abstraction for the tree nodes
mod memory;

use std::sync::Arc;

pub use memory::MemoryDb;

use crate::{
    node::{Branch, CompactLeaf, Hasher, Leaf, Node},
    TreeError,
};

/// Thread safety marker trait
#[cfg(feature = "multi-thread")]
pub trait ThreadSafe: Send + Sync {}
#[cfg(feature = "multi-thread")]
impl<T: Send + Sync> ThreadSafe for T {}

#[cfg(not(feature = "multi-thread"))]
pub trait ThreadSafe {}
#[cfg(not(feature = "multi-thread"))]
impl<T> ThreadSafe for T {}

/// Content-addressed node store behind a tree.
///
/// A split builds its tree on a fresh [`MemoryDb`]. Other backends only need
/// to hand nodes back by hash and height; missing nodes at a height are the
/// empty subtree of that height.
pub trait Db<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone>: ThreadSafe {
    /// The error type for database operations
    type DbError;

    /// Get the root node of the tree, `None` until a first insertion.
    fn get_root_node(&self) -> Option<Branch<HASH_SIZE, H>>;

    /// Get the children of the branch with hash `key` sitting at `height`.
    #[allow(clippy::type_complexity)]
    fn get_children(
        &self,
        height: usize,
        key: [u8; HASH_SIZE],
    ) -> Result<(Node<HASH_SIZE, H>, Node<HASH_SIZE, H>), TreeError<Self::DbError>>;

    /// Stores a leaf under its hash.
    fn insert_leaf(&mut self, leaf: Leaf<HASH_SIZE, H>) -> Result<(), TreeError<Self::DbError>>;

    /// Stores a branch under its hash.
    fn insert_branch(
        &mut self,
        branch: Branch<HASH_SIZE, H>,
    ) -> Result<(), TreeError<Self::DbError>>;

    /// Stores a compacted leaf under the hash of the subtree it stands for.
    fn insert_compact_leaf(
        &mut self,
        compact_leaf: CompactLeaf<HASH_SIZE, H>,
    ) -> Result<(), TreeError<Self::DbError>>;

    /// Empty subtree hashes by height, shared by every tree on this store.
    fn empty_tree(&self) -> Arc<Vec<Node<HASH_SIZE, H>>>;

    /// Replaces the root once an insertion has been applied.
    fn update_root(&mut self, root: Branch<HASH_SIZE, H>) -> Result<(), TreeError<Self::DbError>>;

    /// Drops a branch no longer on any path.
    fn delete_branch(&mut self, key: &[u8; HASH_SIZE]) -> Result<(), TreeError<Self::DbError>>;

    /// Drops a replaced leaf.
    fn delete_leaf(&mut self, key: &[u8; HASH_SIZE]) -> Result<(), TreeError<Self::DbError>>;

    /// Drops a compacted leaf that was merged or replaced.
    fn delete_compact_leaf(
        &mut self,
        key: &[u8; HASH_SIZE],
    ) -> Result<(), TreeError<Self::DbError>>;
}
