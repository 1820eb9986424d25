//! Asset split commitments over a Merkle Sum Sparse Merkle Tree (MSSMT)
//!
//! An asset spent into several outputs is committed to with a Merkle sum
//! sparse tree: every output is a leaf keyed by its locator and weighted by its
//! amount, so the root sum proves that the value was conserved. The output
//! holding the root (the root asset) spends the inputs, every other output
//! carries an inclusion proof against that root and can be checked on its own.
//!
//! The crate provides:
//! - the tree itself, in a full and a compact layout, generic over the hash
//! - inclusion proofs, compressed proofs and their binary encoding
//! - [`build_split`] to partition inputs across locators
//! - [`validate_split`], [`verify_split`] and [`SplitValidator`] to check a split
//! - a flexible storage backend through the `Db` trait

mod asset;
mod db;
mod encoding;
mod error;
mod node;
mod proof;
mod split;
mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use asset::{Asset, AssetId, OutPoint, PrevId, SerializedKey, SplitCommitment, Witness};
pub use db::{Db, MemoryDb, ThreadSafe};
pub use encoding::DecodeError;
pub use error::{ErrorKind, SplitError, TreeError};
pub use node::{Branch, CompactLeaf, ComputedNode, EmptyLeaf, Hasher, Leaf, Node, NonEmptyLeaf, Sum};
pub use proof::{CompressedProof, Proof};
pub use split::{
    build_split, derive_key, encode_leaf, validate_split, verify_split, InputSet, Locator,
    LocatorId, Split, SplitAsset, SplitInput, SplitLeaf, SplitProof, SplitRoot, SplitSet,
    SplitTree, SplitValidator,
};
pub use tree::{bit_index, walk_up, CompactMSSMT, EmptyTree, MSSMT};

#[cfg(test)]
mod tests;
