//! Error types for the tree and for split commitments

use std::convert::Infallible;

use thiserror::Error;

use crate::encoding::DecodeError;

/// Error type for tree operations
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum TreeError<DbError> {
    /// Node was not found in the tree
    #[error("node not found in tree")]
    NodeNotFound,
    /// Node is not a branch node
    #[error("node is not a branch node")]
    ExpectedBranch,
    /// Node is not a leaf node
    #[error("node is not a leaf node")]
    ExpectedLeaf,
    /// No leaf was ever inserted at this key
    #[error("key {0} not found in tree")]
    KeyNotFound(String),
    /// Database error
    #[error("database error: {0}")]
    DbError(DbError),
    /// Sum overflow
    #[error("sum overflow")]
    SumOverflow,
    /// Invalid merkle proof
    #[error("invalid merkle proof")]
    InvalidMerkleProof,
}

/// Broad category of a [`SplitError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, duplicated or empty inputs/outputs.
    Structural,
    /// Amounts that do not add up or do not fit in 64 bits.
    Arithmetic,
    /// An inclusion proof or commitment that does not check out.
    Proof,
    /// The engine produced something it cannot verify itself.
    Internal,
}

/// Errors produced while building or validating a split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("split has no input assets")]
    EmptyInput,

    #[error("split has no split locators")]
    EmptySplitSet,

    #[error("duplicate locator {0}")]
    DuplicateLocator(String),

    #[error("duplicate input {0}")]
    DuplicateInput(String),

    #[error("input asset mismatch: expected {expected}, found {found}")]
    InputAssetMismatch { expected: String, found: String },

    #[error("no asset for locator {0}")]
    MissingAsset(String),

    #[error("no asset carries a split commitment root")]
    MissingRootAsset,

    #[error("{0} assets carry a split commitment root")]
    MultipleRootAssets(usize),

    #[error("amount mismatch: inputs total {expected}, locators total {actual}")]
    AmountMismatch { expected: u64, actual: u64 },

    #[error("amount overflow")]
    Overflow,

    #[error("conservation violated: expected {expected}, committed {actual}")]
    Conservation { expected: u64, actual: u64 },

    #[error("invalid split proof for locator {locator}: {reason}")]
    InvalidProof { locator: String, reason: String },

    #[error("split built an unverifiable proof for locator {0}")]
    InternalProofFailure(String),

    #[error("accumulator error: {0}")]
    Tree(#[from] TreeError<Infallible>),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl SplitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput
            | Self::EmptySplitSet
            | Self::DuplicateLocator(_)
            | Self::DuplicateInput(_)
            | Self::InputAssetMismatch { .. }
            | Self::MissingAsset(_)
            | Self::MissingRootAsset
            | Self::MultipleRootAssets(_)
            | Self::Decode(_) => ErrorKind::Structural,
            Self::AmountMismatch { .. } | Self::Overflow | Self::Conservation { .. } => {
                ErrorKind::Arithmetic
            }
            Self::InvalidProof { .. } => ErrorKind::Proof,
            Self::Tree(TreeError::SumOverflow) => ErrorKind::Arithmetic,
            Self::Tree(TreeError::KeyNotFound(_)) => ErrorKind::Structural,
            Self::InternalProofFailure(_) | Self::Tree(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid_proof(locator: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidProof {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }
}
