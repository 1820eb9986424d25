//! Asset splits committed to with a compact MS-SMT.
//!
//! Every output of a split is a [`Locator`]. Its leaf is keyed by
//! [`derive_key`] and weighted by the output amount, so the root sum is the
//! total value of the split.
mod builder;
mod leaf;
mod locator;
mod validator;

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt::Debug;

use sha2::Sha256;

pub use builder::build_split;
pub use leaf::{derive_key, encode_leaf};
pub use locator::{Locator, LocatorId};
pub use validator::{validate_split, verify_split, SplitValidator};

use crate::asset::{Asset, OutPoint, PrevId};
use crate::{CompactMSSMT, ComputedNode, Leaf, Proof, SplitError};

pub type SplitLeaf = Leaf<32, Sha256>;
pub type SplitProof = Proof<32, Sha256>;
/// Hash and sum of a split tree root.
pub type SplitRoot = ComputedNode<32>;
pub type SplitTree = CompactMSSMT<32, Sha256, Infallible>;

/// Outputs of a split, the root output included.
pub type SplitSet = BTreeMap<LocatorId, SplitAsset>;
/// Assets spent by a split.
pub type InputSet = BTreeMap<PrevId, Asset>;

/// An output asset and the transaction output it goes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitAsset {
    pub asset: Asset,
    pub output_index: u32,
}

/// An asset being spent, with the output holding it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitInput {
    pub asset: Asset,
    pub out_point: OutPoint,
}

impl SplitInput {
    pub fn prev_id(&self) -> PrevId {
        PrevId {
            out_point: self.out_point,
            asset_id: self.asset.asset_id,
            script_key: self.asset.script_key,
        }
    }
}

/// A built split. Holds its tree so more proofs can be requested.
pub struct Split {
    pub(crate) prev_assets: InputSet,
    pub(crate) root_locator: Locator,
    pub(crate) root: SplitRoot,
    pub(crate) split_assets: SplitSet,
    pub(crate) locators: BTreeMap<LocatorId, Locator>,
    pub(crate) tree: SplitTree,
}

impl Split {
    pub fn prev_assets(&self) -> &InputSet {
        &self.prev_assets
    }

    pub fn root_locator(&self) -> &Locator {
        &self.root_locator
    }

    pub fn root_commitment(&self) -> SplitRoot {
        self.root
    }

    pub fn root_asset(&self) -> Option<&Asset> {
        self.split_assets
            .get(&self.root_locator.id())
            .map(|split_asset| &split_asset.asset)
    }

    pub fn split_assets(&self) -> &SplitSet {
        &self.split_assets
    }

    pub fn split_asset(&self, id: &LocatorId) -> Option<&SplitAsset> {
        self.split_assets.get(id)
    }

    /// Every locator, root included, ordered by id.
    pub fn locators(&self) -> impl Iterator<Item = &Locator> {
        self.locators.values()
    }

    pub fn input_total(&self) -> u64 {
        self.root.sum()
    }

    pub fn tree(&self) -> &SplitTree {
        &self.tree
    }

    /// Inclusion proof of a locator's leaf against the split root.
    pub fn inclusion_proof(&self, locator: &Locator) -> Result<SplitProof, SplitError> {
        Ok(self.tree.inclusion_proof(&locator.key())?.to_computed())
    }
}

impl Debug for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Split")
            .field("prev_assets", &self.prev_assets)
            .field("root_locator", &self.root_locator)
            .field("root", &self.root)
            .field("split_assets", &self.split_assets)
            .finish_non_exhaustive()
    }
}
