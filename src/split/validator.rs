use std::collections::{BTreeMap, BTreeSet};

use sha2::Sha256;
use tracing::{debug, trace, warn};

use super::{encode_leaf, Locator, LocatorId, SplitRoot, SplitSet, SplitTree};
use crate::asset::Asset;
use crate::{ErrorKind, MemoryDb, SplitError};

/// Checks a split against the total of the inputs it spends.
///
/// The split root is read from the one asset carrying a split commitment root.
/// An expected root can be pinned with [`SplitValidator::with_expected_root`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitValidator {
    input_total: u64,
    expected_root: Option<SplitRoot>,
}

impl SplitValidator {
    pub fn new(input_total: u64) -> Self {
        Self {
            input_total,
            expected_root: None,
        }
    }

    pub fn with_expected_root(mut self, root: SplitRoot) -> Self {
        self.expected_root = Some(root);
        self
    }

    /// Validates every locator's asset and proof, then conservation.
    pub fn validate(&self, locators: &[Locator], assets: &SplitSet) -> Result<(), SplitError> {
        if locators.is_empty() {
            return Err(SplitError::EmptySplitSet);
        }
        debug!(
            outputs = locators.len(),
            total = self.input_total,
            "validating split"
        );

        let mut by_id = BTreeMap::new();
        let mut keys = BTreeSet::new();
        for locator in locators {
            let id = locator.id();
            if !keys.insert(locator.key()) {
                return Err(SplitError::DuplicateLocator(id.to_string()));
            }
            let asset = &assets
                .get(&id)
                .ok_or_else(|| SplitError::MissingAsset(id.to_string()))?
                .asset;
            if by_id.insert(id, (locator, asset)).is_some() {
                return Err(SplitError::DuplicateLocator(id.to_string()));
            }
        }

        let (root_id, root_locator, root_asset, root) = find_root(&by_id)?;
        if let Some(expected) = self.expected_root {
            if expected != root {
                return Err(SplitError::invalid_proof(
                    root_id,
                    "split root does not match the expected root",
                ));
            }
        }

        for (id, (locator, asset)) in &by_id {
            if asset.amount != locator.amount {
                return Err(SplitError::invalid_proof(id, "amount does not match locator"));
            }
            if asset.script_key != locator.script_key {
                return Err(SplitError::invalid_proof(
                    id,
                    "script key does not match locator",
                ));
            }
        }

        let root_key = root_locator.key();
        let root_state = root_asset.leaf_state();
        for (id, (locator, asset)) in &by_id {
            if *id == root_id {
                continue;
            }
            let commitment = asset
                .split_commitment()
                .ok_or_else(|| SplitError::invalid_proof(id, "missing split commitment"))?;
            if commitment.root_key != root_key {
                return Err(SplitError::invalid_proof(id, "commits to another root locator"));
            }
            if commitment.root_asset.split_commitment_root != Some(root)
                || commitment.root_asset.leaf_state() != root_state
            {
                return Err(SplitError::invalid_proof(id, "commits to another root asset"));
            }
            if !commitment.proof.verify_inclusion(
                &locator.key(),
                encode_leaf(asset.amount, asset),
                &root,
            ) {
                return Err(SplitError::invalid_proof(id, "inclusion proof does not verify"));
            }
            trace!(locator = %id, amount = locator.amount, "split proof verified");
        }

        // The root asset has no proof of its own, rebuilding the tree from every
        // output covers its leaf.
        let mut tree = SplitTree::new(Box::new(MemoryDb::<32, Sha256>::new()));
        for (locator, asset) in by_id.values() {
            tree.insert(locator.key(), encode_leaf(asset.amount, asset))?;
        }
        let rebuilt = tree.root()?;
        if rebuilt.hash() != root.hash() || rebuilt.sum() != root.sum() {
            return Err(SplitError::invalid_proof(
                root_id,
                "outputs do not rebuild the split root",
            ));
        }

        let mut locator_total = 0u64;
        for locator in locators {
            locator_total = locator_total
                .checked_add(locator.amount)
                .ok_or(SplitError::Overflow)?;
        }
        // The rebuilt root already ties the committed sum to the locators.
        if locator_total != self.input_total {
            return Err(SplitError::Conservation {
                expected: self.input_total,
                actual: locator_total,
            });
        }

        debug!(root = %hex::encode(root.hash()), "split validated");
        Ok(())
    }

    /// Like [`SplitValidator::validate`] but a proof that does not check out is
    /// `Ok(false)`. Any other failure is still an error.
    pub fn verify(&self, locators: &[Locator], assets: &SplitSet) -> Result<bool, SplitError> {
        match self.validate(locators, assets) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::Proof => {
                warn!(error = %err, "split verification failed");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

type Located<'a> = BTreeMap<LocatorId, (&'a Locator, &'a Asset)>;

/// The single output carrying a split commitment root.
fn find_root<'a>(
    by_id: &Located<'a>,
) -> Result<(LocatorId, &'a Locator, &'a Asset, SplitRoot), SplitError> {
    let mut roots = by_id.iter().filter_map(|(id, (locator, asset))| {
        asset
            .split_commitment_root
            .map(|root| (*id, *locator, *asset, root))
    });
    let Some(root) = roots.next() else {
        return Err(SplitError::MissingRootAsset);
    };
    let extra = roots.count();
    if extra > 0 {
        return Err(SplitError::MultipleRootAssets(extra + 1));
    }
    Ok(root)
}

/// Validates `assets` against `locators` and the total of the spent inputs.
pub fn validate_split(
    locators: &[Locator],
    assets: &SplitSet,
    input_total: u64,
) -> Result<(), SplitError> {
    SplitValidator::new(input_total).validate(locators, assets)
}

/// `Ok(true)` for a valid split, `Ok(false)` when a proof does not check out.
pub fn verify_split(
    locators: &[Locator],
    assets: &SplitSet,
    input_total: u64,
) -> Result<bool, SplitError> {
    SplitValidator::new(input_total).verify(locators, assets)
}
