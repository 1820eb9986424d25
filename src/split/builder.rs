use std::collections::{BTreeMap, BTreeSet};
use std::iter;

use sha2::Sha256;
use tracing::{debug, trace};

use super::{encode_leaf, InputSet, Locator, Split, SplitAsset, SplitInput, SplitRoot, SplitSet, SplitTree};
use crate::asset::{SplitCommitment, Witness};
use crate::{MemoryDb, SplitError};

/// Splits `inputs` across `root_locator` and `split_locators`.
///
/// Every output gets a copy of the first input's state with the locator's
/// amount and script key. The root output spends every input and carries the
/// tree root, every other output carries a [`SplitCommitment`] proving its leaf
/// against that root.
///
/// All checks run before the tree is built and nothing is returned on error.
///
/// # Errors
///
/// * [`SplitError::EmptyInput`], [`SplitError::EmptySplitSet`]
/// * [`SplitError::InputAssetMismatch`], [`SplitError::DuplicateInput`]
/// * [`SplitError::DuplicateLocator`] when two locators share an id or a key
/// * [`SplitError::Overflow`], [`SplitError::AmountMismatch`]
/// * [`SplitError::InternalProofFailure`] if a produced proof does not verify
pub fn build_split(
    inputs: &[SplitInput],
    root_locator: &Locator,
    split_locators: &[Locator],
) -> Result<Split, SplitError> {
    let Some(first) = inputs.first() else {
        return Err(SplitError::EmptyInput);
    };
    if split_locators.is_empty() {
        return Err(SplitError::EmptySplitSet);
    }

    let asset_id = first.asset.asset_id;
    let mut prev_assets = InputSet::new();
    let mut input_total = 0u64;
    for input in inputs {
        if input.asset.asset_id != asset_id {
            return Err(SplitError::InputAssetMismatch {
                expected: asset_id.to_string(),
                found: input.asset.asset_id.to_string(),
            });
        }
        let prev_id = input.prev_id();
        if prev_assets.insert(prev_id, input.asset.clone()).is_some() {
            return Err(SplitError::DuplicateInput(prev_id.to_string()));
        }
        input_total = input_total
            .checked_add(input.asset.amount)
            .ok_or(SplitError::Overflow)?;
    }

    let mut locators = BTreeMap::new();
    let mut keys = BTreeSet::new();
    let mut locator_total = 0u64;
    for locator in iter::once(root_locator).chain(split_locators) {
        let id = locator.id();
        if locators.insert(id, *locator).is_some() || !keys.insert(locator.key()) {
            return Err(SplitError::DuplicateLocator(id.to_string()));
        }
        locator_total = locator_total
            .checked_add(locator.amount)
            .ok_or(SplitError::Overflow)?;
    }
    if locator_total != input_total {
        return Err(SplitError::AmountMismatch {
            expected: input_total,
            actual: locator_total,
        });
    }

    debug!(
        inputs = inputs.len(),
        outputs = locators.len(),
        total = input_total,
        "building split"
    );

    let template = first.asset.leaf_state();
    let mut tree = SplitTree::new(Box::new(MemoryDb::<32, Sha256>::new()));
    let mut split_assets = SplitSet::new();
    for (id, locator) in &locators {
        let mut asset = template.clone();
        asset.amount = locator.amount;
        asset.script_key = locator.script_key;
        trace!(locator = %id, amount = locator.amount, "inserting split leaf");
        tree.insert(locator.key(), encode_leaf(asset.amount, &asset))?;
        split_assets.insert(
            *id,
            SplitAsset {
                asset,
                output_index: locator.output_index,
            },
        );
    }

    let root_branch = tree.root()?;
    let root = SplitRoot::new(root_branch.hash(), root_branch.sum());

    let root_id = root_locator.id();
    let root_asset = {
        let root_output = split_assets
            .get_mut(&root_id)
            .ok_or_else(|| SplitError::MissingAsset(root_id.to_string()))?;
        root_output.asset.prev_witnesses = prev_assets
            .keys()
            .map(|prev_id| Witness {
                prev_id: Some(*prev_id),
                ..Witness::default()
            })
            .collect();
        root_output.asset.split_commitment_root = Some(root);
        root_output.asset.clone()
    };

    let root_key = root_locator.key();
    for (id, split_asset) in split_assets.iter_mut() {
        if *id == root_id {
            continue;
        }
        let locator = locators
            .get(id)
            .ok_or_else(|| SplitError::MissingAsset(id.to_string()))?;
        let commitment = SplitCommitment {
            root_key,
            proof: tree.inclusion_proof(&locator.key())?.to_computed(),
            root_asset: root_asset.clone(),
        };
        if !commitment.verify(locator, &split_asset.asset) {
            return Err(SplitError::InternalProofFailure(id.to_string()));
        }
        split_asset.asset.prev_witnesses = vec![Witness {
            split_commitment: Some(commitment),
            ..Witness::default()
        }];
    }

    debug!(
        root = %hex::encode(root.hash()),
        total = root.sum(),
        "split built"
    );

    Ok(Split {
        prev_assets,
        root_locator: *root_locator,
        root,
        split_assets,
        locators,
        tree,
    })
}
