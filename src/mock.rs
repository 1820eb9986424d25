//! Random fixtures for tests and benches.
use rand::Rng;

use crate::asset::{Asset, AssetId, OutPoint, SerializedKey, SplitCommitment};
use crate::split::{build_split, Locator, SplitInput};
use crate::SplitError;

pub fn rand_asset_id<R: Rng + ?Sized>(rng: &mut R) -> AssetId {
    AssetId(rng.gen())
}

pub fn rand_script_key<R: Rng + ?Sized>(rng: &mut R) -> SerializedKey {
    SerializedKey::new(rng.gen(), rng.gen())
}

pub fn rand_out_point<R: Rng + ?Sized>(rng: &mut R) -> OutPoint {
    OutPoint {
        txid: rng.gen(),
        vout: rng.gen_range(0..16),
    }
}

/// An asset of 1 to 1 000 000 units with no witnesses.
pub fn rand_asset<R: Rng + ?Sized>(rng: &mut R) -> Asset {
    Asset::new(
        0,
        rand_asset_id(rng),
        rng.gen_range(1..=1_000_000),
        rand_script_key(rng),
    )
}

/// Half of the time `None`, an unsplit transfer. Otherwise `asset` is split in
/// two halves, the root output keeping the odd unit, and the commitment of the
/// split output is returned. A split that fails to build is an error, never an
/// unsplit transfer.
pub fn rand_split_commit<R: Rng + ?Sized>(
    rng: &mut R,
    asset: &Asset,
) -> Result<Option<SplitCommitment>, SplitError> {
    if rng.gen_bool(0.5) {
        return Ok(None);
    }

    let split_amount = asset.amount / 2;
    let root_locator = Locator::new(
        0,
        asset.asset_id,
        asset.amount - split_amount,
        rand_script_key(rng),
    );
    let split_locator = Locator::new(1, asset.asset_id, split_amount, rand_script_key(rng));
    let input = SplitInput {
        asset: asset.clone(),
        out_point: rand_out_point(rng),
    };

    let split = build_split(&[input], &root_locator, &[split_locator])?;
    let output = split
        .split_asset(&split_locator.id())
        .ok_or_else(|| SplitError::MissingAsset(split_locator.id().to_string()))?;
    Ok(output.asset.split_commitment().cloned())
}
