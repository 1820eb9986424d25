use sha2::{Digest, Sha256};

use super::SplitLeaf;
use crate::asset::{Asset, AssetId, SerializedKey};

/// Key of a split output in the tree: `SHA256(asset id ‖ output index ‖ script key)`
/// with the index big-endian.
pub fn derive_key(asset_id: &AssetId, output_index: u32, script_key: &SerializedKey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(asset_id.as_bytes());
    hasher.update(output_index.to_be_bytes());
    hasher.update(script_key.as_bytes());
    hasher.finalize().into()
}

/// Leaf of a split output: the digest of the output's state weighted by `amount`.
pub fn encode_leaf(amount: u64, state: &Asset) -> SplitLeaf {
    SplitLeaf::new(state.state_digest().to_vec(), amount)
}
