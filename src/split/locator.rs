use std::fmt::Display;

use super::derive_key;
use crate::asset::{AssetId, SerializedKey};
use crate::encoding::{DecodeError, Reader};

/// Identity of a locator within a split: `asset id ‖ script key`.
///
/// Output index and amount are payload and take no part in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocatorId([u8; 65]);

impl LocatorId {
    pub fn new(asset_id: &AssetId, script_key: &SerializedKey) -> Self {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(asset_id.as_bytes());
        bytes[32..].copy_from_slice(script_key.as_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }
}

impl Display for LocatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// One destination output of a split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Locator {
    pub output_index: u32,
    pub asset_id: AssetId,
    pub amount: u64,
    pub script_key: SerializedKey,
}

impl Locator {
    pub const ENCODED_SIZE: usize = 4 + AssetId::LEN + 8 + SerializedKey::LEN;

    pub fn new(output_index: u32, asset_id: AssetId, amount: u64, script_key: SerializedKey) -> Self {
        Self {
            output_index,
            asset_id,
            amount,
            script_key,
        }
    }

    pub fn id(&self) -> LocatorId {
        LocatorId::new(&self.asset_id, &self.script_key)
    }

    /// Key of the locator's leaf in the split tree.
    pub fn key(&self) -> [u8; 32] {
        derive_key(&self.asset_id, self.output_index, &self.script_key)
    }

    /// `output index u32 | asset id | amount u64 | script key`, big-endian.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_SIZE);
        out.extend_from_slice(&self.output_index.to_be_bytes());
        out.extend_from_slice(self.asset_id.as_bytes());
        out.extend_from_slice(&self.amount.to_be_bytes());
        out.extend_from_slice(self.script_key.as_bytes());
        out
    }

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let locator = Self {
            output_index: reader.u32()?,
            asset_id: AssetId(reader.array()?),
            amount: reader.u64()?,
            script_key: SerializedKey::read(&mut reader)?,
        };
        reader.finish()?;
        Ok(locator)
    }
}
