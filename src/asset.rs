//! The asset value object a split commits to.
//!
//! Only what a split commitment needs is modelled: the identifier, the amount,
//! the owning script key, the witnesses spending previous outputs and the split
//! commitment root of a root asset.

use std::fmt::Display;

use sha2::{Digest, Sha256};

use crate::encoding::{put_flag, put_u16_len, put_var_bytes, DecodeError, Reader};
use crate::split::{encode_leaf, Locator, SplitProof, SplitRoot};
use crate::{CompressedProof, ComputedNode};

/// 32-byte asset identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(pub [u8; 32]);

impl AssetId {
    pub const LEN: usize = 32;

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A 33-byte compressed public key. Only the parity prefix is checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SerializedKey([u8; 33]);

impl SerializedKey {
    pub const LEN: usize = 33;

    /// Key from its x coordinate and the parity of its y coordinate.
    pub fn new(odd: bool, x: [u8; 32]) -> Self {
        let mut bytes = [0u8; 33];
        bytes[0] = if odd { 0x03 } else { 0x02 };
        bytes[1..].copy_from_slice(&x);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self, DecodeError> {
        match bytes[0] {
            0x02 | 0x03 => Ok(Self(bytes)),
            prefix => Err(DecodeError::InvalidKey(prefix)),
        }
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Self::from_bytes(reader.array()?)
    }
}

impl Display for SerializedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A transaction output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutPoint {
    pub txid: [u8; 32],
    pub vout: u32,
}

impl Display for OutPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", hex::encode(self.txid), self.vout)
    }
}

/// Identifies the asset output spent by a witness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrevId {
    pub out_point: OutPoint,
    pub asset_id: AssetId,
    pub script_key: SerializedKey,
}

impl PrevId {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.out_point.txid);
        out.extend_from_slice(&self.out_point.vout.to_be_bytes());
        out.extend_from_slice(self.asset_id.as_bytes());
        out.extend_from_slice(self.script_key.as_bytes());
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let txid = reader.array()?;
        let vout = reader.u32()?;
        Ok(Self {
            out_point: OutPoint { txid, vout },
            asset_id: AssetId(reader.array()?),
            script_key: SerializedKey::read(reader)?,
        })
    }
}

impl Display for PrevId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.out_point, self.asset_id, self.script_key)
    }
}

/// Witness of a previous asset output.
///
/// The root asset has one witness per spent input. A split asset has a single
/// witness without `prev_id` that carries its split commitment.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Witness {
    pub prev_id: Option<PrevId>,
    pub tx_witness: Vec<Vec<u8>>,
    pub split_commitment: Option<SplitCommitment>,
}

impl Witness {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), DecodeError> {
        put_flag(out, self.prev_id.is_some());
        if let Some(prev_id) = &self.prev_id {
            prev_id.encode(out);
        }
        put_u16_len(out, self.tx_witness.len())?;
        for item in &self.tx_witness {
            put_u16_len(out, item.len())?;
            out.extend_from_slice(item);
        }
        put_flag(out, self.split_commitment.is_some());
        if let Some(commitment) = &self.split_commitment {
            commitment.encode_into(out)?;
        }
        Ok(())
    }

    fn read(reader: &mut Reader<'_>, allow_commitment: bool) -> Result<Self, DecodeError> {
        let prev_id = if reader.flag()? {
            Some(PrevId::read(reader)?)
        } else {
            None
        };
        let count = reader.u16()?;
        let mut tx_witness = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = reader.u16()? as usize;
            tx_witness.push(reader.take(len)?.to_vec());
        }
        let split_commitment = if reader.flag()? {
            if !allow_commitment {
                return Err(DecodeError::NestedSplitCommitment);
            }
            Some(SplitCommitment::read(reader)?)
        } else {
            None
        };
        Ok(Self {
            prev_id,
            tx_witness,
            split_commitment,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub version: u8,
    pub asset_id: AssetId,
    pub amount: u64,
    pub script_key: SerializedKey,
    pub prev_witnesses: Vec<Witness>,
    /// Set on the root asset of a split only.
    pub split_commitment_root: Option<SplitRoot>,
}

impl Asset {
    /// A fresh asset with no witnesses.
    pub fn new(version: u8, asset_id: AssetId, amount: u64, script_key: SerializedKey) -> Self {
        Self {
            version,
            asset_id,
            amount,
            script_key,
            prev_witnesses: Vec::new(),
            split_commitment_root: None,
        }
    }

    /// The split commitment of a split asset, held by its first witness.
    pub fn split_commitment(&self) -> Option<&SplitCommitment> {
        self.prev_witnesses
            .first()
            .and_then(|witness| witness.split_commitment.as_ref())
    }

    pub fn is_split_root(&self) -> bool {
        self.split_commitment_root.is_some()
    }

    /// The asset without witnesses nor split commitment root, which is what a
    /// split leaf commits to.
    pub fn leaf_state(&self) -> Self {
        Self::new(self.version, self.asset_id, self.amount, self.script_key)
    }

    /// SHA-256 of the encoded [`Asset::leaf_state`].
    pub fn state_digest(&self) -> [u8; 32] {
        let mut out = Vec::with_capacity(Self::STATE_SIZE);
        self.encode_header(&mut out);
        put_flag(&mut out, false);
        out.extend_from_slice(&0u16.to_be_bytes());
        Sha256::digest(&out).into()
    }

    const STATE_SIZE: usize = 1 + AssetId::LEN + 8 + SerializedKey::LEN + 1 + 2;

    fn encode_header(&self, out: &mut Vec<u8>) {
        out.push(self.version);
        out.extend_from_slice(self.asset_id.as_bytes());
        out.extend_from_slice(&self.amount.to_be_bytes());
        out.extend_from_slice(self.script_key.as_bytes());
    }

    /// `version | asset id | amount | script key | root flag [root] | witness
    /// count u16 | witnesses`. Fails when a length does not fit its prefix.
    pub fn encode(&self) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::with_capacity(Self::STATE_SIZE);
        self.encode_into(&mut out)?;
        Ok(out)
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), DecodeError> {
        self.encode_header(out);
        put_flag(out, self.split_commitment_root.is_some());
        if let Some(root) = &self.split_commitment_root {
            root.encode(out);
        }
        put_u16_len(out, self.prev_witnesses.len())?;
        for witness in &self.prev_witnesses {
            witness.encode(out)?;
        }
        Ok(())
    }

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let asset = Self::read(&mut reader, true)?;
        reader.finish()?;
        Ok(asset)
    }

    fn read(reader: &mut Reader<'_>, allow_commitment: bool) -> Result<Self, DecodeError> {
        let version = reader.u8()?;
        let asset_id = AssetId(reader.array()?);
        let amount = reader.u64()?;
        let script_key = SerializedKey::read(reader)?;
        let split_commitment_root = if reader.flag()? {
            Some(ComputedNode::read(reader)?)
        } else {
            None
        };
        let count = reader.u16()?;
        let mut prev_witnesses = Vec::with_capacity(count as usize);
        for _ in 0..count {
            prev_witnesses.push(Witness::read(reader, allow_commitment)?);
        }
        Ok(Self {
            version,
            asset_id,
            amount,
            script_key,
            prev_witnesses,
            split_commitment_root,
        })
    }
}

/// What a split asset carries to prove its share of a split: the key of the
/// root locator, its inclusion proof and a copy of the root asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitCommitment {
    pub root_key: [u8; 32],
    pub proof: SplitProof,
    pub root_asset: Asset,
}

impl SplitCommitment {
    /// Checks `asset` against its `locator` using nothing but this commitment.
    pub fn verify(&self, locator: &Locator, asset: &Asset) -> bool {
        let Some(root) = self.root_asset.split_commitment_root else {
            return false;
        };
        if asset.amount != locator.amount || asset.script_key != locator.script_key {
            return false;
        }
        self.proof
            .verify_inclusion(&locator.key(), encode_leaf(asset.amount, asset), &root)
    }

    /// `root key | proof len u32 | compressed proof | root len u32 | root asset`.
    pub fn encode(&self) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), DecodeError> {
        out.extend_from_slice(&self.root_key);
        put_var_bytes(out, &self.proof.compress()?.encode()?)?;
        put_var_bytes(out, &self.root_asset.encode()?)
    }

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let commitment = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(commitment)
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let root_key = reader.array()?;
        let proof = CompressedProof::decode(reader.var_bytes()?)?.decompress()?;

        let mut root_reader = Reader::new(reader.var_bytes()?);
        let root_asset = Asset::read(&mut root_reader, false)?;
        root_reader.finish()?;

        Ok(Self {
            root_key,
            proof,
            root_asset,
        })
    }
}
