use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::asset::{Asset, AssetId, OutPoint, SerializedKey};
use crate::split::{Locator, SplitInput};
use crate::SplitError;

pub fn bytes<const N: usize>(hex_str: &str) -> [u8; N] {
    hex::decode(hex_str).unwrap().try_into().unwrap()
}

fn script_key(hex_str: &str) -> SerializedKey {
    SerializedKey::from_bytes(bytes(hex_str)).unwrap()
}

/// A spent asset as written in the vectors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestInput {
    pub asset_id: String,
    pub amount: u64,
    pub script_key: String,
    pub txid: String,
    pub vout: u32,
}

impl TestInput {
    pub fn to_split_input(&self) -> SplitInput {
        SplitInput {
            asset: Asset::new(
                0,
                AssetId(bytes(&self.asset_id)),
                self.amount,
                script_key(&self.script_key),
            ),
            out_point: OutPoint {
                txid: bytes(&self.txid),
                vout: self.vout,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestLocator {
    pub output_index: u32,
    pub asset_id: String,
    pub amount: u64,
    pub script_key: String,
}

impl TestLocator {
    pub fn to_locator(&self) -> Locator {
        Locator::new(
            self.output_index,
            AssetId(bytes(&self.asset_id)),
            self.amount,
            script_key(&self.script_key),
        )
    }
}

/// A split that builds, with its expected root and the compressed proof of
/// every split output keyed by the output's leaf key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidTestCase {
    pub comment: Option<String>,
    pub inputs: Vec<TestInput>,
    pub root_locator: TestLocator,
    pub split_locators: Vec<TestLocator>,
    pub root_hash: String,
    pub root_sum: u64,
    pub split_proofs: BTreeMap<String, String>,
}

/// A split the builder must reject with the named error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorTestCase {
    pub comment: Option<String>,
    pub inputs: Vec<TestInput>,
    pub root_locator: TestLocator,
    pub split_locators: Vec<TestLocator>,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestVectors {
    pub valid_test_cases: Vec<ValidTestCase>,
    pub error_test_cases: Vec<ErrorTestCase>,
}

pub fn inputs(inputs: &[TestInput]) -> Vec<SplitInput> {
    inputs.iter().map(TestInput::to_split_input).collect()
}

pub fn locators(locators: &[TestLocator]) -> Vec<Locator> {
    locators.iter().map(TestLocator::to_locator).collect()
}

/// Variant name of a builder error, as written in the vectors
pub fn error_name(err: &SplitError) -> &'static str {
    match err {
        SplitError::EmptyInput => "EmptyInput",
        SplitError::EmptySplitSet => "EmptySplitSet",
        SplitError::DuplicateLocator(_) => "DuplicateLocator",
        SplitError::DuplicateInput(_) => "DuplicateInput",
        SplitError::InputAssetMismatch { .. } => "InputAssetMismatch",
        SplitError::MissingAsset(_) => "MissingAsset",
        SplitError::MissingRootAsset => "MissingRootAsset",
        SplitError::MultipleRootAssets(_) => "MultipleRootAssets",
        SplitError::AmountMismatch { .. } => "AmountMismatch",
        SplitError::Overflow => "Overflow",
        SplitError::Conservation { .. } => "Conservation",
        SplitError::InvalidProof { .. } => "InvalidProof",
        SplitError::InternalProofFailure(_) => "InternalProofFailure",
        SplitError::Tree(_) => "Tree",
        SplitError::Decode(_) => "Decode",
    }
}
