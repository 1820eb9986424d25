//! Split vectors shared with other implementations: roots and proofs must match
//! byte for byte.
mod types;

use std::fs;
use std::path::PathBuf;

use sha2::Sha256;

use crate::split::{build_split, verify_split, SplitSet};
use crate::tests::vectors::types::{bytes, error_name, inputs, locators, TestVectors};
use crate::CompressedProof;

fn load(name: &str) -> TestVectors {
    let path = PathBuf::from("src/tests/vectors/testdata").join(name);
    let json = fs::read_to_string(&path).unwrap();
    serde_json::from_str::<TestVectors>(&json).unwrap()
}

fn run_split_vectors(test_vectors: &TestVectors) {
    for valid_case in &test_vectors.valid_test_cases {
        let comment = valid_case.comment.as_deref().unwrap_or("unnamed test");
        println!("Running test case: {}", comment);

        let inputs = inputs(&valid_case.inputs);
        let root_locator = valid_case.root_locator.to_locator();
        let split_locators = locators(&valid_case.split_locators);
        let split = build_split(&inputs, &root_locator, &split_locators).unwrap();

        let root = split.root_commitment();
        assert_eq!(root.hash(), bytes::<32>(&valid_case.root_hash), "{comment}");
        assert_eq!(root.sum(), valid_case.root_sum, "{comment}");

        for locator in &split_locators {
            let key = hex::encode(locator.key());
            let expected = hex::decode(&valid_case.split_proofs[&key]).unwrap();
            let output = split.split_asset(&locator.id()).unwrap();
            let commitment = output.asset.split_commitment().unwrap();
            assert_eq!(commitment.proof.compress().unwrap().encode().unwrap(), expected, "{comment}");

            let decoded = CompressedProof::<32, Sha256>::decode(&expected)
                .unwrap()
                .decompress()
                .unwrap();
            assert_eq!(decoded, commitment.proof, "{comment}");
        }

        let all_locators: Vec<_> = split.locators().copied().collect();
        let total = valid_case.inputs.iter().map(|input| input.amount).sum();
        assert!(verify_split(&all_locators, split.split_assets(), total).unwrap());
    }

    for error_case in &test_vectors.error_test_cases {
        let comment = error_case.comment.as_deref().unwrap_or("unnamed error test");
        println!("Running error test case: {}", comment);

        let err = build_split(
            &inputs(&error_case.inputs),
            &error_case.root_locator.to_locator(),
            &locators(&error_case.split_locators),
        )
        .unwrap_err();
        assert_eq!(error_name(&err), error_case.error, "{comment}");
    }
}

#[test]
fn test_split_vectors() {
    run_split_vectors(&load("split_vectors.json"));
}

#[test]
fn test_vectors_through_the_wire() {
    // every split output survives an encode/decode of its asset
    let test_vectors = load("split_vectors.json");
    for valid_case in &test_vectors.valid_test_cases {
        let split = build_split(
            &inputs(&valid_case.inputs),
            &valid_case.root_locator.to_locator(),
            &locators(&valid_case.split_locators),
        )
        .unwrap();
        let decoded: SplitSet = split
            .split_assets()
            .iter()
            .map(|(id, output)| {
                let mut output = output.clone();
                output.asset = crate::Asset::decode(&output.asset.encode().unwrap()).unwrap();
                (*id, output)
            })
            .collect();
        assert_eq!(&decoded, split.split_assets());
        let all_locators: Vec<_> = split.locators().copied().collect();
        assert!(verify_split(&all_locators, &decoded, valid_case.root_sum).unwrap());
    }
}
