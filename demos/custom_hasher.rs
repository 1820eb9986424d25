//! Example of implementing a custom hasher for the Merkle Sum Sparse Merkle Tree
//!
//! This example demonstrates:
//! - Creating a custom hasher implementation
//! - Using it with both tree layouts
//! - Checking an inclusion proof produced under the custom hasher

use std::convert::Infallible;

use asset_split::{CompactMSSMT, Hasher, Leaf, MemoryDb, MSSMT};
use sha2::{Digest, Sha256};

// SHA256 with a domain prefix on every input
#[derive(Clone)]
struct PrefixedSha256;

impl Hasher<32> for PrefixedSha256 {
    fn hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"custom_prefix:");
        hasher.update(data);
        hasher.finalize().into()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree =
        MSSMT::<32, PrefixedSha256, Infallible>::new(Box::new(MemoryDb::<32, PrefixedSha256>::new()));
    let mut compact = CompactMSSMT::<32, PrefixedSha256, Infallible>::new(Box::new(
        MemoryDb::<32, PrefixedSha256>::new(),
    ));

    let leaf = Leaf::<32, PrefixedSha256>::new(vec![1, 2, 3], 100);
    tree.insert([1; 32], leaf.clone())?;
    compact.insert([1; 32], leaf.clone())?;

    let root = tree.root()?;
    println!("Root hash with custom hasher: {}", hex::encode(root.hash()));
    assert_eq!(root.hash(), compact.root()?.hash());

    let proof = compact.merkle_proof(&[1; 32])?;
    proof.verify_merkle_proof::<Infallible>(&[1; 32], leaf, root.hash())?;
    println!("Proof verified against the regular tree root");

    let mut standard = MSSMT::<32, Sha256, Infallible>::new(Box::new(MemoryDb::<32, Sha256>::new()));
    standard.insert([1; 32], Leaf::new(vec![1, 2, 3], 100))?;
    println!(
        "Root hash with standard SHA256: {}",
        hex::encode(standard.root()?.hash())
    );
    Ok(())
}
