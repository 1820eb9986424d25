use std::convert::Infallible;

use asset_split::{CompactMSSMT, CompressedProof, ComputedNode, Leaf, MemoryDb, Proof, MSSMT};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sha2::Sha256;

pub fn generate_random_key() -> [u8; 32] {
    rand::random()
}

pub fn generate_random_leaf() -> Leaf<32, Sha256> {
    let value: [u8; 32] = rand::random();
    Leaf::new(value.to_vec(), rand::random::<u32>() as u64)
}

#[allow(clippy::type_complexity)]
fn setup_trees(
    num_leaves: usize,
) -> (
    MSSMT<32, Sha256, Infallible>,
    CompactMSSMT<32, Sha256, Infallible>,
    Vec<([u8; 32], Leaf<32, Sha256>)>,
) {
    let mut regular_tree = MSSMT::new(Box::new(MemoryDb::<32, Sha256>::new()));
    let mut compact_tree = CompactMSSMT::new(Box::new(MemoryDb::<32, Sha256>::new()));

    let mut entries = Vec::with_capacity(num_leaves);
    for _ in 0..num_leaves {
        let key = generate_random_key();
        let leaf = generate_random_leaf();
        regular_tree.insert(key, leaf.clone()).unwrap();
        compact_tree.insert(key, leaf.clone()).unwrap();
        entries.push((key, leaf));
    }

    (regular_tree, compact_tree, entries)
}

fn bench_proof_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("MSSMT Proof Generation");
    let (regular_tree, compact_tree, entries) = setup_trees(100);

    group.bench_function("Regular Tree", |b| {
        b.iter(|| {
            for (key, _) in &entries {
                black_box(regular_tree.inclusion_proof(key)).unwrap();
            }
        })
    });

    group.bench_function("Compact Tree", |b| {
        b.iter(|| {
            for (key, _) in &entries {
                black_box(compact_tree.inclusion_proof(key)).unwrap();
            }
        })
    });

    group.finish();
}

fn bench_proof_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("MSSMT Proof Verification");
    let (_, compact_tree, entries) = setup_trees(100);
    let root = compact_tree.root().unwrap();
    let root = ComputedNode::new(root.hash(), root.sum());
    let proofs: Vec<Proof<32, Sha256>> = entries
        .iter()
        .map(|(key, _)| compact_tree.inclusion_proof(key).unwrap().to_computed())
        .collect();

    group.bench_function("Inclusion", |b| {
        b.iter(|| {
            for ((key, leaf), proof) in entries.iter().zip(&proofs) {
                assert!(black_box(proof.verify_inclusion(key, leaf.clone(), &root)));
            }
        })
    });

    let encoded: Vec<Vec<u8>> = proofs
        .iter()
        .map(|proof| proof.compress().unwrap().encode().unwrap())
        .collect();
    group.bench_function("Decode", |b| {
        b.iter(|| {
            for bytes in &encoded {
                black_box(CompressedProof::<32, Sha256>::decode(bytes))
                    .unwrap()
                    .decompress()
                    .unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_proof_generation, bench_proof_verification);
criterion_main!(benches);
