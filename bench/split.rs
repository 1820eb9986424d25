use asset_split::mock::{rand_asset, rand_out_point, rand_script_key};
use asset_split::{build_split, verify_split, Locator, SplitInput};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A split of one random asset into `outputs` outputs, the root taking the rest.
fn setup_split(outputs: usize) -> (Vec<SplitInput>, Locator, Vec<Locator>) {
    let mut rng = StdRng::seed_from_u64(outputs as u64);
    let asset = rand_asset(&mut rng);
    let share = asset.amount / outputs as u64;
    let splits: Vec<_> = (1..outputs as u32)
        .map(|index| Locator::new(index, asset.asset_id, share, rand_script_key(&mut rng)))
        .collect();
    let root = Locator::new(
        0,
        asset.asset_id,
        asset.amount - share * (outputs as u64 - 1),
        rand_script_key(&mut rng),
    );
    let input = SplitInput {
        asset,
        out_point: rand_out_point(&mut rng),
    };
    (vec![input], root, splits)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("Split Build");
    for outputs in [2, 8, 32] {
        let (inputs, root, splits) = setup_split(outputs);
        group.bench_with_input(BenchmarkId::from_parameter(outputs), &outputs, |b, _| {
            b.iter(|| black_box(build_split(&inputs, &root, &splits)).unwrap())
        });
    }
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("Split Verification");
    for outputs in [2, 8, 32] {
        let (inputs, root, splits) = setup_split(outputs);
        let total = inputs[0].asset.amount;
        let split = build_split(&inputs, &root, &splits).unwrap();
        let locators: Vec<_> = split.locators().copied().collect();
        group.bench_with_input(BenchmarkId::from_parameter(outputs), &outputs, |b, _| {
            b.iter(|| {
                assert!(black_box(verify_split(&locators, split.split_assets(), total)).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_verify);
criterion_main!(benches);
