//! Splits one asset of 100 units into three outputs and checks the result.

use asset_split::{
    build_split, verify_split, Asset, AssetId, Locator, OutPoint, SerializedKey, SplitInput,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let asset_id = AssetId([7; 32]);
    let input = SplitInput {
        asset: Asset::new(0, asset_id, 100, SerializedKey::new(false, [1; 32])),
        out_point: OutPoint {
            txid: [0xaa; 32],
            vout: 0,
        },
    };

    // the sender keeps 40 units on output 0
    let root = Locator::new(0, asset_id, 40, SerializedKey::new(false, [2; 32]));
    let splits = [
        Locator::new(1, asset_id, 35, SerializedKey::new(true, [3; 32])),
        Locator::new(2, asset_id, 25, SerializedKey::new(false, [4; 32])),
    ];

    let split = build_split(&[input], &root, &splits)?;
    let commitment = split.root_commitment();
    println!(
        "split root: {} (sum {})",
        hex::encode(commitment.hash()),
        commitment.sum()
    );

    for output in split.split_assets().values() {
        let encoded = output.asset.encode()?;
        println!(
            "output {}: {} units, root={}, {} bytes encoded",
            output.output_index,
            output.asset.amount,
            output.asset.is_split_root(),
            encoded.len()
        );
    }

    let locators: Vec<_> = split.locators().copied().collect();
    let valid = verify_split(&locators, split.split_assets(), split.input_total())?;
    println!("split valid: {valid}");
    Ok(())
}
