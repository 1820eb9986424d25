//! A recipient checks its share of a split from nothing but the encoded asset
//! it received and the locator it agreed on with the sender.

use asset_split::{
    build_split, Asset, AssetId, Locator, OutPoint, SerializedKey, SplitInput,
};

/// Sender side: splits 1000 units and hands out the recipient's encoded asset.
fn send(recipient: &Locator) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let asset_id = recipient.asset_id;
    let input = SplitInput {
        asset: Asset::new(0, asset_id, 1000, SerializedKey::new(true, [9; 32])),
        out_point: OutPoint {
            txid: [0x42; 32],
            vout: 3,
        },
    };
    let change = Locator::new(
        0,
        asset_id,
        1000 - recipient.amount,
        SerializedKey::new(false, [8; 32]),
    );

    let split = build_split(&[input], &change, &[*recipient])?;
    let output = split
        .split_asset(&recipient.id())
        .ok_or("recipient output missing")?;
    Ok(output.asset.encode()?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recipient = Locator::new(
        1,
        AssetId([5; 32]),
        250,
        SerializedKey::new(false, [6; 32]),
    );
    let bytes = send(&recipient)?;
    println!("received {} bytes", bytes.len());

    let asset = Asset::decode(&bytes)?;
    let commitment = asset
        .split_commitment()
        .ok_or("asset carries no split commitment")?;
    println!(
        "root asset holds {} units",
        commitment.root_asset.amount
    );
    println!("share verified: {}", commitment.verify(&recipient, &asset));

    let mut inflated = asset.clone();
    inflated.amount += 1;
    let claimed = Locator {
        amount: inflated.amount,
        ..recipient
    };
    println!(
        "inflated share verified: {}",
        commitment.verify(&claimed, &inflated)
    );
    Ok(())
}
