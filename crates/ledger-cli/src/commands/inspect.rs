use std::collections::HashSet;

use anyhow::Result;
use clap::Args;

use super::common::WalletFile;

#[derive(Clone, Debug, Args)]
pub struct BalanceArgs {
    /// Height to evaluate unlocked funds at; defaults to the wallet's last height.
    #[arg(long)]
    pub height: Option<u64>,
}

#[derive(Clone, Debug, Args)]
pub struct SetHeightArgs {
    pub height: u64,
}

/// Opening a wallet already runs a pass; this prints it and persists the result.
pub fn reconcile(file: &WalletFile) -> Result<()> {
    let mut wallet = file.open()?;
    let report = *wallet.last_reconcile();
    file.save(&mut wallet)?;

    println!("view_only={}", report.skipped_view_only);
    println!("derived_key_images={}", report.derived_key_images);
    println!("derivation_failures={}", report.derivation_failures);
    println!("key_image_failures={}", report.key_image_failures);
    println!("resolved_inputs={}", report.resolved_inputs);
    println!("pruned_inputs={}", report.pruned_inputs);
    println!("pruned_transactions={}", report.pruned_transactions);
    println!("transactions={}", wallet.transactions().len());
    Ok(())
}

pub fn balance(file: &WalletFile, args: BalanceArgs) -> Result<()> {
    let wallet = file.open()?;
    let height = args
        .height
        .or_else(|| (wallet.last_height() != 0).then_some(wallet.last_height()));
    let summary = wallet.balance(height);

    match height {
        Some(h) => println!("height={h}"),
        None => println!("height=-"),
    }
    println!("total={}", summary.total);
    println!("unlocked={}", summary.unlocked);
    println!("locked={}", summary.locked());
    Ok(())
}

pub fn outputs(file: &WalletFile) -> Result<()> {
    let wallet = file.open()?;
    let spent: HashSet<_> = wallet
        .transactions()
        .iter()
        .flat_map(|tx| tx.ins.iter())
        .filter(|input| input.is_resolved())
        .map(|input| input.key_image)
        .collect();

    for tx in wallet.transactions() {
        for out in &tx.outs {
            let key_image = out.key_image.map(hex::encode);
            let is_spent = out.key_image.is_some_and(|ki| spent.contains(&ki));
            println!(
                "tx={} idx={} amount={} global_index={} height={} key_image={} spent={}",
                hex::encode(tx.hash),
                out.output_idx,
                out.amount,
                out.global_index,
                tx.block_height,
                key_image.as_deref().unwrap_or("-"),
                is_spent
            );
        }
    }
    Ok(())
}

pub fn address(file: &WalletFile) -> Result<()> {
    let wallet = file.open()?;
    println!("address={}", wallet.public_address()?);
    println!("view_only={}", wallet.is_view_only());
    Ok(())
}

pub fn set_height(file: &WalletFile, args: SetHeightArgs) -> Result<()> {
    let mut wallet = file.open()?;
    wallet.set_last_height(args.height);
    file.save(&mut wallet)?;
    println!("last_height={}", wallet.last_height());
    Ok(())
}
