use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use wallet_ledger::{RawTransaction, Transaction};

use super::common::WalletFile;

#[derive(Clone, Debug, Args)]
pub struct AddTxArgs {
    /// JSON file holding one raw transaction or an array of them; `-` reads stdin.
    #[arg(long)]
    pub tx: PathBuf,

    /// Keep the stored entry when one with the same transaction public key exists.
    #[arg(long)]
    pub no_replace: bool,

    /// Run a reconciliation pass before writing the wallet back.
    #[arg(long)]
    pub reconcile: bool,
}

pub fn run(file: &WalletFile, args: AddTxArgs) -> Result<()> {
    let raw = read_batch(&args.tx)?;
    let mut wallet = file.open()?;

    let mut added = 0usize;
    let mut skipped = 0usize;
    for (i, raw_tx) in raw.iter().enumerate() {
        let tx = Transaction::from_raw(raw_tx).with_context(|| format!("transaction #{i}"))?;
        if wallet.add_new(tx, !args.no_replace) {
            added += 1;
        } else {
            skipped += 1;
        }
    }
    if args.reconcile {
        let report = wallet.reconcile();
        log::debug!("reconcile after add: {report:?}");
    }
    file.save(&mut wallet)?;

    println!("added={added}");
    println!("skipped={skipped}");
    println!("transactions={}", wallet.transactions().len());
    Ok(())
}

fn read_batch(path: &Path) -> Result<Vec<RawTransaction>> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read transactions from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
    };
    let value: Value = serde_json::from_str(&text).context("parse transaction JSON")?;
    let batch = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        single => vec![serde_json::from_value(single)?],
    };
    Ok(batch)
}
