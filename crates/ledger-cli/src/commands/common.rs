use std::path::PathBuf;

use anyhow::{anyhow, ensure, Context, Result};
use clap::ValueEnum;
use wallet_ledger::{JsonFileStore, MoneroPrimitives, Network, Wallet};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum NetworkArg {
    Mainnet,
    Stagenet,
    Testnet,
}

impl From<NetworkArg> for Network {
    fn from(value: NetworkArg) -> Self {
        match value {
            NetworkArg::Mainnet => Network::Mainnet,
            NetworkArg::Stagenet => Network::Stagenet,
            NetworkArg::Testnet => Network::Testnet,
        }
    }
}

/// Where the wallet lives and how it is read and written.
pub struct WalletFile {
    pub path: PathBuf,
    pub network: Network,
    pub include_keys: bool,
}

impl WalletFile {
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.path)
    }

    pub fn primitives(&self) -> MoneroPrimitives {
        MoneroPrimitives::new(self.network)
    }

    pub fn open(&self) -> Result<Wallet> {
        Wallet::open(&self.store(), self.include_keys, self.primitives())
            .with_context(|| format!("read wallet {}", self.path.display()))?
            .ok_or_else(|| {
                anyhow!(
                    "no wallet at {}; run `ledger-cli init` first",
                    self.path.display()
                )
            })
    }

    /// Writes the wallet back when it moved past the persisted version.
    pub fn save(&self, wallet: &mut Wallet) -> Result<()> {
        if !wallet.has_pending_changes() {
            log::debug!("wallet unchanged, nothing to write");
            return Ok(());
        }
        wallet
            .save(&self.store(), self.include_keys)
            .with_context(|| format!("write wallet {}", self.path.display()))
    }
}

pub fn parse_hex_array<const N: usize>(value: &str, label: &str) -> Result<[u8; N]> {
    let trimmed = value.trim().trim_start_matches("0x");
    let bytes = hex::decode(trimmed).map_err(|e| anyhow!("decode {label}: {e}"))?;
    ensure!(
        bytes.len() == N,
        "{label} must be {N} bytes, got {}",
        bytes.len()
    );
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}
