//! Persistence boundary. The ledger hands over a [`RawWallet`] and gets one back;
//! where the bytes live is up to the store.

use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::wallet::RawWallet;

/// Holds at most one persisted wallet.
pub trait WalletStore: Send + Sync + 'static {
    fn save(&self, raw: &RawWallet) -> Result<()>;
    fn load(&self) -> Result<Option<RawWallet>>;
}

/// Keeps the last saved wallet as bincode bytes.
#[derive(Default)]
pub struct InMemoryStore {
    slot: RwLock<Option<Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.slot.write().take();
    }
}

impl WalletStore for InMemoryStore {
    fn save(&self, raw: &RawWallet) -> Result<()> {
        let encoded = bincode::serialize(raw)?;
        *self.slot.write() = Some(encoded);
        Ok(())
    }

    fn load(&self) -> Result<Option<RawWallet>> {
        match self.slot.read().as_deref() {
            Some(encoded) => Ok(Some(bincode::deserialize(encoded)?)),
            None => Ok(None),
        }
    }
}

/// A wallet file holding one [`RawWallet`] as JSON. Writes go through a
/// sibling temp file and a rename.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl WalletStore for JsonFileStore {
    fn save(&self, raw: &RawWallet) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(raw)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// A missing or empty file means no wallet yet.
    fn load(&self) -> Result<Option<RawWallet>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }
}
