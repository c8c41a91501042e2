//! wallet-ledger: wallet-side ledger reconciliation for CryptoNote wallets.
//!
//! Pieces:
//! - Model: transactions, inputs, outputs and their raw persisted shapes
//! - Keys: wallet key material and the tagged key export forms
//! - Crypto: key derivation / key image / address primitives behind a trait
//! - Index: derived key-image lookup, rebuilt whenever the ledger changes
//! - Reconcile: derive missing key images, attribute inputs, prune the rest
//! - Balance: signed totals over committed and pending transactions
//! - Wallet: the aggregate tying it together, with change notifications
//! - Storage: persistence boundary (in-memory or JSON file supplied by caller)
//!
//! An input only counts as spending wallet funds once its key image matches an
//! owned output already in the ledger.
pub mod balance;
pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod index;
pub mod keys;
pub mod model;
pub mod reconcile;
pub mod storage;
pub mod wallet;
pub use balance::BalanceSummary;
pub use config::WalletOptions;
pub use crypto::{KeyDerivation, KeyPrimitives, MoneroPrimitives};
pub use error::{CryptoError, LedgerError, Result};
pub use events::{EventBus, LedgerChanged, SubscriptionId};
pub use index::{IndexedOutput, KeyImageIndex};
pub use keys::{KeyExport, PublicKeys, RawKeys, WalletKeys};
pub use model::{
    KeyImage, PublicKey, RawInput, RawOutput, RawTransaction, Transaction, TxHash, TxInput,
    TxOutput, UNKNOWN_AMOUNT,
};
pub use monero_address::Network;
pub use reconcile::ReconcileReport;
pub use storage::{InMemoryStore, JsonFileStore, WalletStore};
pub use wallet::{has_pending_changes, RawWallet, Wallet};
