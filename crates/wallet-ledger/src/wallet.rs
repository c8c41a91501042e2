//! The wallet aggregate: owns the ledger and keeps its derived state current.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::balance::{self, BalanceSummary};
use crate::config::WalletOptions;
use crate::crypto::{KeyPrimitives, MoneroPrimitives};
use crate::error::Result;
use crate::events::{EventBus, LedgerChanged, SubscriptionId};
use crate::index::KeyImageIndex;
use crate::keys::{KeyExport, WalletKeys};
use crate::model::{KeyImage, PublicKey, RawTransaction, Transaction, TxHash, TxOutput};
use crate::reconcile::{self, ReconcileReport};
use crate::storage::WalletStore;

/// Persisted shape of a wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWallet {
    pub transactions: Vec<RawTransaction>,
    pub last_height: u64,
    /// Kept for compatibility with existing wallet files; always empty.
    #[serde(default)]
    pub nonce: String,
    pub keys: KeyExport,
    #[serde(default)]
    pub creation_height: Option<u64>,
    #[serde(default)]
    pub options: Option<WalletOptions>,
}

/// True when the ledger moved past the last persisted version.
pub fn has_pending_changes(version: u64, persisted_version: u64) -> bool {
    version != persisted_version
}

pub struct Wallet<P: KeyPrimitives = MoneroPrimitives> {
    transactions: Vec<Transaction>,
    /// Unconfirmed transactions built or seen locally; never persisted.
    pending: Vec<Transaction>,
    index: KeyImageIndex,
    last_height: u64,
    creation_height: u64,
    keys: WalletKeys,
    options: WalletOptions,
    primitives: P,
    version: u64,
    persisted_version: u64,
    last_reconcile: ReconcileReport,
    events: EventBus,
}

impl<P: KeyPrimitives> Wallet<P> {
    pub fn new(keys: WalletKeys, primitives: P) -> Self {
        Self {
            transactions: Vec::new(),
            pending: Vec::new(),
            index: KeyImageIndex::default(),
            last_height: 0,
            creation_height: 0,
            keys,
            options: WalletOptions::default(),
            primitives,
            version: 1,
            persisted_version: 0,
            last_reconcile: ReconcileReport::default(),
            events: EventBus::new(),
        }
    }

    pub fn keys(&self) -> &WalletKeys {
        &self.keys
    }

    pub fn primitives(&self) -> &P {
        &self.primitives
    }

    pub fn is_view_only(&self) -> bool {
        self.keys.is_view_only()
    }

    pub fn public_address(&self) -> Result<String> {
        Ok(self
            .primitives
            .public_address(&self.keys.public.spend, &self.keys.public.view)?)
    }

    pub fn last_height(&self) -> u64 {
        self.last_height
    }

    /// Writing the current value again is not a change and notifies nobody.
    pub fn set_last_height(&mut self, height: u64) {
        if height == self.last_height {
            return;
        }
        self.last_height = height;
        self.commit();
    }

    pub fn creation_height(&self) -> u64 {
        self.creation_height
    }

    pub fn set_creation_height(&mut self, height: u64) {
        if height == self.creation_height {
            return;
        }
        self.creation_height = height;
        self.commit();
    }

    pub fn options(&self) -> &WalletOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: WalletOptions) {
        self.options = options;
        self.commit();
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Detached copy of the ledger; mutating it does not touch the wallet.
    pub fn transactions_copy(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn all_outputs(&self) -> impl Iterator<Item = &TxOutput> + '_ {
        self.transactions.iter().flat_map(|tx| tx.outs.iter())
    }

    pub fn key_images(&self) -> &[KeyImage] {
        self.index.key_images()
    }

    pub fn output_global_indexes(&self) -> &[u64] {
        self.index.global_indexes()
    }

    /// Inserts `tx`, or overwrites the entry with the same transaction public key
    /// in place when `replace` is set. Returns false when nothing changed.
    pub fn add_new(&mut self, tx: Transaction, replace: bool) -> bool {
        match self
            .transactions
            .iter()
            .position(|existing| existing.tx_pub_key == tx.tx_pub_key)
        {
            Some(_) if !replace => return false,
            Some(pos) => self.transactions[pos] = tx,
            None => self.transactions.push(tx),
        }
        self.index = KeyImageIndex::rebuild(&self.transactions);
        self.commit();
        true
    }

    pub fn add(&mut self, tx: Transaction) -> bool {
        self.add_new(tx, true)
    }

    pub fn find_by_tx_pub_key(&self, tx_pub_key: &PublicKey) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|tx| &tx.tx_pub_key == tx_pub_key)
    }

    pub fn find_output_by_global_index(&self, global_index: u64) -> Option<&TxOutput> {
        self.all_outputs().find(|out| out.global_index == global_index)
    }

    /// Output `output_idx` of the transaction with hash `tx_hash`.
    pub fn find_output(&self, tx_hash: &TxHash, output_idx: u32) -> Option<&TxOutput> {
        self.transactions
            .iter()
            .filter(|tx| &tx.hash == tx_hash)
            .flat_map(|tx| tx.outs.iter())
            .find(|out| out.output_idx == output_idx)
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn set_pending(&mut self, pending: Vec<Transaction>) {
        self.pending = pending;
        self.notify();
    }

    pub fn reconcile(&mut self) -> ReconcileReport {
        let report = reconcile::reconcile(
            &mut self.transactions,
            &mut self.index,
            &self.keys,
            &self.primitives,
        );
        self.last_reconcile = report;
        if report.changed() {
            self.commit();
        }
        report
    }

    /// Report of the most recent pass, including the one run on load.
    pub fn last_reconcile(&self) -> &ReconcileReport {
        &self.last_reconcile
    }

    pub fn amount(&self) -> i64 {
        self.unlocked_amount(None)
    }

    pub fn unlocked_amount(&self, at_height: Option<u64>) -> i64 {
        balance::unlocked_amount(&self.transactions, &self.pending, at_height)
    }

    pub fn balance(&self, at_height: Option<u64>) -> BalanceSummary {
        balance::summarize(&self.transactions, &self.pending, at_height)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn persisted_version(&self) -> u64 {
        self.persisted_version
    }

    pub fn has_pending_changes(&self) -> bool {
        has_pending_changes(self.version, self.persisted_version)
    }

    /// Called by the persistence layer with the version it wrote.
    pub fn mark_persisted(&mut self, version: u64) {
        self.persisted_version = version;
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&LedgerChanged) + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn export_to_raw(&self, include_keys: bool) -> Result<RawWallet> {
        Ok(RawWallet {
            transactions: self
                .transactions
                .iter()
                .map(Transaction::to_raw)
                .collect::<Result<_>>()?,
            last_height: self.last_height,
            nonce: String::new(),
            keys: self.keys.export(include_keys),
            creation_height: (self.creation_height != 0).then_some(self.creation_height),
            options: Some(self.options.clone()),
        })
    }

    /// Inverse of [`Wallet::export_to_raw`]; runs one reconciliation pass so
    /// key images and spent inputs reflect the loaded ledger.
    pub fn load_from_raw(raw: &RawWallet, include_keys: bool, primitives: P) -> Result<Self> {
        let keys = WalletKeys::import(&raw.keys, include_keys, &primitives)?;
        let parsed = raw
            .transactions
            .iter()
            .map(Transaction::from_raw)
            .collect::<Result<Vec<_>>>()?;
        let (transactions, collapsed) = collapse_duplicates(parsed);

        let mut wallet = Self::new(keys, primitives);
        wallet.index = KeyImageIndex::rebuild(&transactions);
        wallet.transactions = transactions;
        wallet.last_height = raw.last_height;
        wallet.creation_height = raw.creation_height.unwrap_or_default();
        wallet.options = raw.options.clone().unwrap_or_default();
        wallet.persisted_version = wallet.version;
        if collapsed > 0 {
            warn!("collapsed {collapsed} transactions sharing a transaction public key");
            wallet.commit();
        }

        let report = wallet.reconcile();
        debug!("reconciled loaded wallet: {report:?}");
        Ok(wallet)
    }

    pub fn save<S: WalletStore>(&mut self, store: &S, include_keys: bool) -> Result<()> {
        let raw = self.export_to_raw(include_keys)?;
        store.save(&raw)?;
        self.mark_persisted(self.version);
        info!(
            "saved wallet at version {} ({} transactions)",
            self.version,
            raw.transactions.len()
        );
        Ok(())
    }

    pub fn open<S: WalletStore>(store: &S, include_keys: bool, primitives: P) -> Result<Option<Self>> {
        let Some(raw) = store.load()? else {
            return Ok(None);
        };
        let wallet = Self::load_from_raw(&raw, include_keys, primitives)?;
        info!(
            "opened wallet at height {} ({} transactions)",
            wallet.last_height,
            wallet.transactions.len()
        );
        Ok(Some(wallet))
    }

    fn commit(&mut self) {
        self.version += 1;
        self.notify();
    }

    fn notify(&self) {
        self.events.emit(&LedgerChanged {
            version: self.version,
        });
    }
}

/// Keeps one entry per transaction public key: the last occurrence's content
/// at the first occurrence's position, as a sequence of replacing inserts would.
fn collapse_duplicates(parsed: Vec<Transaction>) -> (Vec<Transaction>, usize) {
    let mut out: Vec<Transaction> = Vec::with_capacity(parsed.len());
    let mut position: HashMap<PublicKey, usize> = HashMap::new();
    let mut collapsed = 0;
    for tx in parsed {
        match position.get(&tx.tx_pub_key) {
            Some(&pos) => {
                out[pos] = tx;
                collapsed += 1;
            }
            None => {
                position.insert(tx.tx_pub_key, out.len());
                out.push(tx);
            }
        }
    }
    (out, collapsed)
}

impl<P: KeyPrimitives> std::fmt::Debug for Wallet<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("keys", &self.keys)
            .field("transactions", &self.transactions.len())
            .field("pending", &self.pending.len())
            .field("last_height", &self.last_height)
            .field("version", &self.version)
            .finish()
    }
}
