//! Brings the ledger to a consistent state: derives missing key images,
//! attributes spent inputs to owned outputs and prunes what cannot be proven.

use log::debug;

use crate::crypto::KeyPrimitives;
use crate::index::KeyImageIndex;
use crate::keys::WalletKeys;
use crate::model::{Transaction, TxInput};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub skipped_view_only: bool,
    pub derived_key_images: usize,
    /// Transactions whose derivation failed; retried on the next pass.
    pub derivation_failures: usize,
    pub key_image_failures: usize,
    pub resolved_inputs: usize,
    pub pruned_inputs: usize,
    pub pruned_transactions: usize,
}

impl ReconcileReport {
    /// True when the pass mutated the ledger.
    pub fn changed(&self) -> bool {
        self.derived_key_images > 0
            || self.resolved_inputs > 0
            || self.pruned_inputs > 0
            || self.pruned_transactions > 0
    }
}

pub fn reconcile<P: KeyPrimitives>(
    transactions: &mut Vec<Transaction>,
    index: &mut KeyImageIndex,
    keys: &WalletKeys,
    primitives: &P,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let Some(spend_secret) = keys.spend_secret() else {
        report.skipped_view_only = true;
        return report;
    };

    for tx in transactions.iter_mut().filter(|tx| tx.needs_key_images()) {
        let derivation = match primitives.derive(&tx.tx_pub_key, keys.view_secret()) {
            Ok(derivation) => derivation,
            Err(err) => {
                debug!(
                    "skipping key images for tx {}: {err}",
                    hex::encode(tx.hash)
                );
                report.derivation_failures += 1;
                continue;
            }
        };
        for out in tx.outs.iter_mut().filter(|o| o.key_image.is_none()) {
            match primitives.key_image(
                &derivation,
                out.output_idx,
                &keys.public.spend,
                spend_secret,
            ) {
                Ok(ki) => {
                    out.key_image = Some(ki);
                    report.derived_key_images += 1;
                }
                Err(err) => {
                    debug!(
                        "key image failed for tx {} output {}: {err}",
                        hex::encode(tx.hash),
                        out.output_idx
                    );
                    report.key_image_failures += 1;
                }
            }
        }
    }

    if report.derived_key_images > 0 {
        *index = KeyImageIndex::rebuild(transactions);
    }

    for tx in transactions.iter_mut() {
        let ins = std::mem::take(&mut tx.ins);
        tx.ins = ins
            .into_iter()
            .filter_map(|input| resolve_input(input, index, &mut report))
            .collect();
    }

    let before = transactions.len();
    transactions.retain(|tx| !tx.is_empty());
    report.pruned_transactions = before - transactions.len();
    if report.pruned_transactions > 0 {
        *index = KeyImageIndex::rebuild(transactions);
    }

    debug!("reconcile pass: {report:?}");
    report
}

/// Unresolved inputs either pick up their owned output's amount or are dropped.
fn resolve_input(
    input: TxInput,
    index: &KeyImageIndex,
    report: &mut ReconcileReport,
) -> Option<TxInput> {
    if input.is_resolved() {
        return Some(input);
    }
    match index.lookup(&input.key_image) {
        Some(owned) => {
            report.resolved_inputs += 1;
            Some(TxInput {
                amount: Some(owned.amount),
                key_image: input.key_image,
            })
        }
        None => {
            report.pruned_inputs += 1;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyDerivation, MoneroPrimitives};
    use crate::error::CryptoError;
    use crate::keys::PublicKeys;
    use crate::model::{KeyImage, PublicKey, TxOutput};

    /// Deterministic stand-in: the key image is the tx key with the output index in byte 0.
    struct FakePrimitives;

    impl KeyPrimitives for FakePrimitives {
        fn derive(
            &self,
            tx_pub_key: &PublicKey,
            _view_secret: &[u8; 32],
        ) -> Result<KeyDerivation, CryptoError> {
            if tx_pub_key == &[0u8; 32] {
                return Err(CryptoError::SmallOrder);
            }
            Ok(KeyDerivation::from_bytes(*tx_pub_key))
        }

        fn key_image(
            &self,
            derivation: &KeyDerivation,
            output_index: u32,
            _spend_public: &PublicKey,
            _spend_secret: &[u8; 32],
        ) -> Result<KeyImage, CryptoError> {
            let mut ki = *derivation.as_bytes();
            ki[0] = output_index as u8;
            Ok(ki)
        }

        fn public_address(&self, _: &PublicKey, _: &PublicKey) -> Result<String, CryptoError> {
            Ok(String::new())
        }

        fn secret_to_public(&self, secret: &[u8; 32]) -> Result<PublicKey, CryptoError> {
            Ok(*secret)
        }
    }

    fn spend_keys() -> WalletKeys {
        WalletKeys::from_secrets(&FakePrimitives, [2u8; 32], [3u8; 32]).unwrap()
    }

    fn receiving(tx_key: u8, amount: u64) -> Transaction {
        let mut tx = Transaction::new([tx_key; 32], [tx_key; 32]);
        tx.outs.push(TxOutput::new(amount, 0, u64::from(tx_key)));
        tx.fully_checked = true;
        tx
    }

    fn spending(tx_key: u8, key_image: KeyImage) -> Transaction {
        let mut tx = Transaction::new([tx_key; 32], [tx_key; 32]);
        tx.ins.push(TxInput::unresolved(key_image));
        tx.fully_checked = true;
        tx
    }

    fn run(txs: &mut Vec<Transaction>, keys: &WalletKeys) -> ReconcileReport {
        let mut index = KeyImageIndex::rebuild(txs);
        reconcile(txs, &mut index, keys, &FakePrimitives)
    }

    #[test]
    fn resolves_input_spending_owned_output() {
        let mut owned_ki = [9u8; 32];
        owned_ki[0] = 0;
        let mut txs = vec![receiving(9, 10), spending(4, owned_ki)];
        let report = run(&mut txs, &spend_keys());
        assert_eq!(report.derived_key_images, 1);
        assert_eq!(report.resolved_inputs, 1);
        assert_eq!(txs[1].ins[0].amount, Some(10));
    }

    #[test]
    fn prunes_foreign_input_and_empty_transaction() {
        let mut txs = vec![receiving(9, 10), spending(4, [0xEE; 32])];
        let report = run(&mut txs, &spend_keys());
        assert_eq!(report.pruned_inputs, 1);
        assert_eq!(report.pruned_transactions, 1);
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn failed_derivation_is_skipped_and_retried() {
        let mut txs = vec![receiving(0, 10)];
        let report = run(&mut txs, &spend_keys());
        assert_eq!(report.derivation_failures, 1);
        assert_eq!(txs[0].outs[0].key_image, None);
        assert!(!report.changed());
    }

    #[test]
    fn view_only_wallet_leaves_ledger_untouched() {
        let keys = WalletKeys::view_only(
            [3u8; 32],
            PublicKeys {
                spend: [2u8; 32],
                view: [3u8; 32],
            },
        );
        let mut txs = vec![receiving(9, 10), spending(4, [0xEE; 32])];
        let report = run(&mut txs, &keys);
        assert!(report.skipped_view_only);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].outs[0].key_image, None);
    }

    #[test]
    fn second_pass_changes_nothing() {
        let mut owned_ki = [9u8; 32];
        owned_ki[0] = 0;
        let keys = spend_keys();
        let mut txs = vec![receiving(9, 10), spending(4, owned_ki), spending(5, [1; 32])];
        let mut index = KeyImageIndex::rebuild(&txs);
        reconcile(&mut txs, &mut index, &keys, &FakePrimitives);
        let snapshot = txs.clone();
        let report = reconcile(&mut txs, &mut index, &keys, &FakePrimitives);
        assert!(!report.changed());
        assert_eq!(txs, snapshot);
    }

    #[test]
    fn real_primitives_match_their_own_key_images() {
        let prims = MoneroPrimitives::default();
        let keys = WalletKeys::from_secrets(&prims, [7u8; 32], [5u8; 32]).unwrap();
        let tx_pub = prims.secret_to_public(&[11u8; 32]).unwrap();
        let derivation = prims.derive(&tx_pub, keys.view_secret()).unwrap();
        let expected = prims
            .key_image(&derivation, 0, &keys.public.spend, keys.spend_secret().unwrap())
            .unwrap();

        let mut receive = Transaction::new([1u8; 32], tx_pub);
        receive.outs.push(TxOutput::new(10, 0, 1));
        let mut txs = vec![receive];
        let mut index = KeyImageIndex::rebuild(&txs);
        reconcile(&mut txs, &mut index, &keys, &prims);
        assert_eq!(txs[0].outs[0].key_image, Some(expected));
        assert!(index.contains(&expected));
    }
}
