use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletOptions {
    /// Whether coinbase transactions go through full validation before being counted.
    #[serde(default)]
    pub check_miner_tx: bool,
    /// Throughput hint for the block reader feeding this wallet; not used by the ledger.
    #[serde(default = "default_read_speed")]
    pub read_speed: u32,
}

impl Default for WalletOptions {
    fn default() -> Self {
        Self {
            check_miner_tx: false,
            read_speed: default_read_speed(),
        }
    }
}

fn default_read_speed() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let options: WalletOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, WalletOptions::default());
        assert_eq!(options.read_speed, 10);
        assert!(!options.check_miner_tx);
    }

    #[test]
    fn partial_object_keeps_given_fields() {
        let options: WalletOptions = serde_json::from_str(r#"{"checkMinerTx": true}"#).unwrap();
        assert!(options.check_miner_tx);
        assert_eq!(options.read_speed, 10);
    }
}
