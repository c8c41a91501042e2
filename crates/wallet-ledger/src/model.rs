//! Ledger entries and their raw (persisted) shapes.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

pub type KeyImage = [u8; 32];
pub type TxHash = [u8; 32];
pub type PublicKey = [u8; 32];

/// Raw amount written for an input whose spent output is not yet known.
pub const UNKNOWN_AMOUNT: i64 = -1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    /// `None` until the key image is matched against an owned output.
    pub amount: Option<u64>,
    pub key_image: KeyImage,
}

impl TxInput {
    pub fn unresolved(key_image: KeyImage) -> Self {
        Self {
            amount: None,
            key_image,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.amount.is_some()
    }

    pub fn to_raw(&self) -> Result<RawInput> {
        let amount = match self.amount {
            Some(amount) => i64::try_from(amount)
                .map_err(|_| LedgerError::malformed("amount", "input amount exceeds i64"))?,
            None => UNKNOWN_AMOUNT,
        };
        Ok(RawInput {
            amount,
            key_image: hex::encode(self.key_image),
        })
    }

    pub fn from_raw(raw: &RawInput) -> Result<Self> {
        Ok(Self {
            amount: u64::try_from(raw.amount).ok(),
            key_image: decode_key("keyImage", &raw.key_image)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    pub amount: u64,
    /// Derived lazily once the spend key is available.
    pub key_image: Option<KeyImage>,
    /// Chain-wide output index, `0` when not yet known.
    pub global_index: u64,
    /// Position of the output inside its transaction.
    pub output_idx: u32,
    /// One-time output key.
    pub pub_key: Option<PublicKey>,
}

impl TxOutput {
    pub fn new(amount: u64, output_idx: u32, global_index: u64) -> Self {
        Self {
            amount,
            key_image: None,
            global_index,
            output_idx,
            pub_key: None,
        }
    }

    pub fn to_raw(&self) -> RawOutput {
        RawOutput {
            amount: self.amount,
            key_image: self.key_image.map(hex::encode).unwrap_or_default(),
            global_index: self.global_index,
            output_idx: self.output_idx,
            pub_key: self.pub_key.map(hex::encode).unwrap_or_default(),
        }
    }

    pub fn from_raw(raw: &RawOutput) -> Result<Self> {
        Ok(Self {
            amount: raw.amount,
            key_image: decode_optional_key("keyImage", &raw.key_image)?,
            global_index: raw.global_index,
            output_idx: raw.output_idx,
            pub_key: decode_optional_key("pubKey", &raw.pub_key)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub hash: TxHash,
    /// De-duplication key for the ledger; also feeds output-ownership derivation.
    pub tx_pub_key: PublicKey,
    pub ins: Vec<TxInput>,
    pub outs: Vec<TxOutput>,
    /// Height of the including block, `0` while the transaction sits in the pool.
    pub block_height: u64,
    pub fully_checked: bool,
    pub fusion: bool,
    pub coinbase: bool,
    pub unlock_time: u64,
    pub timestamp: u64,
    pub fees: u64,
    pub payment_id: Option<String>,
}

impl Transaction {
    pub fn new(hash: TxHash, tx_pub_key: PublicKey) -> Self {
        Self {
            hash,
            tx_pub_key,
            ins: Vec::new(),
            outs: Vec::new(),
            block_height: 0,
            fully_checked: false,
            fusion: false,
            coinbase: false,
            unlock_time: 0,
            timestamp: 0,
            fees: 0,
            payment_id: None,
        }
    }

    /// Confirmed when the transaction made it into a block at or below `height`.
    pub fn is_confirmed(&self, height: u64) -> bool {
        self.block_height != 0 && self.block_height <= height
    }

    pub fn is_empty(&self) -> bool {
        self.ins.is_empty() && self.outs.is_empty()
    }

    pub fn needs_key_images(&self) -> bool {
        self.outs.iter().any(|o| o.key_image.is_none())
    }

    pub fn total_out(&self) -> i128 {
        self.outs.iter().map(|o| i128::from(o.amount)).sum()
    }

    /// Sum of resolved inputs; unresolved inputs carry no amount.
    pub fn total_in(&self) -> i128 {
        self.ins.iter().filter_map(|i| i.amount).map(i128::from).sum()
    }

    pub fn to_raw(&self) -> Result<RawTransaction> {
        Ok(RawTransaction {
            hash: hex::encode(self.hash),
            tx_pub_key: hex::encode(self.tx_pub_key),
            ins: self.ins.iter().map(TxInput::to_raw).collect::<Result<_>>()?,
            outs: self.outs.iter().map(TxOutput::to_raw).collect(),
            block_height: self.block_height,
            fully_checked: self.fully_checked,
            fusion: self.fusion,
            coinbase: self.coinbase,
            unlock_time: self.unlock_time,
            timestamp: self.timestamp,
            fees: self.fees,
            payment_id: self.payment_id.clone(),
        })
    }

    pub fn from_raw(raw: &RawTransaction) -> Result<Self> {
        Ok(Self {
            hash: decode_key("hash", &raw.hash)?,
            tx_pub_key: decode_key("txPubKey", &raw.tx_pub_key)?,
            ins: raw
                .ins
                .iter()
                .map(TxInput::from_raw)
                .collect::<Result<_>>()?,
            outs: raw
                .outs
                .iter()
                .map(TxOutput::from_raw)
                .collect::<Result<_>>()?,
            block_height: raw.block_height,
            fully_checked: raw.fully_checked,
            fusion: raw.fusion,
            coinbase: raw.coinbase,
            unlock_time: raw.unlock_time,
            timestamp: raw.timestamp,
            fees: raw.fees,
            payment_id: raw.payment_id.clone().filter(|p| !p.is_empty()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInput {
    #[serde(default = "unknown_amount")]
    pub amount: i64,
    #[serde(default)]
    pub key_image: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutput {
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub key_image: String,
    #[serde(default)]
    pub global_index: u64,
    #[serde(default)]
    pub output_idx: u32,
    #[serde(default)]
    pub pub_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub hash: String,
    pub tx_pub_key: String,
    #[serde(default)]
    pub ins: Vec<RawInput>,
    #[serde(default)]
    pub outs: Vec<RawOutput>,
    #[serde(default)]
    pub block_height: u64,
    #[serde(default)]
    pub fully_checked: bool,
    #[serde(default)]
    pub fusion: bool,
    #[serde(default)]
    pub coinbase: bool,
    #[serde(default)]
    pub unlock_time: u64,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub fees: u64,
    #[serde(default)]
    pub payment_id: Option<String>,
}

fn unknown_amount() -> i64 {
    UNKNOWN_AMOUNT
}

pub(crate) fn decode_key(field: &'static str, value: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(value.trim()).map_err(|e| LedgerError::malformed(field, e.to_string()))?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        LedgerError::malformed(field, format!("expected 32 bytes, got {}", bytes.len()))
    })
}

/// Empty strings stand for "not set" in the raw shape.
pub(crate) fn decode_optional_key(field: &'static str, value: &str) -> Result<Option<[u8; 32]>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    decode_key(field, value).map(Some)
}
