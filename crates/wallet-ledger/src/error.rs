//! Error types shared across the ledger.

use thiserror::Error;

/// Failures reported by a [`crate::crypto::KeyPrimitives`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("{0} is not a valid curve point")]
    InvalidPoint(&'static str),
    #[error("key derivation collapsed to the identity (small-order transaction key)")]
    SmallOrder,
    #[error("encoding error: {0}")]
    Encoding(String),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("malformed field `{field}`: {reason}")]
    Malformed { field: &'static str, reason: String },
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        LedgerError::Malformed {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
