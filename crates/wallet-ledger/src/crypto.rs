//! Key derivation, key images and address encoding.
//!
//! The reconciliation engine only sees the [`KeyPrimitives`] trait.
//! [`MoneroPrimitives`] is the production backend: ECDH over ed25519 with
//! `curve25519-dalek`, Keccak hashing and hash-to-point from `monero-oxide`.

use curve25519_dalek::{
    constants::ED25519_BASEPOINT_TABLE, edwards::CompressedEdwardsY, traits::IsIdentity,
    EdwardsPoint, Scalar,
};
use monero_address::{AddressType, MoneroAddress, Network};
use monero_oxide::{generators::biased_hash_to_point, io::VarInt, primitives::keccak256_to_scalar};
use std::ops::Deref;
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;
use crate::model::{KeyImage, PublicKey};

/// Shared secret `8·a·R` between a transaction key and the wallet view key.
#[derive(Clone, Zeroize)]
pub struct KeyDerivation([u8; 32]);

impl KeyDerivation {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for KeyDerivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyDerivation(..)")
    }
}

impl Drop for KeyDerivation {
    fn drop(&mut self) {
        self.zeroize();
    }
}

pub trait KeyPrimitives {
    fn derive(
        &self,
        tx_pub_key: &PublicKey,
        view_secret: &[u8; 32],
    ) -> Result<KeyDerivation, CryptoError>;

    fn key_image(
        &self,
        derivation: &KeyDerivation,
        output_index: u32,
        spend_public: &PublicKey,
        spend_secret: &[u8; 32],
    ) -> Result<KeyImage, CryptoError>;

    fn public_address(
        &self,
        spend_public: &PublicKey,
        view_public: &PublicKey,
    ) -> Result<String, CryptoError>;

    fn secret_to_public(&self, secret: &[u8; 32]) -> Result<PublicKey, CryptoError>;
}

#[derive(Clone, Copy, Debug)]
pub struct MoneroPrimitives {
    network: Network,
}

impl MoneroPrimitives {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

impl Default for MoneroPrimitives {
    fn default() -> Self {
        Self::new(Network::Mainnet)
    }
}

impl KeyPrimitives for MoneroPrimitives {
    fn derive(
        &self,
        tx_pub_key: &PublicKey,
        view_secret: &[u8; 32],
    ) -> Result<KeyDerivation, CryptoError> {
        let tx_point = decompress(tx_pub_key, "transaction public key")?;
        let view_scalar = Zeroizing::new(Scalar::from_bytes_mod_order(*view_secret));
        let shared = Zeroizing::new((view_scalar.deref() * tx_point).mul_by_cofactor());
        if shared.is_identity() {
            return Err(CryptoError::SmallOrder);
        }
        Ok(KeyDerivation(shared.compress().to_bytes()))
    }

    fn key_image(
        &self,
        derivation: &KeyDerivation,
        output_index: u32,
        spend_public: &PublicKey,
        spend_secret: &[u8; 32],
    ) -> Result<KeyImage, CryptoError> {
        let spend_point = decompress(spend_public, "public spend key")?;

        let mut data = Zeroizing::new(derivation.as_bytes().to_vec());
        VarInt::write(&(output_index as usize), &mut *data)
            .map_err(|e| CryptoError::Encoding(format!("output index varint: {e}")))?;
        let shared_scalar = Zeroizing::new(keccak256_to_scalar(data.as_slice()));

        let one_time_key = (shared_scalar.deref() * ED25519_BASEPOINT_TABLE) + spend_point;
        let spend_scalar = Zeroizing::new(Scalar::from_bytes_mod_order(*spend_secret));
        let one_time_secret = Zeroizing::new(shared_scalar.deref() + spend_scalar.deref());

        let ki_point =
            one_time_secret.deref() * biased_hash_to_point(one_time_key.compress().to_bytes());
        Ok(ki_point.compress().to_bytes())
    }

    fn public_address(
        &self,
        spend_public: &PublicKey,
        view_public: &PublicKey,
    ) -> Result<String, CryptoError> {
        let spend = decompress(spend_public, "public spend key")?;
        let view = decompress(view_public, "public view key")?;
        Ok(MoneroAddress::new(self.network, AddressType::Legacy, spend, view).to_string())
    }

    fn secret_to_public(&self, secret: &[u8; 32]) -> Result<PublicKey, CryptoError> {
        let scalar = Zeroizing::new(Scalar::from_bytes_mod_order(*secret));
        Ok((scalar.deref() * ED25519_BASEPOINT_TABLE)
            .compress()
            .to_bytes())
    }
}

fn decompress(bytes: &[u8; 32], what: &'static str) -> Result<EdwardsPoint, CryptoError> {
    CompressedEdwardsY(*bytes)
        .decompress()
        .ok_or(CryptoError::InvalidPoint(what))
}
