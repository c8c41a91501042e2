//! Wallet key material and its export forms.

use log::warn;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::KeyPrimitives;
use crate::error::Result;
use crate::model::{decode_key, decode_optional_key, PublicKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKeys {
    pub spend: PublicKey,
    pub view: PublicKey,
}

#[derive(Clone)]
pub struct WalletKeys {
    pub public: PublicKeys,
    view_secret: Zeroizing<[u8; 32]>,
    /// Absent for view-only wallets.
    spend_secret: Option<Zeroizing<[u8; 32]>>,
}

impl WalletKeys {
    /// Rebuilds the public half from both secrets.
    pub fn from_secrets<P: KeyPrimitives>(
        primitives: &P,
        spend_secret: [u8; 32],
        view_secret: [u8; 32],
    ) -> Result<Self> {
        let public = PublicKeys {
            spend: primitives.secret_to_public(&spend_secret)?,
            view: primitives.secret_to_public(&view_secret)?,
        };
        Ok(Self {
            public,
            view_secret: Zeroizing::new(view_secret),
            spend_secret: Some(Zeroizing::new(spend_secret)),
        })
    }

    pub fn view_only(view_secret: [u8; 32], public: PublicKeys) -> Self {
        Self {
            public,
            view_secret: Zeroizing::new(view_secret),
            spend_secret: None,
        }
    }

    pub fn full(public: PublicKeys, view_secret: [u8; 32], spend_secret: Option<[u8; 32]>) -> Self {
        Self {
            public,
            view_secret: Zeroizing::new(view_secret),
            spend_secret: spend_secret.map(Zeroizing::new),
        }
    }

    pub fn is_view_only(&self) -> bool {
        self.spend_secret.is_none()
    }

    pub fn view_secret(&self) -> &[u8; 32] {
        &self.view_secret
    }

    pub fn spend_secret(&self) -> Option<&[u8; 32]> {
        self.spend_secret.as_deref()
    }

    /// `include_keys` keeps every key; otherwise only what is needed to rebuild them.
    pub fn export(&self, include_keys: bool) -> KeyExport {
        if include_keys {
            return KeyExport::Full(RawKeys {
                spend_public: hex::encode(self.public.spend),
                view_public: hex::encode(self.public.view),
                view_secret: hex::encode(&*self.view_secret),
                spend_secret: self
                    .spend_secret
                    .as_ref()
                    .map(|s| hex::encode(&**s))
                    .unwrap_or_default(),
            });
        }
        match &self.spend_secret {
            Some(spend) => KeyExport::Secrets {
                view: hex::encode(&*self.view_secret),
                spend: hex::encode(&**spend),
            },
            None => KeyExport::ViewOnly {
                view_secret: hex::encode(&*self.view_secret),
                view_public: hex::encode(self.public.view),
                spend_public: hex::encode(self.public.spend),
            },
        }
    }

    pub fn import<P: KeyPrimitives>(
        export: &KeyExport,
        include_keys: bool,
        primitives: &P,
    ) -> Result<Self> {
        match export {
            KeyExport::Full(raw) => {
                let keys = raw.to_keys()?;
                if include_keys {
                    return Ok(keys);
                }
                // Keep only what the reduced export would have carried.
                match keys.spend_secret() {
                    Some(spend) => Self::from_secrets(primitives, *spend, *keys.view_secret()),
                    None => Ok(Self::view_only(*keys.view_secret(), keys.public)),
                }
            }
            KeyExport::Secrets { view, spend } => Self::from_secrets(
                primitives,
                decode_key("spend", spend)?,
                decode_key("view", view)?,
            ),
            KeyExport::ViewOnly {
                view_secret,
                view_public,
                spend_public,
            } => Ok(Self::view_only(
                decode_key("viewSecret", view_secret)?,
                PublicKeys {
                    spend: decode_key("spendPublic", spend_public)?,
                    view: decode_key("viewPublic", view_public)?,
                },
            )),
        }
    }
}

impl std::fmt::Debug for WalletKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletKeys")
            .field("public", &self.public)
            .field("view_only", &self.is_view_only())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawKeys {
    pub spend_public: String,
    pub view_public: String,
    pub view_secret: String,
    /// Empty for view-only wallets.
    #[serde(default)]
    pub spend_secret: String,
}

impl RawKeys {
    fn to_keys(&self) -> Result<WalletKeys> {
        let public = PublicKeys {
            spend: decode_key("spendPublic", &self.spend_public)?,
            view: decode_key("viewPublic", &self.view_public)?,
        };
        let view_secret = decode_key("viewSecret", &self.view_secret)?;
        let spend_secret = match decode_optional_key("spendSecret", &self.spend_secret) {
            Ok(spend) => spend,
            Err(err) => {
                warn!("unreadable spend secret, loading as view-only: {err}");
                None
            }
        };
        Ok(WalletKeys::full(public, view_secret, spend_secret))
    }
}

/// Key section of a raw wallet; the variant tells the loader what it holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyExport {
    Full(RawKeys),
    /// Both secrets of a spend-capable wallet; public keys are recomputed.
    Secrets { view: String, spend: String },
    #[serde(rename_all = "camelCase")]
    ViewOnly {
        view_secret: String,
        view_public: String,
        spend_public: String,
    },
}
