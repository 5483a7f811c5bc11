//! JSON Web Key Sets and the sources they are resolved from.
//!
//! [`RemoteKeySet`] fetches `https://auth.{domain}/.well-known/jwks.json` on
//! every call. Wrap it in a [`CachedKeySet`] to reuse a fetched set for a
//! fixed time to live.

mod cache;
mod remote;

pub use cache::CachedKeySet;
pub use remote::{RemoteKeySet, JWKS_PATH};

use async_trait::async_trait;
use rsa::{BigUint, RsaPublicKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::base64url;
use crate::error::{crypto_error, CryptoErrorKind, Error, ErrorKind};

/// A single key of a JSON Web Key Set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kid: String,
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// RSA modulus, base64url encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent, base64url encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JsonWebKey {
    /// Import the key as an RSA public key.
    pub fn to_rsa_public_key(&self) -> Result<RsaPublicKey, Error> {
        if self.kty != "RSA" {
            return Err(crypto_error(
                CryptoErrorKind::UnsupportedAlgorithm,
                &format!("Unsupported key type: {}", self.kty),
            ));
        }

        let n = self.component(self.n.as_deref(), "n")?;
        let e = self.component(self.e.as_deref(), "e")?;

        RsaPublicKey::new(n, e).map_err(|err| Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Crypto(CryptoErrorKind::KeyImport),
        })
    }

    fn component(&self, value: Option<&str>, name: &str) -> Result<BigUint, Error> {
        let value = value.ok_or_else(|| {
            crypto_error(
                CryptoErrorKind::KeyImport,
                &format!("Key {} has no \"{}\" component", self.kid, name),
            )
        })?;
        let bytes = base64url::decode(value).map_err(|err| Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Crypto(CryptoErrorKind::KeyImport),
        })?;
        Ok(BigUint::from_bytes_be(&bytes))
    }
}

/// A JSON Web Key Set document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    pub keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
    /// Find the key with the given key ID.
    pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}

/// Resolves the key set published for a domain.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    /// Get the key set for `domain` (e.g. `commercelayer.io`).
    async fn key_set(&self, domain: &str) -> Result<JsonWebKeySet, Error>;
}

/// A fixed, in-memory key set served for every domain.
#[derive(Debug, Clone, Default)]
pub struct StaticKeySet {
    key_set: JsonWebKeySet,
}

impl StaticKeySet {
    pub fn new(key_set: JsonWebKeySet) -> Self {
        Self { key_set }
    }
}

#[async_trait]
impl KeySetSource for StaticKeySet {
    async fn key_set(&self, _domain: &str) -> Result<JsonWebKeySet, Error> {
        Ok(self.key_set.clone())
    }
}
