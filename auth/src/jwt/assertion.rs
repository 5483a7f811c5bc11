//! Signed assertions for the JWT bearer grant.
//!
//! An assertion is a self-signed token naming the user or customer on whose
//! behalf an access token is requested. It is the first step of the
//! `urn:ietf:params:oauth:grant-type:jwt-bearer` flow.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha512;

use super::{Header, Owner};
use crate::base64url;
use crate::error::{crypto_error, CryptoErrorKind, Error, ErrorKind};

type HmacSha512 = Hmac<Sha512>;

/// Shared HMAC secret for JWT bearer assertions.
///
/// Only valid for assertions exchanged at the Commerce Layer token endpoint;
/// it is not a general purpose signing key and cannot be overridden.
pub const ASSERTION_SIGNING_SECRET: &str = "cl";

/// Claims namespace wrapping the assertion body.
pub const CLAIMS_NAMESPACE: &str = "https://commercelayer.io/claims";

/// Assertion payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    #[serde(rename = "https://commercelayer.io/claims")]
    pub claims: AssertionClaims,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// The customer or user the calls are made on behalf of.
    pub owner: Owner,
    /// Extra key/value pairs to enrich the token with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_claim: Option<Map<String, Value>>,
}

impl Assertion {
    pub fn new(owner: Owner) -> Self {
        Self {
            claims: AssertionClaims {
                owner,
                custom_claim: None,
            },
        }
    }

    pub fn with_custom_claim(mut self, custom_claim: Map<String, Value>) -> Self {
        self.claims.custom_claim = Some(custom_claim);
        self
    }
}

#[derive(Serialize)]
struct IssuedAssertion<'a> {
    #[serde(flatten)]
    assertion: &'a Assertion,
    iat: i64,
}

/// Create a signed assertion issued now.
pub fn create_assertion(assertion: &Assertion) -> Result<String, Error> {
    create_assertion_at(assertion, Utc::now())
}

/// Create a signed assertion with an explicit issue time.
pub fn create_assertion_at(
    assertion: &Assertion,
    issued_at: DateTime<Utc>,
) -> Result<String, Error> {
    let header = Header {
        alg: "HS512".to_string(),
        typ: Some("JWT".to_string()),
        kid: None,
        extra: Map::new(),
    };
    let payload = IssuedAssertion {
        assertion,
        iat: issued_at.timestamp(),
    };

    let encoded_header = base64url::encode(serde_json::to_vec(&header).map_err(signing_error)?);
    let encoded_payload = base64url::encode(serde_json::to_vec(&payload).map_err(signing_error)?);
    let signing_input = format!("{}.{}", encoded_header, encoded_payload);

    let signature = sign(&signing_input, ASSERTION_SIGNING_SECRET)?;

    Ok(format!("{}.{}", signing_input, base64url::encode(signature)))
}

fn sign(data: &str, secret: &str) -> Result<Vec<u8>, Error> {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|_| crypto_error(CryptoErrorKind::KeyImport, "Invalid HMAC key"))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn signing_error(err: serde_json::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Crypto(CryptoErrorKind::Signing),
    }
}
