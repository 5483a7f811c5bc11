//! RS512 signature verification against the published key set.

use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier as _;
use sha2::Sha512;

use super::{decode, DecodedJwt};
use crate::base64url;
use crate::error::{jwt_error, Error, JwtErrorKind};
use crate::jwks::{KeySetSource, RemoteKeySet};

/// Commerce Layer's canonical domain.
pub const DEFAULT_DOMAIN: &str = "commercelayer.io";

#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// The Commerce Layer domain hosting the key set. Defaults to [`DEFAULT_DOMAIN`].
    pub domain: Option<String>,
}

impl VerifyOptions {
    pub fn with_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
        }
    }

    pub fn domain(&self) -> &str {
        self.domain.as_deref().unwrap_or(DEFAULT_DOMAIN)
    }
}

/// Verifies access tokens with keys resolved through a [`KeySetSource`].
///
/// Verification runs decode, key resolution and signature check in order and
/// stops at the first failure:
/// - a header without `kid`, or a `kid` missing from the key set, is `InvalidKeyId`
/// - a key set that cannot be fetched is `KeyResolution`
/// - a signature that does not match is `InvalidSignature`
pub struct Verifier<S: KeySetSource> {
    source: S,
}

impl Verifier<RemoteKeySet> {
    /// Verifier fetching the key set over HTTP on every call.
    pub fn remote(http_client: reqwest::Client) -> Self {
        Self::new(RemoteKeySet::new(http_client))
    }
}

impl<S: KeySetSource> Verifier<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Verify a token and return it decoded.
    pub async fn verify(
        &self,
        access_token: &str,
        options: &VerifyOptions,
    ) -> Result<DecodedJwt, Error> {
        let decoded = decode(access_token)?;

        let kid = decoded
            .kid()
            .ok_or_else(|| jwt_error(JwtErrorKind::InvalidKeyId, "Missing token \"kid\""))?;

        let key_set = self.source.key_set(options.domain()).await?;
        let json_web_key = key_set
            .find(kid)
            .ok_or_else(|| jwt_error(JwtErrorKind::InvalidKeyId, "Invalid token \"kid\""))?;

        let verifying_key = VerifyingKey::<Sha512>::new(json_web_key.to_rsa_public_key()?);

        let raw_signature = base64url::decode(decoded.signature.as_deref().unwrap_or_default())?;
        let signature = Signature::try_from(raw_signature.as_slice())
            .map_err(|_| jwt_error(JwtErrorKind::InvalidSignature, "Invalid signature"))?;

        verifying_key
            .verify(signing_input(access_token).as_bytes(), &signature)
            .map_err(|_| jwt_error(JwtErrorKind::InvalidSignature, "Invalid signature"))?;

        Ok(decoded)
    }
}

/// Verify a token against the key set published for `options.domain`.
///
/// Builds a fresh HTTP client and fetches the key set on every call.
pub async fn verify(access_token: &str, options: &VerifyOptions) -> Result<DecodedJwt, Error> {
    let http_client = crate::http::ClientBuilder::new().build()?;
    Verifier::remote(http_client)
        .verify(access_token, options)
        .await
}

/// The first two segments of the token, exactly as received.
fn signing_input(access_token: &str) -> &str {
    match access_token.match_indices('.').nth(1) {
        Some((index, _)) => &access_token[..index],
        None => access_token,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, OnceLock};

    use async_trait::async_trait;
    use rsa::pkcs1v15::SigningKey;
    use rsa::signature::{SignatureEncoding, Signer};
    use rsa::traits::PublicKeyParts;
    use rsa::RsaPrivateKey;
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::jwks::{JsonWebKey, JsonWebKeySet, StaticKeySet};

    fn private_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap())
    }

    fn other_private_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap())
    }

    fn json_web_key(kid: &str, key: &RsaPrivateKey) -> JsonWebKey {
        serde_json::from_value(json!({
            "kid": kid,
            "kty": "RSA",
            "alg": "RS512",
            "use": "sig",
            "n": base64url::encode(key.n().to_bytes_be()),
            "e": base64url::encode(key.e().to_bytes_be()),
        }))
        .unwrap()
    }

    fn signed_token(header: serde_json::Value, key: &RsaPrivateKey) -> String {
        let payload = json!({
            "application": { "id": "app_1", "kind": "sales_channel", "public": true },
            "organization": { "id": "org_1", "slug": "demo-store", "enterprise": false, "region": "eu-west-1" },
            "scope": "market:all",
            "exp": 1_700_003_600,
            "iat": 1_700_000_000,
        });
        let signing_input = format!(
            "{}.{}",
            base64url::encode(header.to_string()),
            base64url::encode(payload.to_string())
        );
        let signature = SigningKey::<Sha512>::new(key.clone()).sign(signing_input.as_bytes());
        format!("{}.{}", signing_input, base64url::encode(signature.to_bytes()))
    }

    struct CountingSource {
        inner: StaticKeySet,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl KeySetSource for CountingSource {
        async fn key_set(&self, domain: &str) -> Result<JsonWebKeySet, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.key_set(domain).await
        }
    }

    fn verifier(keys: Vec<JsonWebKey>) -> (Verifier<CountingSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: StaticKeySet::new(JsonWebKeySet { keys }),
            calls: Arc::clone(&calls),
        };
        (Verifier::new(source), calls)
    }

    #[tokio::test]
    async fn test_valid_signature_returns_decoded_token() {
        let token = signed_token(json!({ "alg": "RS512", "kid": "key-1" }), private_key());
        let (verifier, calls) = verifier(vec![json_web_key("key-1", private_key())]);

        let decoded = verifier
            .verify(&token, &VerifyOptions::default())
            .await
            .unwrap();

        assert_eq!(decoded.kid(), Some("key-1"));
        assert!(decoded.payload.unwrap().is_sales_channel());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wrong_key_is_invalid_signature() {
        let token = signed_token(json!({ "alg": "RS512", "kid": "key-1" }), other_private_key());
        let (verifier, _) = verifier(vec![json_web_key("key-1", private_key())]);

        let err = verifier
            .verify(&token, &VerifyOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Jwt(JwtErrorKind::InvalidSignature));
    }

    #[tokio::test]
    async fn test_tampered_payload_is_invalid_signature() {
        let token = signed_token(json!({ "alg": "RS512", "kid": "key-1" }), private_key());
        let mut segments: Vec<String> = token.split('.').map(str::to_string).collect();
        segments[1] = base64url::encode(r#"{"application":{"kind":"webapp"}}"#);
        let (verifier, _) = verifier(vec![json_web_key("key-1", private_key())]);

        let err = verifier
            .verify(&segments.join("."), &VerifyOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Jwt(JwtErrorKind::InvalidSignature));
    }

    #[tokio::test]
    async fn test_unknown_kid_is_invalid_key_id() {
        let token = signed_token(json!({ "alg": "RS512", "kid": "key-2" }), private_key());
        let (verifier, calls) = verifier(vec![json_web_key("key-1", private_key())]);

        let err = verifier
            .verify(&token, &VerifyOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Jwt(JwtErrorKind::InvalidKeyId));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_kid_skips_key_resolution() {
        let token = signed_token(json!({ "alg": "RS512" }), private_key());
        let (verifier, calls) = verifier(vec![json_web_key("key-1", private_key())]);

        let err = verifier
            .verify(&token, &VerifyOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Jwt(JwtErrorKind::InvalidKeyId));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_signature_is_invalid_signature() {
        let token = signed_token(json!({ "alg": "RS512", "kid": "key-1" }), private_key());
        let unsigned = signing_input(&token).to_string();
        let (verifier, _) = verifier(vec![json_web_key("key-1", private_key())]);

        let err = verifier
            .verify(&unsigned, &VerifyOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Jwt(JwtErrorKind::InvalidSignature));
    }

    #[test]
    fn test_signing_input_is_first_two_segments() {
        assert_eq!(signing_input("aaa.bbb.ccc"), "aaa.bbb");
        assert_eq!(signing_input("aaa.bbb"), "aaa.bbb");
        assert_eq!(signing_input("aaa"), "aaa");
    }

    #[test]
    fn test_options_default_domain() {
        assert_eq!(VerifyOptions::default().domain(), "commercelayer.io");
        assert_eq!(
            VerifyOptions::with_domain("commercelayer.co").domain(),
            "commercelayer.co"
        );
    }
}
