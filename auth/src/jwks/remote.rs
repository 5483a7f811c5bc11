//! Key set fetched from the authorization server's well-known endpoint.

use async_trait::async_trait;
use tracing::debug;

use super::{JsonWebKeySet, KeySetSource};
use crate::error::{Error, ErrorKind, JwtErrorKind};
use crate::http::auth_endpoint;

/// Path of the key set document on the authorization server.
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Fetches the key set over HTTP. Nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct RemoteKeySet {
    http_client: reqwest::Client,
    base_url: Option<String>,
}

impl RemoteKeySet {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url: None,
        }
    }

    /// Fetch from `base_url` instead of `https://auth.{domain}`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[async_trait]
impl KeySetSource for RemoteKeySet {
    async fn key_set(&self, domain: &str) -> Result<JsonWebKeySet, Error> {
        let url = auth_endpoint(self.base_url.as_deref(), domain, JWKS_PATH)
            .map_err(key_resolution_error)?;

        debug!("Fetching key set from {}", url);

        let body = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(key_resolution_error)?
            .text()
            .await
            .map_err(key_resolution_error)?;

        serde_json::from_str(&body).map_err(key_resolution_error)
    }
}

fn key_resolution_error<E>(err: E) -> Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Error {
        source: Some(err.into()),
        error_kind: ErrorKind::Jwt(JwtErrorKind::KeyResolution),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(server: &mockito::Server) -> RemoteKeySet {
        RemoteKeySet::new(reqwest::Client::new()).with_base_url(server.url())
    }

    #[tokio::test]
    async fn test_fetches_key_set() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", JWKS_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "keys": [{ "kid": "key-1", "kty": "RSA", "n": "AQAB", "e": "AQAB" }] })
                    .to_string(),
            )
            .create_async()
            .await;

        let key_set = source(&server).key_set("commercelayer.io").await.unwrap();

        mock.assert_async().await;
        assert!(key_set.find("key-1").is_some());
    }

    #[tokio::test]
    async fn test_every_call_fetches_again() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", JWKS_PATH)
            .with_status(200)
            .with_body(r#"{"keys":[]}"#)
            .expect(2)
            .create_async()
            .await;

        let source = source(&server);
        source.key_set("commercelayer.io").await.unwrap();
        source.key_set("commercelayer.io").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_json_is_key_resolution_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", JWKS_PATH)
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = source(&server).key_set("commercelayer.io").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Jwt(JwtErrorKind::KeyResolution));
    }

    #[tokio::test]
    async fn test_error_status_is_key_resolution_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", JWKS_PATH)
            .with_status(503)
            .create_async()
            .await;

        let err = source(&server).key_set("commercelayer.io").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Jwt(JwtErrorKind::KeyResolution));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_key_resolution_error() {
        let source =
            RemoteKeySet::new(reqwest::Client::new()).with_base_url("http://127.0.0.1:1");
        let err = source.key_set("commercelayer.io").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Jwt(JwtErrorKind::KeyResolution));
    }
}
