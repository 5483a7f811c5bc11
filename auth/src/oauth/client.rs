//! Client for the authorization server's token and revocation endpoints.

use secrecy::ExposeSecret;
use serde_json::json;
use tracing::debug;

use super::response::ErrorResponse;
use super::{Credentials, Grant, TokenResponse};
use crate::error::{oauth_error, Error, ErrorKind, OAuthErrorKind};
use crate::http::auth_endpoint;
use crate::jwt::DEFAULT_DOMAIN;

pub const TOKEN_PATH: &str = "/oauth/token";
pub const REVOKE_PATH: &str = "/oauth/revoke";

/// Exchanges credentials for access tokens and revokes them.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: reqwest::Client,
    domain: String,
    base_url: Option<String>,
}

impl Client {
    /// Create a client for `https://auth.{domain}`.
    pub fn new(http_client: reqwest::Client, domain: impl Into<String>) -> Self {
        Self {
            http_client,
            domain: domain.into(),
            base_url: None,
        }
    }

    /// Client for the canonical Commerce Layer domain.
    pub fn with_default_domain(http_client: reqwest::Client) -> Self {
        Self::new(http_client, DEFAULT_DOMAIN)
    }

    /// Send requests to `base_url` instead of `https://auth.{domain}`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Request an access token with the given grant.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
        grant: &Grant,
    ) -> Result<TokenResponse, Error> {
        let url = auth_endpoint(self.base_url.as_deref(), &self.domain, TOKEN_PATH)?;

        debug!(
            "Requesting {} token for client {}",
            grant.grant_type().as_str(),
            credentials.client_id
        );

        let response = self
            .http_client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&grant.request_body(credentials))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|errors| errors.message())
                .unwrap_or_else(|| format!("Token request failed with status {}", status));
            return Err(oauth_error(OAuthErrorKind::TokenExchangeFailed, &message));
        }

        serde_json::from_str(&body).map_err(|err| Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
        })
    }

    /// Revoke an access or refresh token.
    pub async fn revoke(&self, credentials: &Credentials, token: &str) -> Result<(), Error> {
        let url = auth_endpoint(self.base_url.as_deref(), &self.domain, REVOKE_PATH)?;

        let mut body = json!({
            "client_id": credentials.client_id,
            "token": token,
        });
        if let Some(client_secret) = &credentials.client_secret {
            body["client_secret"] = client_secret.expose_secret().clone().into();
        }

        debug!("Revoking token for client {}", credentials.client_id);

        let response = self
            .http_client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|errors| errors.message())
            .unwrap_or_else(|| format!("Revocation failed with status {}", status));
        Err(oauth_error(OAuthErrorKind::RevocationFailed, &message))
    }
}
