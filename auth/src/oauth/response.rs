//! Token endpoint responses.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::Error;
use crate::jwt::{decode, DecodedJwt};

/// Successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// Token type (usually "bearer").
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
    /// Creation time, seconds since the Unix epoch.
    pub created_at: i64,
    /// Only returned by the password and authorization code grants.
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub owner_type: Option<String>,
}

impl TokenResponse {
    /// When the access token expires. `None` when the timestamps are out of range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at.checked_add(self.expires_in)?, 0)
    }

    /// Check if the access token is expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at()
            .map(|expires| expires <= Utc::now())
            .unwrap_or(false)
    }

    /// Decode the access token without verifying it.
    pub fn decode(&self) -> Result<DecodedJwt, Error> {
        decode(self.access_token.expose_secret())
    }
}

/// Error body returned by the authorization server.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorResponse {
    /// Best human readable message of the first error.
    pub fn message(&self) -> Option<String> {
        self.errors.first().and_then(|error| {
            error
                .detail
                .clone()
                .or_else(|| error.title.clone())
                .or_else(|| error.code.clone())
        })
    }
}
