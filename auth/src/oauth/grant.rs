//! Grant types accepted by the token endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

/// OAuth 2.0 grant type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    Password,
    ClientCredentials,
    AuthorizationCode,
    RefreshToken,
    JwtBearer,
}

impl GrantType {
    /// Get the `grant_type` value sent to the token endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::Password => "password",
            GrantType::ClientCredentials => "client_credentials",
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::RefreshToken => "refresh_token",
            GrantType::JwtBearer => "urn:ietf:params:oauth:grant-type:jwt-bearer",
        }
    }
}

/// Application credentials shared by every grant.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    /// Required for confidential applications (integrations, webapps).
    pub client_secret: Option<SecretString>,
    /// e.g. `market:id:xYZkjABcde` or `market:code:europe`.
    pub scope: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            scope: None,
        }
    }

    pub fn with_client_secret(mut self, client_secret: SecretString) -> Self {
        self.client_secret = Some(client_secret);
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// A grant together with its grant-specific parameters.
#[derive(Debug, Clone)]
pub enum Grant {
    /// Customer login for sales channels.
    Password {
        username: String,
        password: SecretString,
    },
    ClientCredentials,
    AuthorizationCode {
        code: String,
        redirect_uri: String,
    },
    RefreshToken {
        refresh_token: SecretString,
    },
    /// Exchange a signed assertion (see [`crate::jwt::create_assertion`]).
    JwtBearer {
        assertion: String,
    },
}

impl Grant {
    pub fn grant_type(&self) -> GrantType {
        match self {
            Grant::Password { .. } => GrantType::Password,
            Grant::ClientCredentials => GrantType::ClientCredentials,
            Grant::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Grant::RefreshToken { .. } => GrantType::RefreshToken,
            Grant::JwtBearer { .. } => GrantType::JwtBearer,
        }
    }

    /// JSON body for the token request.
    pub(crate) fn request_body(&self, credentials: &Credentials) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("grant_type".into(), self.grant_type().as_str().into());
        body.insert("client_id".into(), credentials.client_id.clone().into());
        if let Some(client_secret) = &credentials.client_secret {
            body.insert(
                "client_secret".into(),
                client_secret.expose_secret().clone().into(),
            );
        }
        if let Some(scope) = &credentials.scope {
            body.insert("scope".into(), scope.clone().into());
        }

        match self {
            Grant::Password { username, password } => {
                body.insert("username".into(), username.clone().into());
                body.insert("password".into(), password.expose_secret().clone().into());
            }
            Grant::ClientCredentials => {}
            Grant::AuthorizationCode { code, redirect_uri } => {
                body.insert("code".into(), code.clone().into());
                body.insert("redirect_uri".into(), redirect_uri.clone().into());
            }
            Grant::RefreshToken { refresh_token } => {
                body.insert(
                    "refresh_token".into(),
                    refresh_token.expose_secret().clone().into(),
                );
            }
            Grant::JwtBearer { assertion } => {
                body.insert("assertion".into(), assertion.clone().into());
            }
        }

        body
    }
}
