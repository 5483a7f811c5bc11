//! OAuth 2.0 token requests against the Commerce Layer authorization server.
//!
//! Supports the password, client credentials, authorization code, refresh
//! token and JWT bearer grants, plus token revocation.

mod client;
mod grant;
mod response;

pub use client::{Client, REVOKE_PATH, TOKEN_PATH};
pub use grant::{Credentials, Grant, GrantType};
pub use response::TokenResponse;
