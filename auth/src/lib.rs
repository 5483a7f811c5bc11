//! # auth
//!
//! Access tokens for the Commerce Layer APIs:
//! - request tokens with any of the supported OAuth 2.0 grants
//! - decode a token and narrow its payload to one of the five token shapes
//! - create the signed assertion used by the JWT bearer grant
//! - verify a token signature against the published JSON Web Key Set
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth::jwt::{decode, verify, Claims, VerifyOptions};
//!
//! let decoded = verify(access_token, &VerifyOptions::default()).await?;
//! if let Some(Claims::SalesChannel { organization, .. }) =
//!     decoded.payload.as_ref().and_then(|payload| payload.classify())
//! {
//!     println!("organization {}", organization.slug);
//! }
//! ```

pub mod base64url;
pub mod error;
pub mod http;
pub mod jwks;
pub mod jwt;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
