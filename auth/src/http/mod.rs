//! HTTP client building and authorization server endpoints.

mod client;

pub use client::{ClientBuilder, HttpClientConfig};

use url::Url;

use crate::error::{Error, ErrorKind, HttpErrorKind};

/// Resolve `path` on the authorization server for `domain`.
///
/// The server lives at `https://auth.{domain}` unless `base_url` overrides it.
pub fn auth_endpoint(base_url: Option<&str>, domain: &str, path: &str) -> Result<Url, Error> {
    let base = match base_url {
        Some(base_url) => base_url.to_string(),
        None => format!("https://auth.{}", domain),
    };

    Url::parse(&base)
        .and_then(|base| base.join(path))
        .map_err(|err| Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
        })
}
