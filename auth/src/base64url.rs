//! URL-safe, unpadded base64 as used by the JWS compact serialization.
//!
//! Decoding accepts both padded and unpadded input.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::{Error, ErrorKind, JwtErrorKind};

const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes (or a string) as base64url without padding.
pub fn encode(input: impl AsRef<[u8]>) -> String {
    BASE64URL.encode(input)
}

/// Decode a base64url string into raw bytes.
pub fn decode(input: &str) -> Result<Vec<u8>, Error> {
    Ok(BASE64URL.decode(input)?)
}

/// Decode a base64url string that is expected to hold UTF-8 text.
pub fn decode_to_string(input: &str) -> Result<String, Error> {
    let bytes = decode(input)?;
    String::from_utf8(bytes).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::Jwt(JwtErrorKind::Decode),
    })
}
