//! Signature-less decoding of compact tokens.

use serde_json::Value;

use super::{DecodedJwt, Header, Payload};
use crate::base64url;
use crate::error::Error;

/// Decode a Commerce Layer access token without verifying it.
///
/// Missing or empty segments, and segments holding JSON `null`, decode to
/// `None`. A segment that is present but holds malformed base64 or malformed
/// JSON fails with a decode error. Any well-formed JSON decodes; see
/// [`Payload::from_value`] for how unexpected shapes are kept.
pub fn decode(access_token: &str) -> Result<DecodedJwt, Error> {
    let mut segments = access_token.split('.');

    let header = parse_segment(segments.next())?.map(Header::from_value);
    let payload = parse_segment(segments.next())?.map(Payload::from_value);
    let signature = segments
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string);

    Ok(DecodedJwt {
        header,
        payload,
        signature,
    })
}

fn parse_segment(segment: Option<&str>) -> Result<Option<Value>, Error> {
    match segment {
        None | Some("") => Ok(None),
        Some(segment) => {
            let json = base64url::decode(segment)?;
            let value: Value = serde_json::from_slice(&json)?;
            Ok(Some(value).filter(|value| !value.is_null()))
        }
    }
}
