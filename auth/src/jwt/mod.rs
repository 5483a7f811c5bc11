//! Decoding, classification, assertion signing and signature verification of
//! Commerce Layer access tokens.

mod assertion;
mod decode;
mod payload;
mod verify;

pub use assertion::{
    create_assertion, create_assertion_at, Assertion, AssertionClaims, ASSERTION_SIGNING_SECRET,
    CLAIMS_NAMESPACE,
};
pub use decode::decode;
pub use payload::{
    Application, ApplicationKind, ApplicationKindParseError, Claims, Header, Market,
    Organization, Owner, OwnerType, Payload, User,
};
pub use verify::{verify, Verifier, VerifyOptions, DEFAULT_DOMAIN};

/// A token split into its parts, with header and payload parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedJwt {
    pub header: Option<Header>,
    pub payload: Option<Payload>,
    /// Raw base64url signature segment, not decoded.
    pub signature: Option<String>,
}

impl DecodedJwt {
    /// Key ID from the header, if any.
    pub fn kid(&self) -> Option<&str> {
        self.header.as_ref().and_then(|header| header.kid.as_deref())
    }
}
