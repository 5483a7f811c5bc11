//! Header and claim types carried by Commerce Layer access tokens.
//!
//! Any well-formed JSON decodes into these types. Every field is optional,
//! and a value whose shape does not match its field is left out of the typed
//! view and kept in the owner's `extra` map together with unknown fields.
//! Narrowing to one of the five token shapes is done by [`Payload::classify`],
//! which matches on `application.kind`.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// JSON object fields not yet claimed by a typed field.
struct Fields(Map<String, Value>);

impl Fields {
    /// Anything but an object has no fields.
    fn new(value: Value) -> Self {
        match value {
            Value::Object(object) => Fields(object),
            _ => Fields(Map::new()),
        }
    }

    /// Remove `key` as a `T`. Nulls count as absent; a value that is not a
    /// `T` stays behind.
    fn take<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.0.remove(key)?;
        if value.is_null() {
            return None;
        }
        match T::deserialize(&value) {
            Ok(typed) => Some(typed),
            Err(_) => {
                self.0.insert(key.to_string(), value);
                None
            }
        }
    }

    fn into_extra(self) -> Map<String, Value> {
        self.0
    }
}

/// JOSE header of a compact token.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Header {
    /// Signing algorithm (e.g. `HS512`, `RS512`). Empty when absent.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alg: String,
    /// Token type, usually `JWT`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Key ID, present on tokens verified against the published key set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Header {
    /// Build a header from any JSON value.
    pub fn from_value(value: Value) -> Self {
        let mut fields = Fields::new(value);
        Header {
            alg: fields.take("alg").unwrap_or_default(),
            typ: fields.take("typ"),
            kid: fields.take("kid"),
            extra: fields.into_extra(),
        }
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Header::from_value)
    }
}

/// The credential type a token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKind {
    /// Provisioning API user.
    User,
    Dashboard,
    Integration,
    SalesChannel,
    #[serde(rename = "webapp")]
    WebApp,
}

impl ApplicationKind {
    /// Get the wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationKind::User => "user",
            ApplicationKind::Dashboard => "dashboard",
            ApplicationKind::Integration => "integration",
            ApplicationKind::SalesChannel => "sales_channel",
            ApplicationKind::WebApp => "webapp",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ApplicationKindParseError;

impl FromStr for ApplicationKind {
    type Err = ApplicationKindParseError;

    fn from_str(kind: &str) -> Result<ApplicationKind, Self::Err> {
        match kind {
            "user" => Ok(ApplicationKind::User),
            "dashboard" => Ok(ApplicationKind::Dashboard),
            "integration" => Ok(ApplicationKind::Integration),
            "sales_channel" => Ok(ApplicationKind::SalesChannel),
            "webapp" => Ok(ApplicationKind::WebApp),
            _ => Err(ApplicationKindParseError),
        }
    }
}

impl fmt::Display for ApplicationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The application the token was issued to.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Application {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Raw discriminant; unknown values are kept as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Application {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Application::from_value)
    }
}

impl Application {
    fn from_value(value: Value) -> Self {
        let mut fields = Fields::new(value);
        Application {
            id: fields.take("id"),
            kind: fields.take("kind"),
            public: fields.take("public"),
            extra: fields.into_extra(),
        }
    }

    /// The recognised application kind, if any.
    pub fn application_kind(&self) -> Option<ApplicationKind> {
        self.kind.as_deref().and_then(|kind| kind.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

/// The organization an organization-scoped token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub slug: String,
    pub enterprise: bool,
    pub region: String,
}

/// Market scope, present when the token was requested with a `market:` scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    #[serde(default)]
    pub id: Vec<String>,
    #[serde(default)]
    pub price_list_id: Option<String>,
    #[serde(default)]
    pub stock_location_ids: Vec<String>,
    #[serde(default)]
    pub geocoder_id: Option<String>,
    #[serde(default)]
    pub allows_external_prices: bool,
}

/// Resource type of a token owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerType {
    User,
    Customer,
}

/// The user or customer a token acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "type")]
    pub owner_type: OwnerType,
    pub id: String,
}

impl Owner {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            owner_type: OwnerType::User,
            id: id.into(),
        }
    }

    pub fn customer(id: impl Into<String>) -> Self {
        Self {
            owner_type: OwnerType::Customer,
            id: id.into(),
        }
    }
}

/// Decoded claims of an access token.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Payload {
    pub application: Application,
    /// Scope used to restrict access to a market and/or stock location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Expiration time, seconds since the Unix epoch. Informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// True for test mode, false for live mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<bool>,
    /// A randomly generated number, less than one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rand: Option<f64>,
    /// Issued at, seconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Who created and signed this token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<Market>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_claim: Option<Map<String, Value>>,
    /// Unknown claims, and known claims whose value has an unexpected shape.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Payload::from_value)
    }
}

/// A payload narrowed to its concrete token shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Claims<'a> {
    /// Provisioning API token.
    User { user: &'a User },
    Dashboard { user: &'a User },
    Integration {
        organization: &'a Organization,
        market: Option<&'a Market>,
    },
    SalesChannel {
        organization: &'a Organization,
        market: Option<&'a Market>,
        owner: Option<&'a Owner>,
    },
    WebApp {
        organization: &'a Organization,
        market: Option<&'a Market>,
        owner: &'a Owner,
    },
}

impl Claims<'_> {
    pub fn kind(&self) -> ApplicationKind {
        match self {
            Claims::User { .. } => ApplicationKind::User,
            Claims::Dashboard { .. } => ApplicationKind::Dashboard,
            Claims::Integration { .. } => ApplicationKind::Integration,
            Claims::SalesChannel { .. } => ApplicationKind::SalesChannel,
            Claims::WebApp { .. } => ApplicationKind::WebApp,
        }
    }
}

impl Payload {
    /// Build a payload from any JSON value. A value that is not an object
    /// gives an empty payload.
    pub fn from_value(value: Value) -> Self {
        let mut fields = Fields::new(value);
        Payload {
            application: fields
                .take::<Map<String, Value>>("application")
                .map(|object| Application::from_value(Value::Object(object)))
                .unwrap_or_default(),
            scope: fields.take("scope"),
            exp: fields.take("exp"),
            test: fields.take("test"),
            rand: fields.take("rand"),
            iat: fields.take("iat"),
            iss: fields.take("iss"),
            user: fields.take("user"),
            organization: fields.take("organization"),
            market: fields.take("market"),
            owner: fields.take("owner"),
            custom_claim: fields.take("custom_claim"),
            extra: fields.into_extra(),
        }
    }

    /// The recognised application kind, if any.
    pub fn kind(&self) -> Option<ApplicationKind> {
        self.application.application_kind()
    }

    /// Narrow the payload to its token shape.
    ///
    /// Returns `None` when the kind is absent or unknown, or when a field the
    /// shape requires (`user`, `organization`, the web app `owner`) is missing.
    pub fn classify(&self) -> Option<Claims<'_>> {
        let market = self.market.as_ref();
        match self.kind()? {
            ApplicationKind::User => Some(Claims::User {
                user: self.user.as_ref()?,
            }),
            ApplicationKind::Dashboard => Some(Claims::Dashboard {
                user: self.user.as_ref()?,
            }),
            ApplicationKind::Integration => Some(Claims::Integration {
                organization: self.organization.as_ref()?,
                market,
            }),
            ApplicationKind::SalesChannel => Some(Claims::SalesChannel {
                organization: self.organization.as_ref()?,
                market,
                owner: self.owner.as_ref(),
            }),
            ApplicationKind::WebApp => Some(Claims::WebApp {
                organization: self.organization.as_ref()?,
                market,
                owner: self.owner.as_ref()?,
            }),
        }
    }

    pub fn is_user(&self) -> bool {
        self.kind() == Some(ApplicationKind::User)
    }

    pub fn is_dashboard(&self) -> bool {
        self.kind() == Some(ApplicationKind::Dashboard)
    }

    pub fn is_integration(&self) -> bool {
        self.kind() == Some(ApplicationKind::Integration)
    }

    pub fn is_sales_channel(&self) -> bool {
        self.kind() == Some(ApplicationKind::SalesChannel)
    }

    pub fn is_web_app(&self) -> bool {
        self.kind() == Some(ApplicationKind::WebApp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn organization() -> Value {
        json!({ "id": "org_1", "slug": "demo-store", "enterprise": false, "region": "eu-west-1" })
    }

    fn payload_for(kind: &str) -> Payload {
        let mut value = json!({
            "application": { "id": "app_1", "kind": kind, "public": true },
            "scope": "market:all",
            "exp": 1_700_003_600,
            "test": true,
            "rand": 0.42,
            "iat": 1_700_000_000,
            "iss": "https://commercelayer.io",
        });
        match kind {
            "user" | "dashboard" => value["user"] = json!({ "id": "usr_1" }),
            "webapp" => {
                value["organization"] = organization();
                value["owner"] = json!({ "type": "User", "id": "usr_1" });
            }
            _ => value["organization"] = organization(),
        }
        serde_json::from_value(value).unwrap()
    }

    fn predicates(payload: &Payload) -> [bool; 5] {
        [
            payload.is_user(),
            payload.is_dashboard(),
            payload.is_integration(),
            payload.is_sales_channel(),
            payload.is_web_app(),
        ]
    }

    #[test]
    fn test_exactly_one_predicate_per_kind() {
        let kinds = ["user", "dashboard", "integration", "sales_channel", "webapp"];
        for (index, kind) in kinds.iter().enumerate() {
            let payload = payload_for(kind);
            let flags = predicates(&payload);
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "kind {kind}");
            assert!(flags[index], "kind {kind}");
            assert_eq!(payload.classify().unwrap().kind().as_str(), *kind);
        }
    }

    #[test]
    fn test_unknown_kind_matches_nothing() {
        let payload: Payload =
            serde_json::from_value(json!({ "application": { "kind": "robot" } })).unwrap();
        assert_eq!(predicates(&payload), [false; 5]);
        assert!(payload.classify().is_none());
        assert_eq!(payload.application.kind.as_deref(), Some("robot"));
    }

    #[test]
    fn test_web_app_requires_owner() {
        let mut payload = payload_for("webapp");
        payload.owner = None;
        assert!(payload.is_web_app());
        assert!(payload.classify().is_none());
    }

    #[test]
    fn test_sales_channel_owner_is_optional() {
        let mut payload = payload_for("sales_channel");
        assert!(matches!(
            payload.classify(),
            Some(Claims::SalesChannel { owner: None, .. })
        ));

        payload.owner = Some(Owner::customer("cust_1"));
        match payload.classify() {
            Some(Claims::SalesChannel {
                owner: Some(owner),
                organization,
                ..
            }) => {
                assert_eq!(owner.owner_type, OwnerType::Customer);
                assert_eq!(organization.slug, "demo-store");
            }
            other => panic!("unexpected claims: {:?}", other),
        }
    }

    #[test]
    fn test_market_and_custom_claim_are_parsed() {
        let payload: Payload = serde_json::from_value(json!({
            "application": { "kind": "integration" },
            "organization": organization(),
            "market": {
                "id": ["mkt_1"],
                "price_list_id": "pl_1",
                "stock_location_ids": ["sl_1", "sl_2"],
                "geocoder_id": null,
                "allows_external_prices": true
            },
            "custom_claim": { "tier": "gold" },
            "unknown": 1
        }))
        .unwrap();

        let market = payload.market.as_ref().unwrap();
        assert_eq!(market.stock_location_ids.len(), 2);
        assert!(market.allows_external_prices);
        assert_eq!(market.geocoder_id, None);
        assert_eq!(payload.custom_claim.as_ref().unwrap()["tier"], "gold");
        assert_eq!(payload.extra["unknown"], 1);
    }

    #[test]
    fn test_owner_serializes_with_type_first() {
        let owner = Owner::customer("cust_1");
        assert_eq!(
            serde_json::to_string(&owner).unwrap(),
            r#"{"type":"Customer","id":"cust_1"}"#
        );
    }

    #[test]
    fn test_application_kind_wire_names() {
        assert_eq!(
            serde_json::to_value(ApplicationKind::WebApp).unwrap(),
            json!("webapp")
        );
        assert_eq!(
            serde_json::to_value(ApplicationKind::SalesChannel).unwrap(),
            json!("sales_channel")
        );
        assert_eq!("webapp".parse(), Ok(ApplicationKind::WebApp));
        assert!("web_app".parse::<ApplicationKind>().is_err());
    }

    #[test]
    fn test_mismatched_claim_serializes_once() {
        let payload = Payload::from_value(json!({ "exp": "tomorrow", "iat": 10 }));
        assert_eq!(payload.exp, None);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "application": {}, "exp": "tomorrow", "iat": 10 })
        );
    }

    #[test]
    fn test_null_claims_are_absent() {
        let payload = Payload::from_value(json!({ "owner": null, "market": null }));
        assert!(payload.owner.is_none());
        assert!(payload.market.is_none());
        assert!(payload.extra.is_empty());
    }
}
