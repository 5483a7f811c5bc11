use auth::jwt::DEFAULT_DOMAIN;
use clap::builder::TypedValueParser as _;
use clap::Args;
use dotenvy::dotenv;
use log::LevelFilter;
use secrecy::SecretString;
use std::time::Duration;

#[derive(Clone, Debug, Args)]
pub struct Config {
    /// The Commerce Layer domain. The authorization server is `auth.{domain}`.
    #[arg(long, env = "CL_DOMAIN", default_value = DEFAULT_DOMAIN)]
    domain: String,

    /// Override the authorization server base URL (e.g. a local mock server).
    #[arg(long, env = "CL_AUTH_BASE_URL")]
    auth_base_url: Option<String>,

    /// The application's client ID.
    #[arg(long, env = "CL_CLIENT_ID")]
    client_id: Option<String>,

    /// The application's client secret (integrations and webapps only).
    #[arg(long, env = "CL_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Scope to request, e.g. `market:code:europe`.
    #[arg(long, env = "CL_SCOPE")]
    scope: Option<String>,

    /// Timeout in seconds for requests to the authorization server
    #[arg(long, env = "CL_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Cache fetched key sets for this many seconds. Key sets are fetched on
    /// every verification when unset.
    #[arg(long, env = "CL_JWKS_CACHE_TTL_SECS")]
    pub jwks_cache_ttl_secs: Option<u64>,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env = "CL_LOG_LEVEL_FILTER",
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Config {
    /// Loads the `.env` file, if any, so its values are visible to argument parsing.
    pub fn load_dotenv() {
        dotenv().ok();
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn auth_base_url(&self) -> Option<&str> {
        self.auth_base_url.as_deref()
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn client_secret(&self) -> Option<SecretString> {
        self.client_secret.clone().map(SecretString::new)
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Returns the key set cache time to live, if caching is enabled.
    pub fn jwks_cache_ttl(&self) -> Option<Duration> {
        self.jwks_cache_ttl_secs.map(Duration::from_secs)
    }
}
