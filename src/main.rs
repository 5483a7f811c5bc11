use auth::jwks::{CachedKeySet, KeySetSource, RemoteKeySet};
use auth::jwt::{self, Assertion, DecodedJwt, Owner, Verifier, VerifyOptions};
use auth::oauth::{self, Credentials, Grant};
use auth::Error;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, error, info};
use secrecy::ExposeSecret;
use service::{config::Config, logging::Logger};

#[derive(Parser)]
#[command(author, version, about = "Decode, verify and obtain Commerce Layer access tokens")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a token without verifying it and print its header and payload
    Decode { token: String },
    /// Verify a token's signature against the authorization server's key set
    Verify { token: String },
    /// Create a JWT bearer assertion for a user or customer
    Assertion {
        #[arg(long, value_enum)]
        owner_type: OwnerKind,
        #[arg(long)]
        owner_id: String,
        /// Extra claims as a JSON object
        #[arg(long)]
        custom_claim: Option<String>,
    },
    /// Request an access token with client credentials, or exchange an assertion for one
    Token {
        #[arg(long)]
        assertion: Option<String>,
    },
    /// Revoke an access or refresh token
    Revoke { token: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum OwnerKind {
    User,
    Customer,
}

#[tokio::main]
async fn main() {
    Config::load_dotenv();
    let cli = Cli::parse();

    if let Err(e) = Logger::init_logger(&cli.config) {
        eprintln!("Failed to start logger: {e}");
    }

    if let Err(e) = run(&cli.config, cli.command).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(config: &Config, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Decode { token } => print_decoded(&jwt::decode(&token)?)?,
        Command::Verify { token } => {
            let decoded = verify(config, &token).await?;
            info!("Signature is valid");
            print_decoded(&decoded)?;
        }
        Command::Assertion {
            owner_type,
            owner_id,
            custom_claim,
        } => {
            let owner = match owner_type {
                OwnerKind::User => Owner::user(owner_id),
                OwnerKind::Customer => Owner::customer(owner_id),
            };
            let mut assertion = Assertion::new(owner);
            if let Some(custom_claim) = custom_claim {
                assertion = assertion.with_custom_claim(serde_json::from_str(&custom_claim)?);
            }
            println!("{}", jwt::create_assertion(&assertion)?);
        }
        Command::Token { assertion } => {
            let grant = match assertion {
                Some(assertion) => Grant::JwtBearer { assertion },
                None => Grant::ClientCredentials,
            };
            let tokens = oauth_client(config)?
                .authenticate(&credentials(config)?, &grant)
                .await?;
            if let Some(expires_at) = tokens.expires_at() {
                info!("Access token expires at {}", expires_at);
            }
            println!("{}", tokens.access_token.expose_secret());
        }
        Command::Revoke { token } => {
            oauth_client(config)?
                .revoke(&credentials(config)?, &token)
                .await?;
            info!("Token revoked");
        }
    }

    Ok(())
}

fn http_client(config: &Config) -> Result<reqwest::Client, Error> {
    auth::http::ClientBuilder::new()
        .with_timeout(config.http_timeout())
        .build()
}

fn oauth_client(config: &Config) -> Result<oauth::Client, Error> {
    let mut client = oauth::Client::new(http_client(config)?, config.domain());
    if let Some(base_url) = config.auth_base_url() {
        client = client.with_base_url(base_url);
    }
    Ok(client)
}

fn credentials(config: &Config) -> Result<Credentials, Box<dyn std::error::Error>> {
    let client_id = config
        .client_id()
        .ok_or("a client ID is required (--client-id or CL_CLIENT_ID)")?;

    let mut credentials = Credentials::new(client_id);
    if let Some(client_secret) = config.client_secret() {
        credentials = credentials.with_client_secret(client_secret);
    }
    if let Some(scope) = config.scope() {
        credentials = credentials.with_scope(scope);
    }
    Ok(credentials)
}

async fn verify(config: &Config, token: &str) -> Result<DecodedJwt, Error> {
    let mut source = RemoteKeySet::new(http_client(config)?);
    if let Some(base_url) = config.auth_base_url() {
        source = source.with_base_url(base_url);
    }
    let options = VerifyOptions::with_domain(config.domain());

    match config.jwks_cache_ttl() {
        Some(ttl) => {
            debug!("Caching key sets for {:?}", ttl);
            verify_with(Verifier::new(CachedKeySet::new(source, ttl)), token, &options).await
        }
        None => verify_with(Verifier::new(source), token, &options).await,
    }
}

async fn verify_with<S: KeySetSource>(
    verifier: Verifier<S>,
    token: &str,
    options: &VerifyOptions,
) -> Result<DecodedJwt, Error> {
    verifier.verify(token, options).await
}

fn print_decoded(decoded: &DecodedJwt) -> Result<(), serde_json::Error> {
    if let Some(kind) = decoded.payload.as_ref().and_then(|payload| payload.kind()) {
        info!("Application kind: {}", kind);
    }
    println!("{}", serde_json::to_string_pretty(&decoded.header)?);
    println!("{}", serde_json::to_string_pretty(&decoded.payload)?);
    Ok(())
}
