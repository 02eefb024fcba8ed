use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context as _;
use chrono_tz::Tz;

impl Config {
    /// Load a `.toml` file from disk and parse it as a [`Config`].
    pub async fn load(file: &str) -> anyhow::Result<Config> {
        async fn load_inner(file: &str) -> anyhow::Result<Config> {
            let contents = tokio::fs::read_to_string(file).await?;
            Ok(toml::from_str(&contents)?)
        }
        load_inner(file).await.with_context(|| format!("loading config={file}"))
    }
}

/// Bag of app configuration values, parsed from a TOML file with serde.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub db: DbConfig,
    pub net: NetConfig,
    pub acme: Option<AcmeConfig>,
    pub admin: AdminConfig,
    pub relay: Option<RelayConfig>,
}

/// Webapp configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AppConfig {
    /// Public facing domain, e.g. `site.com`.
    pub domain: String,
    /// Public facing URL, e.g. `https://site.com`.
    pub url: String,
    /// Local timezone, used for submission stats windows.
    pub tz: Tz,
    /// Static export of the portfolio frontend, served at `/` when set.
    pub static_dir: Option<PathBuf>,
}

/// Database configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct DbConfig {
    /// Path to sqlite3 database file.
    pub file: PathBuf,
}

/// Networking configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct NetConfig {
    /// HTTP server bind address.
    pub http_addr: SocketAddr,
    /// HTTPS server bind address, used when ACME is configured.
    pub https_addr: SocketAddr,
}

/// LetsEncrypt ACME TLS certificate configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AcmeConfig {
    /// Domain to request a cert for.
    pub domain: String,
    /// Contact email.
    pub email: String,
    /// Directory to store certs and credentials in.
    pub dir: String,
    /// Whether to use the production or staging ACME server.
    pub prod: bool,
}

/// Admin identity and session configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AdminConfig {
    /// Admin login username.
    pub username: String,
    /// Hex-encoded sha256 digest of the admin password.
    pub password_sha256: String,
    /// How long a session stays valid after login.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

impl AdminConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

fn default_session_ttl_hours() -> i64 {
    24
}

/// Submission relay webhook configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct RelayConfig {
    /// URL to POST each submission to.
    pub url: String,
    /// Timeout for the whole relay call.
    #[serde(default = "default_relay_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_relay_timeout_secs() -> u64 {
    5
}
