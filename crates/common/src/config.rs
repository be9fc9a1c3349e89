//! Application configuration.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session/auth configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Invite code configuration.
    #[serde(default)]
    pub invites: InviteConfig,
    /// Founding admin account seeded at startup.
    #[serde(default)]
    pub bootstrap: Option<BootstrapConfig>,
    /// Outbound mail (SMTP). Invite emails are skipped when absent.
    #[serde(default)]
    pub mail: Option<MailConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this service.
    pub url: String,
    /// Allowed CORS origin (the marketing front-end). `None` allows any origin.
    #[serde(default)]
    pub cors_origin: Option<String>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Session/auth configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session lifetime in hours.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Whether the session cookie carries the `Secure` attribute.
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
        }
    }
}

/// Invite code configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InviteConfig {
    /// Invite lifetime in hours.
    #[serde(default = "default_invite_ttl_hours")]
    pub ttl_hours: i64,
    /// Interval of the background sweep that flips overdue codes to expired.
    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u64,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_invite_ttl_hours(),
            sweep_interval_minutes: default_sweep_interval_minutes(),
        }
    }
}

/// Founding account seeded at startup when no user with this email exists.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Initial password.
    pub password: String,
}

/// SMTP configuration for outbound mail.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// SMTP host.
    pub host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub password: Option<String>,
    /// From address, e.g. `Launchdesk <no-reply@example.com>`.
    pub from: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_session_ttl_hours() -> i64 {
    168
}

fn default_cookie_name() -> String {
    "launchdesk_session".to_string()
}

const fn default_invite_ttl_hours() -> i64 {
    72
}

const fn default_sweep_interval_minutes() -> u64 {
    15
}

const fn default_smtp_port() -> u16 {
    587
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `LAUNCHDESK_ENV`)
    /// 3. Environment variables with `LAUNCHDESK_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("LAUNCHDESK_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("LAUNCHDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
