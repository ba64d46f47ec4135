//! Configuration management for kanzanso.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "kanzanso";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "kanzanso.db";

/// Minimum accepted length of a configured signing secret.
const MIN_SECRET_LEN: usize = 32;

/// Placeholder printed instead of secrets.
const REDACTED: &str = "********";

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9.-]+(:\d+)?(/\S*)?$").expect("static URL pattern is valid")
});

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `KANZANSO_`, `__` separates sections)
/// 2. TOML config file at `~/.config/kanzanso/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// External quote source configuration.
    pub quotes: QuotesConfig,
    /// Music catalog configuration.
    pub music: MusicConfig,
    /// Demo data configuration.
    pub seed: SeedConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/kanzanso/kanzanso.db`
    pub database_path: Option<PathBuf>,
}

/// Authentication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens.
    /// When unset a random secret is generated at startup.
    pub jwt_secret: Option<String>,
    /// Token lifetime in hours.
    pub token_ttl_hours: u32,
    /// Accept `demo-token-*` bearer tokens for the demo account.
    pub demo_tokens: bool,
    /// Account id that demo tokens resolve to.
    pub demo_user_id: String,
}

/// External quote source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
    /// Try the external source before stored quotes.
    pub external_enabled: bool,
    /// Endpoint returning a single random quote.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Music catalog configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    /// OAuth client id.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// Catalog API base URL.
    pub api_url: String,
    /// Token endpoint, for both client credentials and user authorization.
    pub token_url: String,
    /// User authorization page.
    pub authorize_url: String,
    /// Where the catalog sends users back after they authorize. Usually
    /// this server's `/api/spotify/callback`. User login is off when unset.
    pub redirect_uri: Option<String>,
    /// Frontend base URL that the authorization callback forwards to.
    pub frontend_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Demo data configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed demo data into an empty database on startup.
    pub enabled: bool,
    /// Display name of the demo account.
    pub demo_name: String,
    /// Email of the demo account.
    pub demo_email: String,
    /// Password of the demo account.
    pub demo_password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: 24,
            demo_tokens: false,
            demo_user_id: "68052ca31a411b19ce4db257".to_string(),
        }
    }
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            external_enabled: true,
            api_url: "https://api.quotable.io/random".to_string(),
            timeout_secs: 5,
        }
    }
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_url: "https://api.spotify.com/v1".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            authorize_url: "https://accounts.spotify.com/authorize".to_string(),
            redirect_uri: None,
            frontend_url: "http://localhost:3000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            demo_name: "Test User".to_string(),
            demo_email: "test@example.com".to_string(),
            demo_password: "password123".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("KANZANSO_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("server.port must be greater than 0"));
        }

        if self.auth.token_ttl_hours == 0 {
            return Err(invalid("auth.token_ttl_hours must be greater than 0"));
        }

        if let Some(secret) = &self.auth.jwt_secret {
            if secret.len() < MIN_SECRET_LEN {
                return Err(invalid(format!(
                    "auth.jwt_secret must be at least {MIN_SECRET_LEN} bytes"
                )));
            }
        }

        if self.auth.demo_user_id.trim().is_empty() {
            return Err(invalid("auth.demo_user_id must not be empty"));
        }

        if self.quotes.timeout_secs == 0 || self.music.timeout_secs == 0 {
            return Err(invalid("timeouts must be greater than 0"));
        }

        for (key, url) in [
            ("quotes.api_url", &self.quotes.api_url),
            ("music.api_url", &self.music.api_url),
            ("music.token_url", &self.music.token_url),
            ("music.authorize_url", &self.music.authorize_url),
            ("music.frontend_url", &self.music.frontend_url),
        ]
        .into_iter()
        .chain(self.music.redirect_uri.as_ref().map(|uri| ("music.redirect_uri", uri)))
        {
            if !URL_PATTERN.is_match(url) {
                return Err(invalid(format!("{key} is not a valid URL: {url}")));
            }
        }

        if self.seed.demo_password.chars().count() < 6 {
            return Err(invalid(
                "seed.demo_password must be at least 6 characters",
            ));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Address the HTTP server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get the bearer token lifetime.
    #[must_use]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.auth.token_ttl_hours))
    }

    /// Get the external quote request timeout.
    #[must_use]
    pub fn quotes_timeout(&self) -> Duration {
        Duration::from_secs(self.quotes.timeout_secs)
    }

    /// Get the music catalog request timeout.
    #[must_use]
    pub fn music_timeout(&self) -> Duration {
        Duration::from_secs(self.music.timeout_secs)
    }

    /// Whether music catalog credentials are configured.
    #[must_use]
    pub fn music_enabled(&self) -> bool {
        self.music.client_id.is_some() && self.music.client_secret.is_some()
    }

    /// Whether users can authorize the music catalog from the frontend.
    #[must_use]
    pub fn music_login_enabled(&self) -> bool {
        self.music_enabled() && self.music.redirect_uri.is_some()
    }

    /// A copy with secrets masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let mask = |value: &mut Option<String>| {
            if value.is_some() {
                *value = Some(REDACTED.to_string());
            }
        };
        mask(&mut copy.auth.jwt_secret);
        mask(&mut copy.music.client_secret);
        copy.seed.demo_password = REDACTED.to_string();
        copy
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}
