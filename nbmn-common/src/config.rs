//! Configuration loading
//!
//! The TOML file is located with the following priority:
//! 1. Command-line argument (highest priority)
//! 2. `NBMN_CONFIG` environment variable
//! 3. `<user config dir>/nbmn/config.toml`
//! 4. Compiled defaults (fallback, logged as a warning)
//!
//! A few secrets may also come from the environment, which wins over the
//! file: `NBMN_OMDB_API_KEY` and `NBMN_DEBUG_EMAIL`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "NBMN_CONFIG";
/// Environment variable overriding `[omdb] api_key`
pub const OMDB_KEY_ENV_VAR: &str = "NBMN_OMDB_API_KEY";
/// Environment variable overriding `[auth] debug_email`
pub const DEBUG_EMAIL_ENV_VAR: &str = "NBMN_DEBUG_EMAIL";

/// Site configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP server port
    pub port: u16,

    /// Printed (not logged) at startup when set
    pub banner: Option<String>,

    /// Debug mode: forces debug logging and detailed error text
    pub debug: bool,

    /// Path to SQLite database file
    pub database_path: PathBuf,

    /// Wrap the store so every save is logged
    pub log_saves: bool,

    /// Static files (posters, people images, robots.txt)
    pub static_dir: PathBuf,

    /// Email addresses of users allowed to edit
    pub admins: Vec<String>,

    /// Attendees present at every movie night
    pub oligarchs: Vec<String>,

    pub logging: LoggingConfig,
    pub omdb: OmdbConfig,
    pub slack: SlackConfig,
    pub auth: AuthConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            banner: None,
            debug: false,
            database_path: PathBuf::from("nbmn.db"),
            log_saves: false,
            static_dir: PathBuf::from("static"),
            admins: Vec::new(),
            oligarchs: vec!["Adam".to_string(), "Marty".to_string()],
            logging: LoggingConfig::default(),
            omdb: OmdbConfig::default(),
            slack: SlackConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// OMDB catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub poster_url: String,
    /// Request timeout; the HTTP client default applies when unset
    pub timeout_secs: Option<u64>,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "http://www.omdbapi.com/".to_string(),
            poster_url: "http://img.omdbapi.com/".to_string(),
            timeout_secs: None,
        }
    }
}

impl OmdbConfig {
    /// Trimmed API key, or a configuration error when none was supplied
    pub fn api_key(&self) -> Result<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(Error::Config(format!(
                "No OMDB API key supplied in configuration. Set [omdb] api_key or {}",
                OMDB_KEY_ENV_VAR
            )));
        }
        Ok(key)
    }
}

/// Slack incoming-webhook settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Incoming webhook URL; notifications are skipped when blank
    pub hook: String,
    pub channel: String,
    pub username: String,
    pub icon_emoji: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            hook: String::new(),
            channel: "#general".to_string(),
            username: "Movie Night Monkey".to_string(),
            icon_emoji: ":monkey:".to_string(),
        }
    }
}

/// Identity settings
///
/// Login happens in the OAuth proxy in front of the site; the proxy passes
/// the authenticated email address along in `user_header`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub user_header: String,
    /// When set, every request is treated as this (admin) user
    pub debug_email: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_header: "x-forwarded-email".to_string(),
            debug_email: None,
        }
    }
}

impl TomlConfig {
    /// Effective log level (`debug = true` forces "debug")
    pub fn log_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.logging.level
        }
    }

    /// Apply environment overrides for secrets
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(OMDB_KEY_ENV_VAR) {
            if !key.trim().is_empty() {
                if !self.omdb.api_key.trim().is_empty() {
                    warn!(
                        "OMDB API key found in both {} and TOML. Using environment.",
                        OMDB_KEY_ENV_VAR
                    );
                }
                self.omdb.api_key = key;
            }
        }

        if let Ok(email) = std::env::var(DEBUG_EMAIL_ENV_VAR) {
            if !email.trim().is_empty() {
                self.auth.debug_email = Some(email.trim().to_string());
            }
        }
    }
}

/// Locate the config file following the documented priority order
///
/// Returns `None` when no file is named and the default location is empty.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: user config directory
    dirs::config_dir()
        .map(|d| d.join("nbmn").join("config.toml"))
        .filter(|p| p.exists())
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load configuration: file (if any) + environment overrides
///
/// A file that was explicitly named but cannot be read is an error; having
/// no file at all falls back to the compiled defaults.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let mut config = match resolve_config_path(cli_arg) {
        Some(path) => {
            let config = load_toml_config(&path)?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => {
            warn!("No configuration file found, using defaults");
            TomlConfig::default()
        }
    };

    config.apply_env_overrides();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.oligarchs, vec!["Adam", "Marty"]);
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.auth.user_header, "x-forwarded-email");
        assert!(config.omdb.api_key().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            port = 9000
            debug = true
            admins = ["someone@example.com"]

            [omdb]
            api_key = "  abc123  "
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.admins, vec!["someone@example.com"]);
        assert_eq!(config.omdb.api_key().unwrap(), "abc123");
        assert_eq!(config.omdb.base_url, "http://www.omdbapi.com/");
        assert_eq!(config.slack.username, "Movie Night Monkey");
    }
}
