//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$GMAIL_ATTACHMENT_DL_CONFIG` (environment variable)
//! 2. `~/.config/gmail-attachment-dl/config.toml` (Linux/macOS)
//!    `%APPDATA%\gmail-attachment-dl\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! Command-line flags override anything set here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::credentials::DEFAULT_KEYRING_SERVICE;
use crate::session::imap::{DEFAULT_HOST, DEFAULT_PORT};

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "GMAIL_ATTACHMENT_DL_CONFIG";

const APP_DIR: &str = "gmail-attachment-dl";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// IMAP server.
    pub server: ServerConfig,
    /// Password storage.
    pub credentials: CredentialsConfig,
    /// Download defaults.
    pub download: DownloadConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override the directory used for the log file.
    pub cache_dir: Option<PathBuf>,
}

/// IMAP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Hostname (also used for TLS certificate verification).
    pub host: String,
    /// Port for implicit-TLS IMAP.
    pub port: u16,
}

/// Password storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Read and store the password in the system keyring.
    pub use_keyring: bool,
    /// Keyring service name.
    pub keyring_service: String,
}

/// Download defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Mailbox searched when `--inbox` is not given.
    pub default_inbox: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            cache_dir: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            use_keyring: true,
            keyring_service: DEFAULT_KEYRING_SERVICE.to_string(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            default_inbox: "Inbox".to_string(),
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Why the config file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load configuration, searching standard locations.
///
/// A missing file yields the defaults. A file that exists but cannot be read
/// or parsed is an error; the caller decides whether to fall back to
/// [`Config::default`] once logging is up.
pub fn load_config() -> Result<Config, ConfigError> {
    match config_file_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

/// Load configuration from `path`, or the defaults when it does not exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Log level for a given `-v` count: the configured level when zero,
    /// then info, debug and trace.
    pub fn effective_log_level(&self, verbose: u8) -> &str {
        match verbose {
            0 => self.general.log_level.as_str(),
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Return the directory for the log file.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Return the log file name inside [`cache_dir`].
pub fn log_file_name() -> &'static str {
    "gmail-attachment-dl.log"
}
