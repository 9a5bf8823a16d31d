//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority, applied by the binary)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! No file in the platform locations is not an error; an explicitly named
//! file must exist. A TOML file that does not parse is reported as
//! [`Error::Config`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Local development database used when nothing else is configured
pub const DEFAULT_DATABASE_URL: &str = "sqlite://enrollment.db?mode=rwc";

/// Environment variable holding the database connection URL (`sqlite:` only)
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Environment variable overriding the upload directory
pub const UPLOAD_DIR_ENV: &str = "ENROLL_UPLOAD_DIR";

/// Environment variable pointing at an explicit TOML file
pub const CONFIG_PATH_ENV: &str = "ENROLL_CONFIG";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
    pub session_ttl_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging section of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Fully resolved bootstrap settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub bind_address: String,
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    /// Upper bound on a request body, uploads included
    pub max_upload_bytes: usize,
    /// Idle time after which a wizard session is discarded
    pub session_ttl_secs: u64,
    pub log_level: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5080,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            upload_dir: PathBuf::from("static/uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            session_ttl_secs: 3600,
            log_level: "info".to_string(),
        }
    }
}

impl BootstrapConfig {
    /// Resolve settings from environment, TOML file and compiled defaults
    ///
    /// `config_path` is an explicit TOML path (from the command line or
    /// `ENROLL_CONFIG`); without one the platform config locations are tried.
    pub fn resolve(config_path: Option<&Path>) -> Result<Self> {
        let toml = match config_path {
            Some(path) => TomlConfig::load(path)?,
            None => match default_config_file() {
                Some(path) => TomlConfig::load(&path)?,
                None => TomlConfig::default(),
            },
        };

        Ok(Self::from_sources(toml, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed TOML file with environment lookups over the defaults
    pub fn from_sources(toml: TomlConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // Falls back to a local development database; callers should warn
        let database_url = env(DATABASE_URL_ENV)
            .or(toml.database_url)
            .unwrap_or(defaults.database_url);

        let upload_dir = env(UPLOAD_DIR_ENV)
            .map(PathBuf::from)
            .or(toml.upload_dir)
            .unwrap_or(defaults.upload_dir);

        Self {
            bind_address: toml.bind_address.unwrap_or(defaults.bind_address),
            port: toml.port.unwrap_or(defaults.port),
            database_url,
            upload_dir,
            max_upload_bytes: toml.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
            session_ttl_secs: toml.session_ttl_secs.unwrap_or(defaults.session_ttl_secs),
            log_level: toml.logging.level.unwrap_or(defaults.log_level),
        }
    }
}

/// First existing platform config file, if any
fn default_config_file() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) {
        return Some(path);
    }

    let user_config = dirs::config_dir().map(|d| d.join("enroll").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/enroll/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
