//! Configuration loading and config file resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (wired through clap's `env` attribute in the binary)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is never fatal: the service starts on defaults and logs a warning.
//! A file that exists but cannot be read or parsed is a configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SUMS_CONFIG";

/// Default HTTP bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default request body limit (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Bootstrap configuration loaded from TOML file
///
/// Every key is optional; absent keys fall through to the compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[server]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_body_bytes: Option<usize>,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Where the TOML layer came from, reported once logging is up
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// File was found and parsed
    File(PathBuf),
    /// A path was resolved but nothing exists there
    Missing(PathBuf),
    /// No candidate path at all (no CLI flag, no env var, no platform config dir)
    None,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Merge CLI/env overrides over the TOML layer over compiled defaults
    pub fn resolve(overrides: &CliOverrides, toml_config: Option<&TomlConfig>) -> Result<Self> {
        let defaults = Self::default();
        let server = toml_config.map(|c| &c.server);
        let logging = toml_config.map(|c| &c.logging);

        let host = overrides
            .host
            .clone()
            .or_else(|| server.and_then(|s| s.host.clone()))
            .unwrap_or(defaults.host);

        let port = overrides
            .port
            .or_else(|| server.and_then(|s| s.port))
            .unwrap_or(defaults.port);

        let max_body_bytes = server
            .and_then(|s| s.max_body_bytes)
            .unwrap_or(defaults.max_body_bytes);
        if max_body_bytes == 0 {
            return Err(Error::Config("server.max_body_bytes must be greater than zero".to_string()));
        }

        let log_level = overrides
            .log_level
            .clone()
            .or_else(|| logging.and_then(|l| l.level.clone()))
            .unwrap_or(defaults.log_level)
            .to_ascii_lowercase();
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level '{}' (expected one of: {})",
                log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(Self {
            host,
            port,
            max_body_bytes,
            log_level,
        })
    }

    /// `host:port` string suitable for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolve which config file to read
///
/// 1. Command-line argument
/// 2. Environment variable
/// 3. `<platform config dir>/sums/config.toml`
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("sums").join("config.toml"))
}

/// Load the TOML layer from `path`
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    Ok(Some(config))
}

/// Resolve the config path and load it, reporting where the layer came from
pub fn load_from_sources(
    cli_arg: Option<&Path>,
    env_var_name: &str,
) -> Result<(Option<TomlConfig>, ConfigSource)> {
    let Some(path) = resolve_config_path(cli_arg, env_var_name) else {
        return Ok((None, ConfigSource::None));
    };

    match load_toml_config(&path)? {
        Some(config) => Ok((Some(config), ConfigSource::File(path))),
        None => {
            tracing::debug!(path = %path.display(), "Config file not present, using defaults");
            Ok((None, ConfigSource::Missing(path)))
        }
    }
}
