//! Configuration management for Roster
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section is optional; a config file containing nothing at all is
//! a valid configuration.

use crate::error::{AppError, AppResult};
use crate::records::LoadPolicy;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Snapshot file configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path of the JSON snapshot holding every record
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Refuse to start (and fail requests) when the snapshot is corrupt,
    /// instead of treating it as empty
    #[serde(default)]
    pub strict_load: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            strict_load: false,
        }
    }
}

impl StorageConfig {
    pub fn load_policy(&self) -> LoadPolicy {
        if self.strict_load {
            LoadPolicy::Strict
        } else {
            LoadPolicy::Lenient
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("db.json")
}

/// Entry page and static file configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsConfig {
    /// HTML file served at `/`; the built-in page is used when unset
    #[serde(default)]
    pub index_path: Option<PathBuf>,
    /// Directory served for any other GET path (scripts, styles)
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            index_path: None,
            static_dir: default_static_dir(),
        }
    }
}

fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from("public"))
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Socket address the server binds to
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `server.host` is not an IP address.
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let ip = self.server.host.parse::<IpAddr>().map_err(|e| {
            AppError::Config(format!(
                "server.host '{}' is not a valid IP address: {}",
                self.server.host, e
            ))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Validate configuration after parsing
    ///
    /// This is called automatically by `from_file()` and `from_str()`, but
    /// can also be called explicitly when constructing Config in code.
    pub fn validate(&self) -> AppResult<()> {
        self.socket_addr()?;

        let storage_path = self.storage.path.as_os_str();
        if storage_path.is_empty() {
            return Err(AppError::Config(
                "storage.path must not be empty".to_string(),
            ));
        }
        if self.storage.path.file_name().is_none()
            || storage_path.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR)
            || storage_path.to_string_lossy().ends_with('/')
        {
            return Err(AppError::Config(format!(
                "storage.path '{}' must name a file, not a directory",
                self.storage.path.display()
            )));
        }

        if let Some(index) = &self.assets.index_path
            && index.as_os_str().is_empty()
        {
            return Err(AppError::Config(
                "assets.index_path must not be empty when set".to_string(),
            ));
        }

        let level = self.observability.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(AppError::Config(format!(
                "observability.log_level '{}' is not one of {}",
                self.observability.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[storage]
path = "/var/lib/roster/db.json"
strict_load = true

[assets]
index_path = "views/index.html"
static_dir = "public"

[observability]
log_level = "debug"
"#;

    #[test]
    fn test_config_from_str_parses_successfully() {
        let config = Config::from_str(TEST_CONFIG).expect("should parse config");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.path, PathBuf::from("/var/lib/roster/db.json"));
        assert_eq!(config.storage.load_policy(), LoadPolicy::Strict);
        assert_eq!(
            config.assets.index_path,
            Some(PathBuf::from("views/index.html"))
        );
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").expect("empty config should be valid");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.path, PathBuf::from("db.json"));
        assert_eq!(config.storage.load_policy(), LoadPolicy::Lenient);
        assert!(config.assets.index_path.is_none());
        assert_eq!(config.assets.static_dir, Some(PathBuf::from("public")));
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_default_matches_empty_file() {
        let parsed = Config::from_str("").unwrap();
        let default = Config::default();
        assert_eq!(parsed.server.port, default.server.port);
        assert_eq!(parsed.storage.path, default.storage.path);
        assert_eq!(parsed.assets.static_dir, default.assets.static_dir);
        assert!(default.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::from_str(TEST_CONFIG).unwrap();
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_invalid_host_fails() {
        let result = Config::from_str("[server]\nhost = \"localhost\"\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("server.host"), "{}", err);
    }

    #[test]
    fn test_empty_storage_path_fails() {
        let err = Config::from_str("[storage]\npath = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("storage.path"), "{}", err);
    }

    #[test]
    fn test_directory_storage_path_fails() {
        let err = Config::from_str("[storage]\npath = \"data/\"\n").unwrap_err();
        assert!(err.to_string().contains("must name a file"), "{}", err);
    }

    #[test]
    fn test_invalid_log_level_fails() {
        let err = Config::from_str("[observability]\nlog_level = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("log_level"), "{}", err);
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        assert!(Config::from_str("[observability]\nlog_level = \"WARN\"\n").is_ok());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = Config::from_str("[server]\nprot = 3000\n").unwrap_err();
        assert!(matches!(err, AppError::ConfigParseFailed { .. }), "{:?}", err);
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let err = Config::from_file("/definitely/not/here/roster.toml").unwrap_err();
        assert!(matches!(err, AppError::ConfigFileRead { .. }), "{:?}", err);
    }
}
