//! Command-line interface for Roster
//!
//! Provides argument parsing and subcommand handling for the Roster binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Config file looked up when `--config` isn't given
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Record-keeping service with a file-backed store and Prometheus metrics
#[derive(Parser)]
#[command(name = "roster")]
#[command(version)]
#[command(about = "Record-keeping service with a file-backed store and Prometheus metrics")]
#[command(
    long_about = "Roster accepts records over HTTP, keeps them in a single JSON snapshot file, \
    and exposes operational counters at /metrics for Prometheus to scrape."
)]
pub struct Cli {
    /// Path to configuration file (defaults to ./config.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Where configuration should come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit `--config` path; it must exist
    Explicit(PathBuf),
    /// The default path, if a file is there
    Default(PathBuf),
}

impl Cli {
    pub fn config_source(&self) -> ConfigSource {
        match &self.config {
            Some(path) => ConfigSource::Explicit(path.clone()),
            None => ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_PATH)),
        }
    }
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Roster Configuration
# ====================
#
# Every section and key is optional; the values below are the defaults.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 3000

# ─────────────────────────────────────────────────────────────────────────────
# STORAGE
# ─────────────────────────────────────────────────────────────────────────────

[storage]
# JSON file holding every record. It is rewritten in full (via a temporary
# file and an atomic rename) on each save or removal.
path = "db.json"

# What to do when the file exists but is not a valid record list:
#   - false: log a warning and carry on with an empty store
#   - true:  refuse to start, and fail requests that need to read it
strict_load = false

# ─────────────────────────────────────────────────────────────────────────────
# ASSETS
# ─────────────────────────────────────────────────────────────────────────────

[assets]
# HTML served at "/". Leave unset to use the page built into the binary.
# index_path = "views/index.html"

# Directory served for other GET paths (script.js, style.css).
# Set to "" to disable static file serving.
static_dir = "public"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
# RUST_LOG overrides this when set.
log_level = "info"

# Prometheus metrics are always available at /metrics on the server port
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_config_source() {
        let cli = Cli::parse_from(["roster"]);
        assert_eq!(
            cli.config_source(),
            ConfigSource::Default(PathBuf::from("config.toml"))
        );
        assert!(cli.command.is_none());
    }

    #[test]
    fn custom_config_path() {
        let cli = Cli::parse_from(["roster", "--config", "custom.toml"]);
        assert_eq!(
            cli.config_source(),
            ConfigSource::Explicit(PathBuf::from("custom.toml"))
        );
    }

    #[test]
    fn config_subcommand() {
        let cli = Cli::parse_from(["roster", "config"]);
        assert!(matches!(cli.command, Some(Command::Config { output: None })));
    }

    #[test]
    fn config_subcommand_with_output() {
        let cli = Cli::parse_from(["roster", "config", "-o", "my-config.toml"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config { output: Some(ref path) }) if path == "my-config.toml"
        ));
    }

    #[test]
    fn template_is_valid_toml() {
        let result: Result<toml::Value, _> = toml::from_str(generate_config_template());
        assert!(
            result.is_ok(),
            "Template should be valid TOML: {:?}",
            result.err()
        );
    }

    #[test]
    fn template_has_all_sections() {
        let template = generate_config_template();
        assert!(template.contains("[server]"));
        assert!(template.contains("[storage]"));
        assert!(template.contains("[assets]"));
        assert!(template.contains("[observability]"));
    }
}
