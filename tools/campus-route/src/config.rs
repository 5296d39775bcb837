//! TOML configuration
//!
//! Every field has a default, so an empty file (or no file) is a valid config:
//!
//! ```toml
//! dataset = "data/campus.json"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 3000
//!
//! [limits]
//! max_vertices = 10000
//! max_edges = 100000
//!
//! [logging]
//! filter = "info"
//! json = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::graph::GraphLimits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset file; the bundled campus dataset when unset
    pub dataset: Option<PathBuf>,
    pub server: ServerConfig,
    pub limits: GraphLimits,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("Failed to parse config")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.limits, GraphLimits::default());
        assert!(config.dataset.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_toml_str(
            r#"
            dataset = "/srv/campus.json"

            [server]
            port = 8080

            [limits]
            max_vertices = 64

            [logging]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.dataset, Some(PathBuf::from("/srv/campus.json")));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.limits.max_vertices, 64);
        assert_eq!(config.limits.max_edges, 100_000);
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(Config::from_toml_str("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind = \"127.0.0.1\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1");

        let missing = Config::load("/nonexistent/campus-route.toml");
        assert!(missing.is_err());
        assert!(Config::load_or_default(None).is_ok());
    }
}
