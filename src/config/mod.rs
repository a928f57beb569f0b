//! Configuration management for quotesign
//!
//! Supports loading configuration from:
//! - Built-in defaults
//! - Config file (quotesign.toml, or an explicit path)
//! - Environment variables (QUOTESIGN_*)

use crate::errors::{QuoteSignError, Result};
use crate::quote::Network;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Signing defaults
    pub signing: SigningConfig,

    /// Key file locations
    pub keys: KeysConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Network used when the CLI is not given one
    pub network: String,

    /// Value forwarded as `travel_rule_compliant` on submission
    pub travel_rule_compliant: bool,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            network: "sepolia".to_string(),
            travel_rule_compliant: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Directory holding `<network>/<name>.json` key files
    pub key_dir: PathBuf,

    /// Key file name (without extension) used when no key path is given
    pub default_key: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            key_dir: PathBuf::from("./keys"),
            default_key: "alice".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with_env(config_path, None)
    }

    /// Load with an explicit environment map in place of the process environment
    fn load_with_env(
        config_path: Option<&str>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())
            .map_err(|e| QuoteSignError::ConfigError(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        // An explicit path must exist; the default location is optional
        builder = match config_path {
            Some(path) => builder.add_source(config::File::with_name(path).required(true)),
            None => builder.add_source(config::File::with_name("quotesign").required(false)),
        };

        // QUOTESIGN_SIGNING__NETWORK, QUOTESIGN_KEYS__KEY_DIR, ...
        builder = builder.add_source(
            config::Environment::with_prefix("QUOTESIGN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder
            .build()
            .map_err(|e| QuoteSignError::ConfigError(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| QuoteSignError::ConfigError(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.default_network()?;

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(QuoteSignError::ConfigError(format!(
                    "Unknown log format '{}' (expected pretty or json)",
                    other
                )))
            }
        }

        if self.keys.default_key.trim().is_empty() {
            return Err(QuoteSignError::ConfigError(
                "keys.default_key must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn default_network(&self) -> Result<Network> {
        self.signing.network.parse()
    }

    /// Default key file for a network: `<key_dir>/<network>/<default_key>.json`
    pub fn key_path(&self, network: Network) -> PathBuf {
        self.keys
            .key_dir
            .join(network.as_str())
            .join(format!("{}.json", self.keys.default_key))
    }
}
