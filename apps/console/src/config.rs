//! # Console Configuration
//!
//! Where the database lives, how strictly order statuses are checked, and
//! the pricing table the catering quote uses.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MEHFIL_DB_PATH=./mehfil.db                                         │
//! │     MEHFIL_ORDER_TRANSITIONS=strict                                    │
//! │     MEHFIL_DELIVERY_ROUND_STEP=10                                      │
//! │     MEHFIL_LOG=debug                                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or MEHFIL_CONFIG, or                              │
//! │     ~/.config/mehfil/mehfil.toml (Linux)                               │
//! │     ~/Library/Application Support/com.cafemehfil.mehfil/mehfil.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Published catering prices, permissive order transitions            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # mehfil.toml
//! db_path = "/var/lib/mehfil/mehfil.db"
//! order_transitions = "strict"   # permissive | strict
//! log_filter = "info,mehfil=debug"
//!
//! # Only the keys named here change; the rest keep their defaults.
//! [pricing.base_price_by_size]
//! "16" = 4.75
//!
//! [pricing.delivery]
//! round_step = 10
//! ```

use std::path::PathBuf;

use directories::ProjectDirs;
use mehfil_core::{PricingConfig, TransitionPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Names the config file inside the platform config directory.
const CONFIG_FILE_NAME: &str = "mehfil.toml";

/// Names the database file inside the platform data directory.
const DB_FILE_NAME: &str = "mehfil.db";

/// Errors from loading or checking configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine a data directory; set MEHFIL_DB_PATH")]
    NoDataDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete console configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file. `None` means the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// How order status changes are checked.
    pub order_transitions: TransitionPolicy,

    /// tracing filter directive; `RUST_LOG` still wins when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,

    /// Catering pricing table.
    pub pricing: PricingConfig,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (mehfil.toml)
    /// 3. Environment variables
    ///
    /// A file named explicitly (`--config` or `MEHFIL_CONFIG`) must exist;
    /// the platform default may be absent.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses one TOML file.
    pub fn from_file(path: PathBuf) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Renders the effective configuration as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects settings that would make quotes meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        let problems = self.pricing.problems();
        if !problems.is_empty() {
            return Err(ConfigError::Invalid(problems.join("; ")));
        }

        if let Some(filter) = &self.log_filter {
            if filter.trim().is_empty() {
                return Err(ConfigError::Invalid("log_filter must not be empty".into()));
            }
        }

        Ok(())
    }

    /// Applies `MEHFIL_*` overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("MEHFIL_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.db_path = Some(PathBuf::from(path));
        }

        if let Some(policy) = lookup("MEHFIL_ORDER_TRANSITIONS") {
            match policy.parse::<TransitionPolicy>() {
                Ok(parsed) => {
                    debug!(policy = %parsed, "Overriding order transitions from environment");
                    self.order_transitions = parsed;
                }
                Err(e) => warn!(value = %policy, error = %e, "Ignoring MEHFIL_ORDER_TRANSITIONS"),
            }
        }

        if let Some(step) = lookup("MEHFIL_DELIVERY_ROUND_STEP") {
            match step.trim().parse::<f64>() {
                Ok(parsed) => {
                    debug!(round_step = parsed, "Overriding delivery round step from environment");
                    self.pricing.delivery.round_step = parsed;
                }
                Err(_) => warn!(value = %step, "Ignoring MEHFIL_DELIVERY_ROUND_STEP"),
            }
        }

        if let Some(filter) = lookup("MEHFIL_LOG") {
            self.log_filter = Some(filter);
        }
    }

    /// The database file, falling back to the platform data directory
    /// (created if missing).
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let dirs = Self::project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Read {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join(DB_FILE_NAME))
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "cafemehfil", "mehfil")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.order_transitions, TransitionPolicy::Permissive);
        assert_eq!(config.pricing, PricingConfig::default());
        assert!(config.db_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_pricing_override() {
        let config = AppConfig::from_toml(
            r#"
            order_transitions = "strict"

            [pricing.base_price_by_size]
            "16" = 4.75

            [pricing.delivery]
            round_step = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.order_transitions, TransitionPolicy::Strict);
        assert_eq!(config.pricing.base_price_by_size.oz16, 4.75);
        assert_eq!(config.pricing.base_price_by_size.oz12, 4.00);
        assert_eq!(config.pricing.delivery.round_step, 10.0);
        assert_eq!(config.pricing.ice.bag_weight_grams, 2300.0);
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = AppConfig::from_toml("db_path = \"from-file.db\"").unwrap();
        config.apply_overrides(env(&[
            ("MEHFIL_DB_PATH", "from-env.db"),
            ("MEHFIL_ORDER_TRANSITIONS", "STRICT"),
            ("MEHFIL_DELIVERY_ROUND_STEP", "2.5"),
            ("MEHFIL_LOG", "debug"),
        ]));

        assert_eq!(config.db_path, Some(PathBuf::from("from-env.db")));
        assert_eq!(config.order_transitions, TransitionPolicy::Strict);
        assert_eq!(config.pricing.delivery.round_step, 2.5);
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
        assert_eq!(config.database_path().unwrap(), PathBuf::from("from-env.db"));
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(env(&[
            ("MEHFIL_ORDER_TRANSITIONS", "lenient"),
            ("MEHFIL_DELIVERY_ROUND_STEP", "five"),
        ]));

        assert_eq!(config.order_transitions, TransitionPolicy::Permissive);
        assert_eq!(config.pricing.delivery.round_step, 5.0);
    }

    #[test]
    fn test_validation_rejects_nonsense_pricing() {
        let config = AppConfig::from_toml("[pricing.ice]\nbag_weight_grams = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = AppConfig::from_toml("[pricing.cups_addon]\nmarkup = -1").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = AppConfig::from_toml("log_filter = \"  \"").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_policy_in_file_fails() {
        let err = AppConfig::from_toml("order_transitions = \"lenient\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = AppConfig::load(Some(PathBuf::from("/nonexistent/mehfil.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.order_transitions = TransitionPolicy::Strict;
        config.db_path = Some(PathBuf::from("mehfil.db"));

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("order_transitions = \"strict\""));

        let parsed = AppConfig::from_toml(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
