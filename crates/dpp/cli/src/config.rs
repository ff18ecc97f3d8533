//! Configuration for dppctl

use std::path::PathBuf;

use dpp_engine::LedgerConfig;
use serde::{Deserialize, Serialize};

/// Main CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Organization the commands act for
    #[serde(default)]
    pub organization: String,

    /// Directory holding one JSON file per record
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Engine configuration
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            organization: String::new(),
            data_dir: default_data_dir(),
            ledger: LedgerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("dpp-data")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CliConfig {
    /// Layer built-in defaults, an optional file and `DPP_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `DPP_LEDGER__INPUT_ELIGIBILITY=allow_with_audit`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CliConfig::default())?);

        // An explicitly named file must exist.
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("DPP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
