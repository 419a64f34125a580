//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of cached cost suggestions.
    #[serde(default = "default_cache_capacity")]
    pub suggestion_cache_capacity: u64,
    /// Time-to-live for cached cost suggestions, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub suggestion_cache_ttl_secs: u64,
    /// Relative band (percent of the derived total) inside which derived
    /// and recorded costs count as aligned.
    #[serde(default = "default_tolerance_percent")]
    pub aligned_tolerance_percent: Decimal,
    /// Absolute minimum width of the aligned band, in currency units.
    #[serde(default = "default_tolerance_floor")]
    pub aligned_tolerance_floor: Decimal,
}

fn default_cache_capacity() -> u64 {
    256
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

fn default_tolerance_percent() -> Decimal {
    Decimal::ONE
}

fn default_tolerance_floor() -> Decimal {
    Decimal::ONE
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            suggestion_cache_capacity: default_cache_capacity(),
            suggestion_cache_ttl_secs: default_cache_ttl(),
            aligned_tolerance_percent: default_tolerance_percent(),
            aligned_tolerance_floor: default_tolerance_floor(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "costline=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default.toml`,
    /// `config/{RUN_MODE}.toml`, then `COSTLINE__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("COSTLINE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
