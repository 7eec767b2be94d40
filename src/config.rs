use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub env: EnvConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Trading environment configuration
///
/// The `max_*` values are scaling bounds used to normalise observations into
/// `[0, 1]`; only `max_steps` and `initial_account_balance` take part in the
/// episode arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Divisor for balance and net worth observations
    pub max_account_balance: f64,
    /// Divisor for share count observations
    pub max_share_count: f64,
    /// Divisor for price and volume observations
    pub max_share_price: f64,
    /// Carried for compatibility with existing configs, not used by the core
    pub max_open_positions: u32,
    /// Reward shaping denominator
    pub max_steps: u64,
    /// Balance an episode starts with
    pub initial_account_balance: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            max_account_balance: 2_147_483_647.0,
            max_share_count: 2_147_483_647.0,
            max_share_price: 5_000.0,
            max_open_positions: 5,
            max_steps: 20_000,
            initial_account_balance: 10_000.0,
        }
    }
}

impl EnvConfig {
    /// Validate environment values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let bounds = [
            ("max_account_balance", self.max_account_balance),
            ("max_share_count", self.max_share_count),
            ("max_share_price", self.max_share_price),
        ];
        for (name, value) in bounds {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("{name} must be a positive finite number"));
            }
        }

        if self.max_open_positions == 0 {
            errors.push("max_open_positions must be positive".to_string());
        }

        if self.max_steps == 0 {
            errors.push("max_steps must be positive".to_string());
        }

        if !self.initial_account_balance.is_finite() || self.initial_account_balance < 0.0 {
            errors.push("initial_account_balance must be a non-negative finite number".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Episode runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Number of episodes to play
    pub episodes: usize,
    /// Step cap per episode (the environment itself never truncates)
    pub max_steps_per_episode: usize,
    /// End the episode as soon as the environment reports ruin
    pub stop_on_done: bool,
    /// Render every N steps (None = never)
    pub render_interval: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            episodes: 10,
            max_steps_per_episode: 1_000,
            stop_on_done: true,
            render_interval: None,
        }
    }
}

impl RunnerConfig {
    /// Validate runner values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.episodes == 0 {
            errors.push("episodes must be positive".to_string());
        }

        if self.max_steps_per_episode == 0 {
            errors.push("max_steps_per_episode must be positive".to_string());
        }

        if self.render_interval == Some(0) {
            errors.push("render_interval must be positive when set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// OHLCV CSV file to load the price series from
    #[serde(default)]
    pub price_csv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for the daily rolling log file (None = console only)
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load profile-specific config (e.g., config/backtest.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("TRADESIM_PROFILE").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (TRADESIM_ENV__MAX_STEPS, etc.)
            .add_source(
                Environment::with_prefix("TRADESIM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(env_errors) = self.env.validate() {
            errors.extend(env_errors.into_iter().map(|e| format!("env.{e}")));
        }

        if let Err(runner_errors) = self.runner.validate() {
            errors.extend(runner_errors.into_iter().map(|e| format!("runner.{e}")));
        }

        if let Some(path) = &self.data.price_csv {
            if path.trim().is_empty() {
                errors.push("data.price_csv must not be empty".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
