use thiserror::Error;

/// Main error type for the trading simulator
#[derive(Error, Debug)]
pub enum SimError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Price data errors
    #[error("Price series too short: {len} rows, need at least {required}")]
    SeriesTooShort { len: usize, required: usize },

    #[error("Invalid price bar at row {index}: {reason}")]
    InvalidPriceBar { index: usize, reason: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Episode errors
    #[error("Environment has not been reset")]
    NotReset,

    #[error("Start step {start} out of range, last valid window starts at {max}")]
    StartOutOfRange { start: usize, max: usize },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Non-positive execution price {price} at step {step}")]
    NonPositivePrice { step: usize, price: f64 },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SimError
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Build an `InvalidConfig` from the problems reported by a `validate()` call
    pub fn invalid_config(problems: Vec<String>) -> Self {
        SimError::InvalidConfig(problems.join("; "))
    }
}
