pub mod config;
pub mod env;
pub mod error;
pub mod logging;
pub mod runner;

pub use config::{AppConfig, DataConfig, EnvConfig, LoggingConfig, RunnerConfig};
pub use env::{
    Action, ActionKind, Environment, EpisodeReport, EpisodeState, Observation, PriceBar,
    PriceSeries, StepResult, TradingSimulator,
};
pub use error::{Result, SimError};
pub use runner::{EpisodeRunner, EpisodeSummary, HoldPolicy, Policy, RandomPolicy, RunReport};
