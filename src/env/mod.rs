//! Simulated Trading Environment
//!
//! A gym-like single-asset environment: agents see a scaled 6×6 window of
//! prices and account values, answer with a (type, amount) action, and get a
//! reward that favours keeping cash late into the episode.

mod action;
mod observation;
mod report;
mod series;
mod spaces;
mod state;
mod trading;

use rand::Rng;

use crate::error::Result;

pub use action::{Action, ActionKind, ACTION_TYPE_HIGH};
pub use observation::{
    Observation, ACCOUNT_ROW, CLOSE_ROW, HIGH_ROW, LOW_ROW, OBS_COLS, OBS_ROWS, OPEN_ROW,
    VOLUME_ROW,
};
pub use report::EpisodeReport;
pub use series::{PriceBar, PriceSeries, WINDOW_SIZE};
pub use spaces::{action_space, observation_space, sample_action, BoxSpace, RewardRange};
pub use state::{EpisodeState, Fill};
pub use trading::{StepResult, TradingSimulator};

/// Contract between an environment and whatever drives it.
///
/// `step` and `render` fail until `reset` has been called once; after that a
/// `done` result is advisory and stepping may continue.
#[cfg_attr(test, mockall::automock)]
pub trait Environment {
    /// Start a new episode and return the first observation
    fn reset(&mut self) -> Observation;

    /// Apply one action
    fn step(&mut self, action: Action) -> Result<StepResult>;

    /// Print the current account
    fn render(&self) -> Result<()>;

    /// Current account values, None before the first reset
    fn report(&self) -> Option<EpisodeReport>;

    fn action_space(&self) -> BoxSpace;

    fn observation_space(&self) -> BoxSpace;
}

impl<R: Rng> Environment for TradingSimulator<R> {
    fn reset(&mut self) -> Observation {
        TradingSimulator::reset(self)
    }

    fn step(&mut self, action: Action) -> Result<StepResult> {
        TradingSimulator::step(self, action)
    }

    fn render(&self) -> Result<()> {
        TradingSimulator::render(self)
    }

    fn report(&self) -> Option<EpisodeReport> {
        TradingSimulator::report(self)
    }

    fn action_space(&self) -> BoxSpace {
        TradingSimulator::action_space(self)
    }

    fn observation_space(&self) -> BoxSpace {
        TradingSimulator::observation_space(self)
    }
}
