//! Trading Environment
//!
//! Single-asset simulator with a gym-like reset/step/render interface.
//! Each step fills the action at a price drawn between the day's open and
//! close, marks the account to market, advances one day, and pays a reward
//! that grows with the step index.

use std::collections::HashMap;
use std::io;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::action::{Action, ActionKind};
use super::observation::Observation;
use super::report::EpisodeReport;
use super::series::{PriceBar, PriceSeries, WINDOW_SIZE};
use super::spaces::{self, BoxSpace, RewardRange};
use super::state::{EpisodeState, Fill};
use crate::config::EnvConfig;
use crate::error::{Result, SimError};

/// Result of taking a step in the environment
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Observation after the step
    pub observation: Observation,
    /// Balance scaled by episode progress
    pub reward: f64,
    /// Net worth hit zero; advisory, further steps are still accepted
    pub done: bool,
    /// Always empty, kept for drop-in use with gym-style loops
    pub info: HashMap<String, f64>,
    /// What the action actually did
    pub fill: Fill,
}

/// Trading simulator over a fixed price series
pub struct TradingSimulator<R = StdRng> {
    series: PriceSeries,
    config: EnvConfig,
    rng: R,
    /// None until the first reset
    state: Option<EpisodeState>,
}

impl TradingSimulator<StdRng> {
    /// Create a simulator with a reproducible random source
    pub fn seeded(series: PriceSeries, config: EnvConfig, seed: u64) -> Result<Self> {
        Self::new(series, config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TradingSimulator<R> {
    /// Create a new simulator. The series length is already guaranteed by
    /// `PriceSeries`; the configuration is validated here.
    pub fn new(series: PriceSeries, config: EnvConfig, rng: R) -> Result<Self> {
        config.validate().map_err(SimError::invalid_config)?;

        Ok(Self {
            series,
            config,
            rng,
            state: None,
        })
    }

    /// Start a new episode at a random window start in `[0, N - 6]`
    pub fn reset(&mut self) -> Observation {
        let start = self.rng.gen_range(0..=self.series.last_window_start());
        self.begin_episode(start)
    }

    /// Start a new episode at a chosen window start
    pub fn reset_at(&mut self, start_step: usize) -> Result<Observation> {
        let max = self.series.last_window_start();
        if start_step > max {
            return Err(SimError::StartOutOfRange {
                start: start_step,
                max,
            });
        }
        Ok(self.begin_episode(start_step))
    }

    fn begin_episode(&mut self, start_step: usize) -> Observation {
        let state = EpisodeState::new(self.config.initial_account_balance, start_step);
        info!(
            start_step,
            balance = state.balance,
            series_len = self.series.len(),
            "Episode reset"
        );

        let observation = observe(&self.series, &state, &self.config);
        self.state = Some(state);
        observation
    }

    /// Take a step in the environment
    pub fn step(&mut self, action: Action) -> Result<StepResult> {
        action.check_finite()?;
        let state = self.state.as_mut().ok_or(SimError::NotReset)?;

        // Fill at a random price within the day
        let bar = &self.series.bars()[state.current_step];
        let price = execution_price(&mut self.rng, bar);
        let kind = action.kind();
        // A zero-fraction buy is a no-op at any price
        if kind == ActionKind::Buy && action.amount != 0.0 && price <= 0.0 {
            return Err(SimError::NonPositivePrice {
                step: state.current_step,
                price,
            });
        }

        let fill = state.apply(kind, price, action.amount);

        state.current_step += 1;
        if state.current_step > self.series.last_window_start() {
            debug!(
                series_len = self.series.len(),
                "Price window exhausted, wrapping to start of series"
            );
            state.current_step = 0;
        }

        let delay_modifier = state.current_step as f64 / self.config.max_steps as f64;
        let reward = state.balance * delay_modifier;
        let done = state.is_ruined();

        debug!(
            step = state.current_step,
            action = kind.as_str(),
            price,
            shares = fill.shares,
            balance = state.balance,
            net_worth = state.net_worth,
            reward,
            "Step"
        );
        if done {
            warn!(net_worth = state.net_worth, "Account ruined");
        }

        let observation = observe(&self.series, state, &self.config);

        Ok(StepResult {
            observation,
            reward,
            done,
            info: HashMap::new(),
            fill,
        })
    }

    /// Print the account to stdout
    pub fn render(&self) -> Result<()> {
        let report = self.report().ok_or(SimError::NotReset)?;
        info!(
            step = report.step,
            net_worth = report.net_worth,
            profit = report.profit,
            "Render"
        );
        print!("{report}");
        Ok(())
    }

    /// Write the account dump to any writer
    pub fn render_to<W: io::Write>(&self, out: &mut W) -> Result<()> {
        let report = self.report().ok_or(SimError::NotReset)?;
        write!(out, "{report}")?;
        Ok(())
    }
}

impl<R> TradingSimulator<R> {
    /// Current account snapshot, None before the first reset
    pub fn report(&self) -> Option<EpisodeReport> {
        self.state
            .as_ref()
            .map(|state| EpisodeReport::from_state(state, self.config.initial_account_balance))
    }

    pub fn action_space(&self) -> BoxSpace {
        spaces::action_space()
    }

    pub fn observation_space(&self) -> BoxSpace {
        spaces::observation_space()
    }

    /// `(0, max_account_balance)`
    pub fn reward_range(&self) -> RewardRange {
        RewardRange {
            min: 0.0,
            max: self.config.max_account_balance,
        }
    }

    pub fn state(&self) -> Option<&EpisodeState> {
        self.state.as_ref()
    }

    /// Whether `reset` has been called
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }
}

/// Uniform draw between open and close. Either order is well-formed: an
/// inverted day draws from `[close, open]`.
fn execution_price<R: Rng + ?Sized>(rng: &mut R, bar: &PriceBar) -> f64 {
    bar.open + (bar.close - bar.open) * rng.gen::<f64>()
}

fn observe(series: &PriceSeries, state: &EpisodeState, config: &EnvConfig) -> Observation {
    let start = state.current_step.min(series.last_window_start());
    Observation::build(&series.bars()[start..start + WINDOW_SIZE], state, config)
}
