//! Observation construction
//!
//! Five price rows (open, high, low, close, volume) over the window, followed
//! by one row of account scalars, each divided by its configured maximum.

use serde::{Deserialize, Serialize};

use super::series::{PriceBar, WINDOW_SIZE};
use super::state::EpisodeState;
use crate::config::EnvConfig;

/// Rows in an observation
pub const OBS_ROWS: usize = 6;
/// Columns in an observation
pub const OBS_COLS: usize = WINDOW_SIZE;

/// Row indices
pub const OPEN_ROW: usize = 0;
pub const HIGH_ROW: usize = 1;
pub const LOW_ROW: usize = 2;
pub const CLOSE_ROW: usize = 3;
pub const VOLUME_ROW: usize = 4;
pub const ACCOUNT_ROW: usize = 5;

/// Scaled 6×6 observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation(pub [[f64; OBS_COLS]; OBS_ROWS]);

impl Observation {
    /// Build the observation for `window` (exactly `WINDOW_SIZE` bars) and the
    /// current account.
    pub(crate) fn build(window: &[PriceBar], state: &EpisodeState, config: &EnvConfig) -> Self {
        debug_assert_eq!(window.len(), WINDOW_SIZE);

        let mut rows = [[0.0; OBS_COLS]; OBS_ROWS];
        for (col, bar) in window.iter().enumerate().take(OBS_COLS) {
            rows[OPEN_ROW][col] = bar.open / config.max_share_price;
            rows[HIGH_ROW][col] = bar.high / config.max_share_price;
            rows[LOW_ROW][col] = bar.low / config.max_share_price;
            rows[CLOSE_ROW][col] = bar.close / config.max_share_price;
            // Volume shares the price divisor.
            rows[VOLUME_ROW][col] = bar.volume / config.max_share_price;
        }

        rows[ACCOUNT_ROW] = [
            state.balance / config.max_account_balance,
            state.max_net_worth / config.max_account_balance,
            state.shares_held / config.max_share_count,
            state.cost_basis / config.max_share_price,
            state.total_shares_sold / config.max_share_count,
            state.total_sales_value / (config.max_share_count * config.max_share_price),
        ];

        Self(rows)
    }

    pub fn rows(&self) -> &[[f64; OBS_COLS]; OBS_ROWS] {
        &self.0
    }

    pub fn row(&self, index: usize) -> &[f64; OBS_COLS] {
        &self.0[index]
    }

    pub fn account(&self) -> &[f64; OBS_COLS] {
        &self.0[ACCOUNT_ROW]
    }

    /// Row-major flattening for agents that take a flat input vector
    pub fn to_flat_vec(&self) -> Vec<f32> {
        self.0
            .iter()
            .flat_map(|row| row.iter().map(|&v| v as f32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Vec<PriceBar> {
        (0..WINDOW_SIZE)
            .map(|i| {
                let base = 100.0 + i as f64;
                PriceBar::new(base, base + 2.0, base - 2.0, base + 1.0, 500.0 * (i + 1) as f64)
            })
            .collect()
    }

    #[test]
    fn test_price_rows_are_scaled_by_max_share_price() {
        let config = EnvConfig::default();
        let state = EpisodeState::new(config.initial_account_balance, 0);
        let obs = Observation::build(&window(), &state, &config);

        assert_eq!(obs.row(OPEN_ROW)[0], 100.0 / 5_000.0);
        assert_eq!(obs.row(HIGH_ROW)[2], 104.0 / 5_000.0);
        assert_eq!(obs.row(LOW_ROW)[5], 103.0 / 5_000.0);
        assert_eq!(obs.row(CLOSE_ROW)[1], 102.0 / 5_000.0);
        assert_eq!(obs.row(VOLUME_ROW)[3], 2_000.0 / 5_000.0);
    }

    #[test]
    fn test_account_row() {
        let config = EnvConfig {
            max_account_balance: 100_000.0,
            max_share_count: 1_000.0,
            max_share_price: 500.0,
            ..Default::default()
        };
        let mut state = EpisodeState::new(10_000.0, 0);
        state.shares_held = 50.0;
        state.cost_basis = 125.0;
        state.max_net_worth = 20_000.0;
        state.total_shares_sold = 10.0;
        state.total_sales_value = 2_500.0;

        let obs = Observation::build(&window(), &state, &config);
        assert_eq!(
            obs.account(),
            &[0.1, 0.2, 0.05, 0.25, 0.01, 2_500.0 / 500_000.0]
        );
    }

    #[test]
    fn test_flat_vec_is_row_major() {
        let config = EnvConfig::default();
        let state = EpisodeState::new(config.initial_account_balance, 0);
        let obs = Observation::build(&window(), &state, &config);
        let flat = obs.to_flat_vec();

        assert_eq!(flat.len(), OBS_ROWS * OBS_COLS);
        assert_eq!(flat[0], obs.row(OPEN_ROW)[0] as f32);
        assert_eq!(flat[OBS_COLS], obs.row(HIGH_ROW)[0] as f32);
        assert_eq!(flat[ACCOUNT_ROW * OBS_COLS], obs.account()[0] as f32);
    }
}
