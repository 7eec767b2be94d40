//! Space metadata advertised to agents
//!
//! Bounds are descriptive: callers are expected to honour them, the simulator
//! does not clamp.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::action::{Action, ACTION_TYPE_HIGH};
use super::observation::{OBS_COLS, OBS_ROWS};

/// Box-shaped space with uniform per-element bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
    pub shape: Vec<usize>,
}

impl BoxSpace {
    /// Every element bounded by the same `[low, high]`
    pub fn uniform(low: f64, high: f64, shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self {
            low: vec![low; len],
            high: vec![high; len],
            shape,
        }
    }

    /// Number of scalar elements
    pub fn len(&self) -> usize {
        self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    /// Whether every value lies within `[low, high]`
    pub fn contains(&self, values: &[f64]) -> bool {
        values.len() == self.len()
            && values
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(v, (lo, hi))| *v >= *lo && *v <= *hi)
    }
}

/// `[0, 3) × [0, 1]`
pub fn action_space() -> BoxSpace {
    BoxSpace {
        low: vec![0.0, 0.0],
        high: vec![ACTION_TYPE_HIGH, 1.0],
        shape: vec![2],
    }
}

/// `[0, 1]^(6×6)`
pub fn observation_space() -> BoxSpace {
    BoxSpace::uniform(0.0, 1.0, vec![OBS_ROWS, OBS_COLS])
}

/// Draw an action uniformly from the action space
pub fn sample_action<R: Rng + ?Sized>(rng: &mut R) -> Action {
    Action::new(
        rng.gen_range(0.0..ACTION_TYPE_HIGH),
        rng.gen_range(0.0..=1.0),
    )
}

/// Reward bounds advertised alongside the spaces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardRange {
    pub min: f64,
    pub max: f64,
}
