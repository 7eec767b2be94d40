use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::env::{sample_action, Action, Observation};

/// Maps an observation to an action
#[cfg_attr(test, mockall::automock)]
pub trait Policy {
    fn act(&mut self, observation: &Observation) -> Action;
}

/// Never trades
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldPolicy;

impl Policy for HoldPolicy {
    fn act(&mut self, _observation: &Observation) -> Action {
        Action::hold()
    }
}

/// Samples uniformly from the action space
#[derive(Debug, Clone)]
pub struct RandomPolicy<R = StdRng> {
    rng: R,
}

impl RandomPolicy<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomPolicy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Policy for RandomPolicy<R> {
    fn act(&mut self, _observation: &Observation) -> Action {
        sample_action(&mut self.rng)
    }
}
