//! Episode Runner
//!
//! Drives any `Environment` with a `Policy` and summarises the episodes.
//! Nothing here learns; training loops plug in as a `Policy`.

mod episode;
mod policy;

pub use episode::{EpisodeRunner, EpisodeSummary, RunReport};
pub use policy::{HoldPolicy, Policy, RandomPolicy};
