use std::io;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::policy::Policy;
use crate::config::RunnerConfig;
use crate::env::Environment;
use crate::error::{Result, SimError};

/// Outcome of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f64,
    pub final_net_worth: f64,
    pub max_net_worth: f64,
    pub profit: f64,
    /// The environment reported `done` at least once
    pub ruined: bool,
}

/// Outcome of a batch of episodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub episodes: Vec<EpisodeSummary>,
    pub episode_reward_mean: f64,
    /// Episode with the highest total reward
    pub best_episode: Option<usize>,
}

impl RunReport {
    pub fn from_episodes(episodes: Vec<EpisodeSummary>) -> Self {
        let episode_reward_mean = if episodes.is_empty() {
            0.0
        } else {
            episodes.iter().map(|e| e.total_reward).sum::<f64>() / episodes.len() as f64
        };
        let best_episode = episodes
            .iter()
            .max_by(|a, b| a.total_reward.total_cmp(&b.total_reward))
            .map(|e| e.episode);

        Self {
            episodes,
            episode_reward_mean,
            best_episode,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<W: io::Write>(&self, out: W) -> Result<()> {
        serde_json::to_writer_pretty(out, self)?;
        Ok(())
    }
}

/// Plays a policy against an environment
#[derive(Debug, Clone)]
pub struct EpisodeRunner {
    config: RunnerConfig,
}

impl EpisodeRunner {
    pub fn new(config: RunnerConfig) -> Result<Self> {
        config.validate().map_err(SimError::invalid_config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Reset, then step until the step cap or (if configured) `done`
    pub fn run_episode<E, P>(
        &self,
        env: &mut E,
        policy: &mut P,
        episode: usize,
    ) -> Result<EpisodeSummary>
    where
        E: Environment + ?Sized,
        P: Policy + ?Sized,
    {
        let mut observation = env.reset();
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut ruined = false;

        while steps < self.config.max_steps_per_episode {
            let action = policy.act(&observation);
            let result = env.step(action)?;

            total_reward += result.reward;
            steps += 1;
            observation = result.observation;

            if let Some(interval) = self.config.render_interval {
                if steps % interval == 0 {
                    env.render()?;
                }
            }

            if result.done {
                ruined = true;
                if self.config.stop_on_done {
                    debug!(episode, steps, "Episode ended on done");
                    break;
                }
            }
        }

        let report = env.report().ok_or(SimError::NotReset)?;
        let summary = EpisodeSummary {
            episode,
            steps,
            total_reward,
            final_net_worth: report.net_worth,
            max_net_worth: report.max_net_worth,
            profit: report.profit,
            ruined,
        };

        info!(
            episode,
            steps,
            total_reward,
            net_worth = summary.final_net_worth,
            ruined,
            "Episode finished"
        );

        Ok(summary)
    }

    /// Play `episodes` episodes back to back
    pub fn run<E, P>(&self, env: &mut E, policy: &mut P) -> Result<RunReport>
    where
        E: Environment + ?Sized,
        P: Policy + ?Sized,
    {
        let mut episodes = Vec::with_capacity(self.config.episodes);
        for episode in 0..self.config.episodes {
            episodes.push(self.run_episode(env, policy, episode)?);
        }

        let report = RunReport::from_episodes(episodes);
        info!(
            episodes = report.episodes.len(),
            episode_reward_mean = report.episode_reward_mean,
            "Run finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{
        Action, ActionKind, EpisodeReport, Fill, MockEnvironment, Observation, StepResult,
        OBS_COLS, OBS_ROWS,
    };
    use crate::runner::policy::MockPolicy;
    use std::collections::HashMap;

    fn blank() -> Observation {
        Observation([[0.0; OBS_COLS]; OBS_ROWS])
    }

    fn step_result(reward: f64, done: bool) -> StepResult {
        StepResult {
            observation: blank(),
            reward,
            done,
            info: HashMap::new(),
            fill: Fill {
                kind: ActionKind::Hold,
                price: 1.0,
                shares: 0.0,
                value: 0.0,
            },
        }
    }

    fn report(net_worth: f64) -> EpisodeReport {
        EpisodeReport {
            step: 0,
            balance: net_worth,
            shares_held: 0.0,
            total_shares_sold: 0.0,
            cost_basis: 0.0,
            total_sales_value: 0.0,
            net_worth,
            max_net_worth: 10_000.0,
            profit: net_worth - 10_000.0,
        }
    }

    fn runner(max_steps: usize, stop_on_done: bool, render_interval: Option<usize>) -> EpisodeRunner {
        EpisodeRunner::new(RunnerConfig {
            episodes: 1,
            max_steps_per_episode: max_steps,
            stop_on_done,
            render_interval,
        })
        .unwrap()
    }

    #[test]
    fn test_episode_runs_to_step_cap() {
        let mut env = MockEnvironment::new();
        env.expect_reset().times(1).returning(blank);
        env.expect_step()
            .times(4)
            .returning(|_| Ok(step_result(1.5, false)));
        env.expect_render().never();
        env.expect_report().returning(|| Some(report(10_500.0)));

        let mut policy = MockPolicy::new();
        policy.expect_act().times(4).returning(|_| Action::hold());

        let summary = runner(4, true, None).run_episode(&mut env, &mut policy, 3).unwrap();
        assert_eq!(summary.episode, 3);
        assert_eq!(summary.steps, 4);
        assert_eq!(summary.total_reward, 6.0);
        assert_eq!(summary.final_net_worth, 10_500.0);
        assert_eq!(summary.profit, 500.0);
        assert!(!summary.ruined);
    }

    #[test]
    fn test_episode_stops_on_done() {
        let mut env = MockEnvironment::new();
        env.expect_reset().returning(blank);
        env.expect_step()
            .times(1)
            .returning(|_| Ok(step_result(0.0, true)));
        env.expect_report().returning(|| Some(report(0.0)));

        let mut policy = MockPolicy::new();
        policy.expect_act().times(1).returning(|_| Action::buy(1.0));

        let summary = runner(10, true, None).run_episode(&mut env, &mut policy, 0).unwrap();
        assert_eq!(summary.steps, 1);
        assert!(summary.ruined);
    }

    #[test]
    fn test_episode_continues_past_done_when_configured() {
        let mut env = MockEnvironment::new();
        env.expect_reset().returning(blank);
        env.expect_step()
            .times(3)
            .returning(|_| Ok(step_result(0.0, true)));
        env.expect_report().returning(|| Some(report(0.0)));

        let mut policy = MockPolicy::new();
        policy.expect_act().returning(|_| Action::hold());

        let summary = runner(3, false, None).run_episode(&mut env, &mut policy, 0).unwrap();
        assert_eq!(summary.steps, 3);
        assert!(summary.ruined);
    }

    #[test]
    fn test_render_interval() {
        let mut env = MockEnvironment::new();
        env.expect_reset().returning(blank);
        env.expect_step().returning(|_| Ok(step_result(0.0, false)));
        env.expect_render().times(2).returning(|| Ok(()));
        env.expect_report().returning(|| Some(report(10_000.0)));

        let mut policy = MockPolicy::new();
        policy.expect_act().returning(|_| Action::hold());

        runner(5, true, Some(2)).run_episode(&mut env, &mut policy, 0).unwrap();
    }

    #[test]
    fn test_step_error_propagates() {
        let mut env = MockEnvironment::new();
        env.expect_reset().returning(blank);
        env.expect_step().returning(|_| Err(SimError::NotReset));
        env.expect_report().never();

        let mut policy = MockPolicy::new();
        policy.expect_act().returning(|_| Action::hold());

        let err = runner(5, true, None)
            .run_episode(&mut env, &mut policy, 0)
            .unwrap_err();
        assert!(matches!(err, SimError::NotReset));
    }

    #[test]
    fn test_invalid_runner_config() {
        let result = EpisodeRunner::new(RunnerConfig {
            max_steps_per_episode: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_run_report_mean_and_best() {
        let summary = |episode, total_reward| EpisodeSummary {
            episode,
            steps: 10,
            total_reward,
            final_net_worth: 10_000.0,
            max_net_worth: 10_000.0,
            profit: 0.0,
            ruined: false,
        };
        let report = RunReport::from_episodes(vec![summary(0, 1.0), summary(1, 5.0), summary(2, 3.0)]);
        assert_eq!(report.episode_reward_mean, 3.0);
        assert_eq!(report.best_episode, Some(1));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["episode_reward_mean"], 3.0);
        assert_eq!(json["episodes"].as_array().unwrap().len(), 3);

        let empty = RunReport::from_episodes(Vec::new());
        assert_eq!(empty.episode_reward_mean, 0.0);
        assert_eq!(empty.best_episode, None);
    }
}
