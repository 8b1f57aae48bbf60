//! Episode driver with a step budget, plus end-of-episode bookkeeping

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::error::{Result, RewardError};
use crate::evaluator::RewardEvaluator;
use crate::outcome::{DoneReason, StepOutcome};
use crate::sensor::StepInputs;

/// Default step budget per episode
pub const DEFAULT_MAX_STEPS: u64 = 525;

/// Step budget configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
}

fn default_max_steps() -> u64 {
    DEFAULT_MAX_STEPS
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// What happened over one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub steps: u64,
    pub total_reward: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<DoneReason>,
    pub is_success: bool,
}

/// Receives finished episodes (curriculum, training bookkeeping)
pub trait EpisodeObserver: Send {
    fn on_episode_end(&mut self, summary: &EpisodeSummary);
}

/// Lets the caller keep a handle on an observer the episode also holds
impl<O: EpisodeObserver> EpisodeObserver for Arc<Mutex<O>> {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) {
        match self.lock() {
            Ok(mut inner) => inner.on_episode_end(summary),
            Err(_) => warn!("Episode observer lock poisoned, dropping summary"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NotStarted,
    Running,
    Done,
}

/// Drives one robot's episodes: scores steps, enforces the step budget and
/// notifies observers when an episode ends.
pub struct Episode {
    evaluator: RewardEvaluator,
    config: EpisodeConfig,
    phase: Phase,
    steps: u64,
    total_reward: f64,
    last: Option<StepOutcome>,
    observers: Vec<Box<dyn EpisodeObserver>>,
}

impl Episode {
    pub fn new(evaluator: RewardEvaluator, config: EpisodeConfig) -> Self {
        Self {
            evaluator,
            config,
            phase: Phase::NotStarted,
            steps: 0,
            total_reward: 0.0,
            last: None,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn EpisodeObserver>) {
        self.observers.push(observer);
    }

    pub fn evaluator(&self) -> &RewardEvaluator {
        &self.evaluator
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Begin a new episode
    pub fn reset(&mut self) {
        self.evaluator.reset();
        self.phase = Phase::Running;
        self.steps = 0;
        self.total_reward = 0.0;
        self.last = None;
    }

    /// Score one step. When the engine did not end the episode and the step
    /// budget is used up, the step is marked done with [`DoneReason::MaxSteps`].
    pub fn step(&mut self, inputs: &StepInputs) -> Result<StepOutcome> {
        match self.phase {
            Phase::NotStarted => return Err(RewardError::EpisodeNotStarted),
            Phase::Done => return Err(RewardError::EpisodeTerminated),
            Phase::Running => {}
        }

        let (reward, mut outcome) = self.evaluator.evaluate_inputs(inputs)?;
        self.steps += 1;
        self.total_reward += reward;

        if !outcome.is_done && self.steps >= self.config.max_steps {
            outcome.terminate(DoneReason::MaxSteps, false);
        }

        self.last = Some(outcome.clone());
        if outcome.is_done {
            self.phase = Phase::Done;
            self.finish();
        }
        Ok(outcome)
    }

    /// Summary of the current (or just finished) episode
    pub fn summary(&self) -> EpisodeSummary {
        let last = self.last.as_ref().filter(|o| o.is_done);
        EpisodeSummary {
            steps: self.steps,
            total_reward: self.total_reward,
            done_reason: last.and_then(|o| o.done_reason),
            is_success: last.is_some_and(|o| o.is_success),
        }
    }

    fn finish(&mut self) {
        let summary = self.summary();
        info!(
            steps = summary.steps,
            total_reward = summary.total_reward,
            reason = summary.done_reason.map(DoneReason::describe).unwrap_or("none"),
            "Episode finished"
        );
        for observer in &mut self.observers {
            observer.on_episode_end(&summary);
        }
    }
}

/// Aggregate outcome counts over many episodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub episodes: u64,
    pub successes: u64,
    pub total_reward: f64,
    pub by_reason: HashMap<String, u64>,
}

impl OutcomeTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, summary: &EpisodeSummary) {
        self.episodes += 1;
        if summary.is_success {
            self.successes += 1;
        }
        self.total_reward += summary.total_reward;
        let key = summary
            .done_reason
            .map(|r| r.describe().to_string())
            .unwrap_or_else(|| "none".to_string());
        *self.by_reason.entry(key).or_insert(0) += 1;
    }

    pub fn count(&self, reason: DoneReason) -> u64 {
        self.by_reason.get(reason.describe()).copied().unwrap_or(0)
    }

    /// Fraction of episodes that reached the goal, `None` before any episode
    pub fn success_rate(&self) -> Option<f64> {
        (self.episodes > 0).then(|| self.successes as f64 / self.episodes as f64)
    }

    pub fn mean_reward(&self) -> Option<f64> {
        (self.episodes > 0).then(|| self.total_reward / self.episodes as f64)
    }
}

impl EpisodeObserver for OutcomeTally {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) {
        self.record(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewardConfig;
    use crate::sensor::{ActorGroup, GoalPolar, RangeScan};

    fn episode(max_steps: u64) -> Episode {
        let evaluator = RewardEvaluator::new(RewardConfig::new(0.3, 0.6, 1.0)).unwrap();
        Episode::new(evaluator, EpisodeConfig { max_steps })
    }

    fn inputs(scan_min: f64, goal: f64) -> StepInputs {
        StepInputs {
            scan: RangeScan::new(vec![scan_min, 5.0]),
            goal: GoalPolar::new(goal, 0.0),
            adult: ActorGroup::from_distances([3.0]),
            child: ActorGroup::default(),
            elder: ActorGroup::default(),
        }
    }

    #[test]
    fn test_step_before_reset_fails() {
        let mut ep = episode(10);
        assert_eq!(
            ep.step(&inputs(2.0, 5.0)).unwrap_err(),
            RewardError::EpisodeNotStarted
        );
    }

    #[test]
    fn test_step_budget_sets_max_steps() {
        let mut ep = episode(3);
        ep.reset();
        assert!(!ep.step(&inputs(2.0, 5.0)).unwrap().is_done);
        assert!(!ep.step(&inputs(2.0, 4.0)).unwrap().is_done);

        let last = ep.step(&inputs(2.0, 3.0)).unwrap();
        assert!(last.is_done);
        assert_eq!(last.done_reason, Some(DoneReason::MaxSteps));
        assert!(!last.is_success);
        assert!(ep.is_done());

        assert_eq!(
            ep.step(&inputs(2.0, 3.0)).unwrap_err(),
            RewardError::EpisodeTerminated
        );
    }

    #[test]
    fn test_engine_reason_beats_budget() {
        let mut ep = episode(1);
        ep.reset();
        let outcome = ep.step(&inputs(0.1, 5.0)).unwrap();
        assert_eq!(outcome.done_reason, Some(DoneReason::Collision));
    }

    #[test]
    fn test_summary_and_observers() {
        let tally = Arc::new(Mutex::new(OutcomeTally::new()));
        let mut ep = episode(100);
        ep.add_observer(Box::new(tally.clone()));

        ep.reset();
        ep.step(&inputs(2.0, 1.0)).unwrap();
        let outcome = ep.step(&inputs(2.0, 0.2)).unwrap();
        assert_eq!(outcome.done_reason, Some(DoneReason::GoalReached));

        let summary = ep.summary();
        assert_eq!(summary.steps, 2);
        assert!(summary.is_success);
        // 15 + round(0.25 * 0.8, 3)
        assert!((summary.total_reward - 15.2).abs() < 1e-9);

        ep.reset();
        assert_eq!(ep.summary().done_reason, None);
        assert_eq!(ep.steps(), 0);
        ep.step(&inputs(0.1, 5.0)).unwrap();

        let tally = tally.lock().unwrap();
        assert_eq!(tally.episodes, 2);
        assert_eq!(tally.count(DoneReason::GoalReached), 1);
        assert_eq!(tally.count(DoneReason::Collision), 1);
        assert_eq!(tally.success_rate(), Some(0.5));
    }

    #[test]
    fn test_reset_clears_goal_memory() {
        let mut ep = episode(100);
        ep.reset();
        ep.step(&inputs(2.0, 4.0)).unwrap();
        ep.reset();
        assert_eq!(ep.evaluator().state().previous_goal_distance(), None);
        // same goal distance as before the reset, no not-moving penalty
        assert_eq!(ep.step(&inputs(2.0, 4.0)).unwrap().reward, 0.0);
    }

    #[test]
    fn test_tally_empty() {
        let tally = OutcomeTally::new();
        assert_eq!(tally.success_rate(), None);
        assert_eq!(tally.mean_reward(), None);
    }
}
