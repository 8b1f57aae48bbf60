//! Step outcome record and the per-step accumulator terms write into

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reward::RewardComponents;

/// Why an episode ended.
///
/// The integer codes are part of the external contract and are what gets
/// serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum DoneReason {
    /// Step budget exhausted (set by the episode driver, never by a scoring term)
    MaxSteps = 0,
    Collision = 1,
    GoalReached = 2,
    /// Too close to an adult, child or elder
    ProximityViolation = 3,
}

impl DoneReason {
    pub const ALL: [DoneReason; 4] = [
        DoneReason::MaxSteps,
        DoneReason::Collision,
        DoneReason::GoalReached,
        DoneReason::ProximityViolation,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable reason for episode logs
    pub fn describe(self) -> &'static str {
        match self {
            DoneReason::MaxSteps => "exceeded max steps",
            DoneReason::Collision => "collision",
            DoneReason::GoalReached => "goal reached",
            DoneReason::ProximityViolation => "too close to human",
        }
    }
}

impl From<DoneReason> for u8 {
    fn from(reason: DoneReason) -> Self {
        reason.code()
    }
}

impl TryFrom<u8> for DoneReason {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        DoneReason::ALL
            .into_iter()
            .find(|r| r.code() == code)
            .ok_or_else(|| format!("unknown done reason code {code}"))
    }
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Result of scoring one step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Scalar reward
    pub reward: f64,
    /// Episode terminated this step
    pub is_done: bool,
    /// Why the episode ended, absent while running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<DoneReason>,
    /// Meaningful only when `is_done`
    pub is_success: bool,
    /// What each scoring term contributed
    #[serde(default)]
    pub components: RewardComponents,
}

impl StepOutcome {
    /// Mark the episode as ended. Overwrites any earlier termination.
    pub fn terminate(&mut self, reason: DoneReason, success: bool) {
        self.is_done = true;
        self.done_reason = Some(reason);
        self.is_success = success;
    }
}

/// Mutable accumulator threaded through a rule's terms for one step.
///
/// Created fresh for every step; [`StepContext::finish`] hands the outcome
/// to the caller.
#[derive(Debug, Default)]
pub struct StepContext {
    outcome: StepOutcome,
}

impl StepContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reward(&self) -> f64 {
        self.outcome.reward
    }

    pub fn outcome(&self) -> &StepOutcome {
        &self.outcome
    }

    /// Replace the running reward outright
    pub fn set_reward(&mut self, component: &str, value: f64) {
        self.outcome.reward = value;
        self.outcome.components.insert(component.to_string(), value);
    }

    /// Add to the running reward (negative for penalties)
    pub fn add(&mut self, component: &str, value: f64) {
        self.outcome.reward += value;
        *self
            .outcome
            .components
            .entry(component.to_string())
            .or_insert(0.0) += value;
    }

    pub fn terminate(&mut self, reason: DoneReason, success: bool) {
        self.outcome.terminate(reason, success);
    }

    /// Explicitly mark the step as non-terminal
    pub fn continue_episode(&mut self) {
        self.outcome.is_done = false;
    }

    pub fn finish(self) -> StepOutcome {
        self.outcome
    }
}
