//! # nav-reward-core
//!
//! Per-step reward shaping for a mobile robot navigating among people and
//! static obstacles.
//!
//! This crate provides:
//! - Sensor inputs (range scan, goal in polar robot frame, actor groups)
//! - Rule registry mapping rule identifiers to ordered scoring pipelines
//! - Episode state and the reward evaluator
//! - Episode driver with a step budget and outcome bookkeeping

pub mod config;
pub mod episode;
pub mod error;
pub mod evaluator;
pub mod outcome;
pub mod reward;
pub mod rule;
pub mod sensor;
pub mod state;
pub mod term;

pub use config::{EmptyGroupPolicy, RewardConfig, SAFE_DIST_CHILD, SAFE_DIST_ELDER};
pub use episode::{Episode, EpisodeConfig, EpisodeObserver, EpisodeSummary, OutcomeTally};
pub use error::{Result, RewardError};
pub use evaluator::RewardEvaluator;
pub use outcome::{DoneReason, StepContext, StepOutcome};
pub use reward::{RewardComponentDef, RewardComponents};
pub use rule::RuleId;
pub use sensor::{ActorClass, ActorGroup, ActorReading, GoalPolar, RangeScan, StepInputs};
pub use state::EpisodeState;
pub use term::{StepView, Term};
