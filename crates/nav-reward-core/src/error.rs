//! Error types for the reward engine

use thiserror::Error;

use crate::sensor::ActorClass;

/// Result type for reward engine operations
pub type Result<T> = std::result::Result<T, RewardError>;

/// Reward engine error types
#[derive(Debug, Error, PartialEq)]
pub enum RewardError {
    /// Rule identifier not present in the registry
    #[error("Unknown reward rule: {0}")]
    UnknownRule(String),

    /// Proximity term consulted an actor class with no actors this step
    #[error("No {0} actors present for proximity check")]
    EmptyActorGroup(ActorClass),

    /// Range scan carried no readings
    #[error("Range scan has no readings")]
    EmptyRangeScan,

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Step requested before the first reset
    #[error("Episode not started, call reset")]
    EpisodeNotStarted,

    /// Episode already terminated
    #[error("Episode terminated, call reset")]
    EpisodeTerminated,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RewardError {
    fn from(err: serde_json::Error) -> Self {
        RewardError::Serialization(err.to_string())
    }
}
