//! Reward decomposition and component definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Decomposed reward components, keyed by component name
pub type RewardComponents = HashMap<String, f64>;

/// Component names reported in [`RewardComponents`]
pub mod components {
    pub const GOAL_REACHED: &str = "goal_reached";
    pub const NOT_MOVING: &str = "not_moving";
    pub const SAFE_DIST: &str = "safe_dist";
    pub const COLLISION: &str = "collision";
    pub const GOAL_APPROACH: &str = "goal_approach";
    pub const ADULT_PROXIMITY: &str = "adult_proximity";
    pub const CHILD_PROXIMITY: &str = "child_proximity";
    pub const ELDER_PROXIMITY: &str = "elder_proximity";
}

/// Definition of a reward component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardComponentDef {
    /// Component name
    pub name: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expected range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    /// Default weight
    #[serde(default = "default_weight")]
    pub default_weight: f64,
}

impl RewardComponentDef {
    pub(crate) fn new(name: &str, description: &str, range: [f64; 2]) -> Self {
        Self {
            name: name.to_string(),
            description: Some(description.to_string()),
            range: Some(range),
            default_weight: default_weight(),
        }
    }
}

fn default_weight() -> f64 {
    1.0
}
