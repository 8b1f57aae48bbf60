//! Reward engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, RewardError};
use crate::sensor::ActorClass;

/// Safe distance to children (meters). Not configurable.
pub const SAFE_DIST_CHILD: f64 = 1.2;
/// Safe distance to elders (meters). Not configurable.
pub const SAFE_DIST_ELDER: f64 = 1.5;

/// How proximity checks treat an actor class with no actors present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyGroupPolicy {
    /// No actors means nobody is too close
    #[default]
    Ignore,
    /// Fail the step with [`RewardError::EmptyActorGroup`]
    Reject,
}

/// Static configuration for a reward evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Collision threshold on the closest scan reading
    pub robot_radius: f64,
    /// Generic obstacle safe distance
    pub safe_dist: f64,
    /// Safe distance to adults
    pub safe_dist_adult: f64,
    /// Goal counts as reached inside `goal_radius * 2.5`
    #[serde(default = "default_goal_radius")]
    pub goal_radius: f64,
    /// Pipeline identifier, resolved by the rule registry
    #[serde(default = "default_rule")]
    pub rule: String,
    #[serde(default)]
    pub empty_group_policy: EmptyGroupPolicy,
}

fn default_goal_radius() -> f64 {
    0.25
}

fn default_rule() -> String {
    "rule_01".to_string()
}

impl RewardConfig {
    /// Config with the default goal radius and rule
    pub fn new(robot_radius: f64, safe_dist: f64, safe_dist_adult: f64) -> Self {
        Self {
            robot_radius,
            safe_dist,
            safe_dist_adult,
            goal_radius: default_goal_radius(),
            rule: default_rule(),
            empty_group_policy: EmptyGroupPolicy::default(),
        }
    }

    pub fn with_goal_radius(mut self, goal_radius: f64) -> Self {
        self.goal_radius = goal_radius;
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    pub fn with_empty_group_policy(mut self, policy: EmptyGroupPolicy) -> Self {
        self.empty_group_policy = policy;
        self
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Safe distance for an actor class
    pub fn safe_dist_for(&self, class: ActorClass) -> f64 {
        match class {
            ActorClass::Adult => self.safe_dist_adult,
            ActorClass::Child => SAFE_DIST_CHILD,
            ActorClass::Elder => SAFE_DIST_ELDER,
        }
    }

    /// Goal-reached threshold on the goal distance
    pub fn goal_threshold(&self) -> f64 {
        self.goal_radius * 2.5
    }

    /// Reject non-finite or negative distances
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("robot_radius", self.robot_radius),
            ("safe_dist", self.safe_dist),
            ("safe_dist_adult", self.safe_dist_adult),
            ("goal_radius", self.goal_radius),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(RewardError::InvalidConfig(format!(
                    "{name} must be a finite non-negative distance, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RewardConfig::from_json(
            r#"{"robot_radius": 0.3, "safe_dist": 0.6, "safe_dist_adult": 1.0}"#,
        )
        .unwrap();
        assert_eq!(config.goal_radius, 0.25);
        assert_eq!(config.rule, "rule_01");
        assert_eq!(config.empty_group_policy, EmptyGroupPolicy::Ignore);
        assert_eq!(config, RewardConfig::new(0.3, 0.6, 1.0));
    }

    #[test]
    fn test_safe_dist_per_class() {
        let config = RewardConfig::new(0.3, 0.6, 0.8);
        assert_eq!(config.safe_dist_for(ActorClass::Adult), 0.8);
        assert_eq!(config.safe_dist_for(ActorClass::Child), 1.2);
        assert_eq!(config.safe_dist_for(ActorClass::Elder), 1.5);
        assert_eq!(config.goal_threshold(), 0.625);
    }

    #[test]
    fn test_validate_rejects_bad_distances() {
        assert!(RewardConfig::new(0.3, 0.6, 1.0).validate().is_ok());

        let err = RewardConfig::new(-0.1, 0.6, 1.0).validate().unwrap_err();
        assert!(matches!(err, RewardError::InvalidConfig(msg) if msg.contains("robot_radius")));

        let err = RewardConfig::new(0.3, 0.6, 1.0)
            .with_goal_radius(f64::NAN)
            .validate()
            .unwrap_err();
        assert!(matches!(err, RewardError::InvalidConfig(msg) if msg.contains("goal_radius")));
    }

    #[test]
    fn test_policy_parses_snake_case() {
        let config = RewardConfig::from_json(
            r#"{"robot_radius": 0.3, "safe_dist": 0.6, "safe_dist_adult": 1.0,
                "rule": "rule_00", "empty_group_policy": "reject"}"#,
        )
        .unwrap();
        assert_eq!(config.rule, "rule_00");
        assert_eq!(config.empty_group_policy, EmptyGroupPolicy::Reject);
    }
}
