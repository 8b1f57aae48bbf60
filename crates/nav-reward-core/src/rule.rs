//! Rule registry: rule identifiers and their fixed term pipelines

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RewardError};
use crate::reward::RewardComponentDef;
use crate::sensor::ActorClass;
use crate::term::{
    COLLISION_PENALTY, GOAL_REACHED_REWARD, NOT_MOVING_PENALTY, PROXIMITY_PENALTY,
    SAFE_DIST_PENALTY, Term,
};

const RULE_00: &[Term] = &[
    Term::GoalReached,
    Term::NotMoving,
    Term::SafeDist,
    Term::Collision,
    Term::GoalApproach,
];

const RULE_01: &[Term] = &[
    Term::GoalReached,
    Term::NotMoving,
    Term::SafeDist,
    Term::Collision,
    Term::GoalApproach,
    Term::Proximity(ActorClass::Adult),
    Term::Proximity(ActorClass::Child),
    Term::Proximity(ActorClass::Elder),
];

/// Registered reward rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleId {
    /// Goal, motion, obstacle and collision terms only
    #[serde(rename = "rule_00")]
    Rule00,
    /// `rule_00` plus per-class human proximity checks
    #[serde(rename = "rule_01")]
    Rule01,
}

impl RuleId {
    pub const ALL: [RuleId; 2] = [RuleId::Rule00, RuleId::Rule01];

    pub fn name(self) -> &'static str {
        match self {
            RuleId::Rule00 => "rule_00",
            RuleId::Rule01 => "rule_01",
        }
    }

    /// Terms in execution order
    pub fn pipeline(self) -> &'static [Term] {
        match self {
            RuleId::Rule00 => RULE_00,
            RuleId::Rule01 => RULE_01,
        }
    }

    /// Whether the pipeline reads the given actor class
    pub fn checks(self, class: ActorClass) -> bool {
        self.pipeline().contains(&Term::Proximity(class))
    }

    /// Reward components this rule can report
    pub fn components(self) -> Vec<RewardComponentDef> {
        self.pipeline().iter().map(|term| describe(*term)).collect()
    }
}

/// Look up a rule by its identifier
pub fn resolve(name: &str) -> Result<RuleId> {
    name.parse()
}

impl FromStr for RuleId {
    type Err = RewardError;

    fn from_str(s: &str) -> Result<Self> {
        RuleId::ALL
            .into_iter()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| RewardError::UnknownRule(s.to_string()))
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn describe(term: Term) -> RewardComponentDef {
    let name = term.component();
    match term {
        Term::GoalReached => RewardComponentDef::new(
            name,
            "Fixed reward when the goal is inside 2.5 goal radii; ends the episode",
            [GOAL_REACHED_REWARD, GOAL_REACHED_REWARD],
        ),
        Term::NotMoving => RewardComponentDef::new(
            name,
            "Penalty when the goal distance is unchanged since the last step",
            [-NOT_MOVING_PENALTY, 0.0],
        ),
        Term::SafeDist => RewardComponentDef::new(
            name,
            "Penalty when the closest scan reading is inside the safe distance",
            [-SAFE_DIST_PENALTY, 0.0],
        ),
        Term::Collision => RewardComponentDef::new(
            name,
            "Penalty when the closest scan reading is within the robot radius; ends the episode",
            [-COLLISION_PENALTY, 0.0],
        ),
        Term::GoalApproach => RewardComponentDef {
            range: None,
            ..RewardComponentDef::new(
                name,
                "Weighted change in goal distance since the last step",
                [0.0, 0.0],
            )
        },
        Term::Proximity(class) => RewardComponentDef::new(
            name,
            match class {
                ActorClass::Adult => "Penalty when an adult is inside its safe distance; ends the episode",
                ActorClass::Child => "Penalty when a child is inside its safe distance; ends the episode",
                ActorClass::Elder => "Penalty when an elder is inside its safe distance; ends the episode",
            },
            [-PROXIMITY_PENALTY, 0.0],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::components;

    #[test]
    fn test_resolve_known_rules() {
        assert_eq!(resolve("rule_00").unwrap(), RuleId::Rule00);
        assert_eq!(resolve("rule_01").unwrap(), RuleId::Rule01);
        assert_eq!(RuleId::Rule01.to_string(), "rule_01");
    }

    #[test]
    fn test_unknown_rule() {
        assert_eq!(
            resolve("rule_02"),
            Err(RewardError::UnknownRule("rule_02".to_string()))
        );
        assert!(resolve("RULE_00").is_err());
    }

    #[test]
    fn test_rule_01_extends_rule_00() {
        let base = RuleId::Rule00.pipeline();
        let full = RuleId::Rule01.pipeline();
        assert_eq!(&full[..base.len()], base);
        assert_eq!(
            &full[base.len()..],
            &[
                Term::Proximity(ActorClass::Adult),
                Term::Proximity(ActorClass::Child),
                Term::Proximity(ActorClass::Elder),
            ]
        );
        assert_eq!(base.last(), Some(&Term::GoalApproach));
    }

    #[test]
    fn test_rule_00_ignores_actors() {
        for class in [ActorClass::Adult, ActorClass::Child, ActorClass::Elder] {
            assert!(!RuleId::Rule00.checks(class));
            assert!(RuleId::Rule01.checks(class));
        }
    }

    #[test]
    fn test_components_follow_pipeline() {
        let names: Vec<String> = RuleId::Rule01
            .components()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], components::GOAL_REACHED);
        assert_eq!(names[7], components::ELDER_PROXIMITY);

        let approach = &RuleId::Rule00.components()[4];
        assert_eq!(approach.name, components::GOAL_APPROACH);
        assert!(approach.range.is_none());
    }

    #[test]
    fn test_rule_id_serde() {
        let rule: RuleId = serde_json::from_str("\"rule_00\"").unwrap();
        assert_eq!(rule, RuleId::Rule00);
    }
}
