//! Reward evaluator: runs a rule's pipeline for one step

use tracing::trace;

use crate::config::{EmptyGroupPolicy, RewardConfig};
use crate::error::{Result, RewardError};
use crate::outcome::{StepContext, StepOutcome};
use crate::rule::{self, RuleId};
use crate::sensor::{ActorClass, ActorGroup, GoalPolar, RangeScan, StepInputs};
use crate::state::EpisodeState;
use crate::term::StepView;

/// Scores steps for one robot.
///
/// Owns the episode state for that robot; give each parallel environment
/// its own evaluator.
#[derive(Debug, Clone)]
pub struct RewardEvaluator {
    config: RewardConfig,
    rule: RuleId,
    state: EpisodeState,
}

impl RewardEvaluator {
    /// Validate the config and resolve its rule
    pub fn new(config: RewardConfig) -> Result<Self> {
        config.validate()?;
        let rule = rule::resolve(&config.rule)?;
        Ok(Self {
            config,
            rule,
            state: EpisodeState::new(),
        })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn rule(&self) -> RuleId {
        self.rule
    }

    pub fn state(&self) -> &EpisodeState {
        &self.state
    }

    /// Start a new episode. Must be called before the first step of every
    /// episode, including the very first.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Score one step.
    ///
    /// Input checks happen before any term runs, so a rejected step leaves
    /// the episode state untouched.
    pub fn evaluate(
        &mut self,
        range_scan: &RangeScan,
        goal: GoalPolar,
        adult: &ActorGroup,
        child: &ActorGroup,
        elder: &ActorGroup,
    ) -> Result<(f64, StepOutcome)> {
        let scan_min = range_scan.min().ok_or(RewardError::EmptyRangeScan)?;
        let view = StepView {
            scan_min,
            goal,
            adult,
            child,
            elder,
        };
        if self.config.empty_group_policy == EmptyGroupPolicy::Reject {
            self.check_groups(&view)?;
        }

        let mut ctx = StepContext::new();
        for term in self.rule.pipeline() {
            term.apply(&mut ctx, &view, &mut self.state, &self.config);
        }
        let outcome = ctx.finish();

        trace!(
            rule = %self.rule,
            reward = outcome.reward,
            done = outcome.is_done,
            "step evaluated"
        );
        Ok((outcome.reward, outcome))
    }

    /// Score one step from an owned input bundle
    pub fn evaluate_inputs(&mut self, inputs: &StepInputs) -> Result<(f64, StepOutcome)> {
        self.evaluate(
            &inputs.scan,
            inputs.goal,
            &inputs.adult,
            &inputs.child,
            &inputs.elder,
        )
    }

    fn check_groups(&self, view: &StepView<'_>) -> Result<()> {
        for class in [ActorClass::Adult, ActorClass::Child, ActorClass::Elder] {
            if self.rule.checks(class) && view.group(class).is_empty() {
                return Err(RewardError::EmptyActorGroup(class));
            }
        }
        Ok(())
    }
}
