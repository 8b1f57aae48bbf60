//! Scoring terms
//!
//! Each term reads the step's sensor view and the running [`StepContext`],
//! and may adjust the reward and/or mark the episode terminal. Terms run in
//! rule order and later terms overwrite the termination fields set by
//! earlier ones.

use tracing::{debug, trace};

use crate::config::RewardConfig;
use crate::outcome::{DoneReason, StepContext};
use crate::reward::components;
use crate::sensor::{ActorClass, ActorGroup, GoalPolar};
use crate::state::EpisodeState;

pub const GOAL_REACHED_REWARD: f64 = 15.0;
pub const NOT_MOVING_PENALTY: f64 = 0.01;
pub const SAFE_DIST_PENALTY: f64 = 0.15;
pub const COLLISION_PENALTY: f64 = 10.0;
pub const PROXIMITY_PENALTY: f64 = 5.0;
/// Weight on the per-step change in goal distance
pub const GOAL_APPROACH_WEIGHT: f64 = 0.25;

/// Borrowed sensor inputs for one step
#[derive(Debug, Clone, Copy)]
pub struct StepView<'a> {
    /// Closest range reading
    pub scan_min: f64,
    pub goal: GoalPolar,
    pub adult: &'a ActorGroup,
    pub child: &'a ActorGroup,
    pub elder: &'a ActorGroup,
}

impl<'a> StepView<'a> {
    pub fn group(&self, class: ActorClass) -> &'a ActorGroup {
        match class {
            ActorClass::Adult => self.adult,
            ActorClass::Child => self.child,
            ActorClass::Elder => self.elder,
        }
    }
}

/// A single reward/outcome-affecting check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    GoalReached,
    NotMoving,
    SafeDist,
    Collision,
    /// Distance shaping; the only term that writes episode state
    GoalApproach,
    Proximity(ActorClass),
}

impl Term {
    /// Component name this term reports under
    pub fn component(self) -> &'static str {
        match self {
            Term::GoalReached => components::GOAL_REACHED,
            Term::NotMoving => components::NOT_MOVING,
            Term::SafeDist => components::SAFE_DIST,
            Term::Collision => components::COLLISION,
            Term::GoalApproach => components::GOAL_APPROACH,
            Term::Proximity(ActorClass::Adult) => components::ADULT_PROXIMITY,
            Term::Proximity(ActorClass::Child) => components::CHILD_PROXIMITY,
            Term::Proximity(ActorClass::Elder) => components::ELDER_PROXIMITY,
        }
    }

    pub fn apply(
        self,
        ctx: &mut StepContext,
        view: &StepView<'_>,
        state: &mut EpisodeState,
        config: &RewardConfig,
    ) {
        trace!(term = ?self, reward = ctx.reward(), "applying term");
        match self {
            Term::GoalReached => goal_reached(ctx, view, config),
            Term::NotMoving => not_moving(ctx, view, state),
            Term::SafeDist => safe_dist(ctx, view, config),
            Term::Collision => collision(ctx, view, config),
            Term::GoalApproach => goal_approach(ctx, view, state),
            Term::Proximity(class) => proximity(ctx, view, config, class),
        }
    }
}

fn goal_reached(ctx: &mut StepContext, view: &StepView<'_>, config: &RewardConfig) {
    if view.goal.distance < config.goal_threshold() {
        ctx.set_reward(components::GOAL_REACHED, GOAL_REACHED_REWARD);
        ctx.terminate(DoneReason::GoalReached, true);
        debug!(goal_distance = view.goal.distance, "goal reached");
    } else {
        ctx.continue_episode();
    }
}

// Exact equality: only an unchanged distance counts as standing still.
fn not_moving(ctx: &mut StepContext, view: &StepView<'_>, state: &EpisodeState) {
    if state.previous_goal_distance() == Some(view.goal.distance) {
        ctx.add(components::NOT_MOVING, -NOT_MOVING_PENALTY);
    }
}

fn safe_dist(ctx: &mut StepContext, view: &StepView<'_>, config: &RewardConfig) {
    if view.scan_min < config.safe_dist {
        ctx.add(components::SAFE_DIST, -SAFE_DIST_PENALTY);
    }
}

fn collision(ctx: &mut StepContext, view: &StepView<'_>, config: &RewardConfig) {
    if view.scan_min <= config.robot_radius {
        ctx.add(components::COLLISION, -COLLISION_PENALTY);
        ctx.terminate(DoneReason::Collision, false);
        debug!(scan_min = view.scan_min, "collision");
    }
}

fn goal_approach(ctx: &mut StepContext, view: &StepView<'_>, state: &mut EpisodeState) {
    let current = view.goal.distance;
    if let Some(previous) = state.previous_goal_distance() {
        let shaped = round3(GOAL_APPROACH_WEIGHT * (previous - current));
        ctx.add(components::GOAL_APPROACH, shaped);
    }
    state.record_goal_distance(current);
}

fn proximity(
    ctx: &mut StepContext,
    view: &StepView<'_>,
    config: &RewardConfig,
    class: ActorClass,
) {
    let Some(closest) = view.group(class).min_distance() else {
        trace!(%class, "no actors present, skipping proximity check");
        return;
    };
    if closest < config.safe_dist_for(class) {
        ctx.add(Term::Proximity(class).component(), -PROXIMITY_PENALTY);
        ctx.terminate(DoneReason::ProximityViolation, false);
        debug!(%class, distance = closest, "proximity violation");
    }
}

/// Round to three decimals.
///
/// Rounds the exact stored binary value (ties to even), so 0.0125, which is
/// stored slightly above the tie, goes up to 0.013.
pub fn round3(value: f64) -> f64 {
    format!("{value:.3}").parse().unwrap_or(value)
}
