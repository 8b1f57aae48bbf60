//! Cross-step memory for one episode

/// Memory carried between steps of a single episode.
///
/// `previous_goal_distance` is `None` only before the first step after a
/// reset; every evaluated step records its goal distance here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeState {
    previous_goal_distance: Option<f64>,
}

impl EpisodeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous goal distance. Call before every episode.
    pub fn reset(&mut self) {
        self.previous_goal_distance = None;
    }

    pub fn previous_goal_distance(&self) -> Option<f64> {
        self.previous_goal_distance
    }

    pub(crate) fn record_goal_distance(&mut self, distance: f64) {
        self.previous_goal_distance = Some(distance);
    }
}
