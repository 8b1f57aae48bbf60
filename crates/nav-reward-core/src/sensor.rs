//! Per-step sensor inputs: range scan, goal position and actor groups

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance readings from the robot's ranging sensor for one step (meters)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeScan(pub Vec<f64>);

impl RangeScan {
    pub fn new(readings: impl Into<Vec<f64>>) -> Self {
        Self(readings.into())
    }

    /// Closest reading, `None` for an empty scan.
    ///
    /// A NaN reading makes the minimum NaN, so no distance check fires.
    pub fn min(&self) -> Option<f64> {
        min_of(self.0.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Goal position in the robot frame, polar coordinates.
///
/// Serialized as the pair `[rho, theta]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct GoalPolar {
    /// Distance to goal (rho)
    pub distance: f64,
    /// Bearing to goal (theta), radians
    pub bearing: f64,
}

impl GoalPolar {
    pub fn new(distance: f64, bearing: f64) -> Self {
        Self { distance, bearing }
    }
}

impl From<(f64, f64)> for GoalPolar {
    fn from((distance, bearing): (f64, f64)) -> Self {
        Self { distance, bearing }
    }
}

impl From<GoalPolar> for (f64, f64) {
    fn from(goal: GoalPolar) -> Self {
        (goal.distance, goal.bearing)
    }
}

/// Class of a dynamic actor sharing the space with the robot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorClass {
    Adult,
    Child,
    Elder,
}

impl fmt::Display for ActorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActorClass::Adult => "adult",
            ActorClass::Child => "child",
            ActorClass::Elder => "elder",
        };
        f.write_str(name)
    }
}

/// One actor's position relative to the robot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorReading {
    /// Distance to the robot (meters)
    pub distance: f64,
    /// Bearing from the robot heading (radians)
    #[serde(default)]
    pub bearing: f64,
}

/// All actors of a single class observed this step. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorGroup(pub Vec<ActorReading>);

impl ActorGroup {
    /// Group built from bare distances (bearing zero)
    pub fn from_distances(distances: impl IntoIterator<Item = f64>) -> Self {
        Self(
            distances
                .into_iter()
                .map(|distance| ActorReading {
                    distance,
                    bearing: 0.0,
                })
                .collect(),
        )
    }

    /// Closest actor distance, `None` when no actor of this class is present
    pub fn min_distance(&self) -> Option<f64> {
        min_of(self.0.iter().map(|a| a.distance))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Everything the engine reads for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInputs {
    pub scan: RangeScan,
    pub goal: GoalPolar,
    #[serde(default)]
    pub adult: ActorGroup,
    #[serde(default)]
    pub child: ActorGroup,
    #[serde(default)]
    pub elder: ActorGroup,
}

impl StepInputs {
    pub fn group(&self, class: ActorClass) -> &ActorGroup {
        match class {
            ActorClass::Adult => &self.adult,
            ActorClass::Child => &self.child,
            ActorClass::Elder => &self.elder,
        }
    }
}

// NaN propagates instead of being skipped like `f64::min` does.
fn min_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, x| {
        Some(acc.map_or(x, |m: f64| {
            if m.is_nan() || x.is_nan() {
                f64::NAN
            } else {
                m.min(x)
            }
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_min() {
        let scan = RangeScan::new(vec![3.5, 0.8, 2.0]);
        assert_eq!(scan.min(), Some(0.8));
        assert_eq!(RangeScan::default().min(), None);
    }

    #[test]
    fn test_nan_reading_poisons_minimum() {
        assert!(RangeScan::new(vec![f64::NAN, 0.1]).min().unwrap().is_nan());
        assert!(RangeScan::new(vec![0.1, f64::NAN]).min().unwrap().is_nan());
        let group = ActorGroup::from_distances([0.5, f64::NAN]);
        assert!(group.min_distance().unwrap().is_nan());
    }

    #[test]
    fn test_empty_group_has_no_minimum() {
        assert_eq!(ActorGroup::default().min_distance(), None);
        let group = ActorGroup::from_distances([2.4, 1.1]);
        assert_eq!(group.min_distance(), Some(1.1));
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_step_inputs_json() {
        let json = r#"{
            "scan": [1.0, 2.0],
            "goal": [4.0, 0.5],
            "child": [{"distance": 0.9, "bearing": -1.2}, {"distance": 3.0}]
        }"#;
        let inputs: StepInputs = serde_json::from_str(json).unwrap();

        assert_eq!(inputs.goal, GoalPolar::new(4.0, 0.5));
        assert!(inputs.adult.is_empty());
        assert!(inputs.elder.is_empty());
        assert_eq!(inputs.group(ActorClass::Child).min_distance(), Some(0.9));

        let serialized = serde_json::to_string(&inputs.goal).unwrap();
        assert_eq!(serialized, "[4.0,0.5]");
    }
}
