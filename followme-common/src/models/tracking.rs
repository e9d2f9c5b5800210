// File: followme-common/src/models/tracking.rs

use serde::{Deserialize, Serialize};
use crate::error::Error;

/// Position of the tracked person relative to the image center.
///
/// Positive `x` is to the right of the frame, positive `y` is down.
/// `depth` is carried along but never used for control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetOffset {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

impl TargetOffset {
    pub fn new(x: f64, y: f64, depth: f64) -> Self {
        Self { x, y, depth }
    }

    /// Builds an offset from a raw vision message; exactly three values expected.
    pub fn from_values(values: &[f64]) -> Result<Self, Error> {
        match values {
            [x, y, depth] => Ok(Self::new(*x, *y, *depth)),
            other => Err(Error::Protocol(format!(
                "expected 3 elements, got {}",
                other.len()
            ))),
        }
    }
}

/// Side of the robot the person stands on, derived from the head yaw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonSide {
    Left,
    Right,
    Center,
}

/// Head-angle thresholds (degrees) used to announce the person's side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveThresholds {
    /// |angle| beyond this means left (positive) or right (negative).
    pub side: f64,
    /// |angle| below this means center.
    pub center: f64,
}

impl Default for WaveThresholds {
    fn default() -> Self {
        Self { side: 10.0, center: 3.0 }
    }
}

impl PersonSide {
    /// Returns the side crossed into, or `None` when nothing new happened
    /// since `last`.
    pub fn crossing(angle: f64, last: Option<PersonSide>, th: &WaveThresholds) -> Option<PersonSide> {
        let side = if angle > th.side {
            PersonSide::Left
        } else if angle < -th.side {
            PersonSide::Right
        } else if angle > -th.center && angle < th.center {
            PersonSide::Center
        } else {
            return None;
        };

        if last == Some(side) { None } else { Some(side) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_requires_three_elements() {
        let ok = TargetOffset::from_values(&[0.5, -0.1, 1.2]).unwrap();
        assert_eq!(ok, TargetOffset::new(0.5, -0.1, 1.2));
        assert!(matches!(TargetOffset::from_values(&[0.5, 0.1]), Err(Error::Protocol(_))));
        assert!(TargetOffset::from_values(&[]).is_err());
    }

    #[test]
    fn test_crossing_fires_once_per_side() {
        let th = WaveThresholds::default();
        assert_eq!(PersonSide::crossing(12.0, None, &th), Some(PersonSide::Left));
        assert_eq!(PersonSide::crossing(15.0, Some(PersonSide::Left), &th), None);
        assert_eq!(PersonSide::crossing(-11.0, Some(PersonSide::Left), &th), Some(PersonSide::Right));
        assert_eq!(PersonSide::crossing(0.5, Some(PersonSide::Right), &th), Some(PersonSide::Center));
        // Between the center band and the side threshold nothing is announced.
        assert_eq!(PersonSide::crossing(6.0, Some(PersonSide::Center), &th), None);
        assert_eq!(PersonSide::crossing(10.0, None, &th), None);
    }
}
