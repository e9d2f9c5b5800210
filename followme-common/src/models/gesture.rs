// File: followme-common/src/models/gesture.rs

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Number of joints driven per arm.
pub const ARM_JOINTS: usize = 6;

/// Joint targets for a single arm, in degrees.
pub type ArmSetpoint = [f64; ARM_JOINTS];

/// Named arm behavior. Exactly one is current inside the sequencer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    Greet,
    SignalLeft,
    SignalRight,
    Swing,
    Homing,
    Rest,
}

impl GestureLabel {
    /// Gestures that fall back to idle swinging once their queue drains.
    pub fn rearms_swing(&self) -> bool {
        matches!(
            self,
            GestureLabel::Greet
                | GestureLabel::SignalLeft
                | GestureLabel::SignalRight
                | GestureLabel::Swing
        )
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureLabel::Greet => write!(f, "greet"),
            GestureLabel::SignalLeft => write!(f, "signal_left"),
            GestureLabel::SignalRight => write!(f, "signal_right"),
            GestureLabel::Swing => write!(f, "swing"),
            GestureLabel::Homing => write!(f, "homing"),
            GestureLabel::Rest => write!(f, "rest"),
        }
    }
}

impl FromStr for GestureLabel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "greet" => Ok(GestureLabel::Greet),
            "signal_left" => Ok(GestureLabel::SignalLeft),
            "signal_right" => Ok(GestureLabel::SignalRight),
            "swing" => Ok(GestureLabel::Swing),
            "homing" => Ok(GestureLabel::Homing),
            "rest" => Ok(GestureLabel::Rest),
            _ => Err(format!("Unknown gesture: {}", s)),
        }
    }
}

/// One instant's targets for both arms. Immutable once enqueued.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SetpointPair {
    pub left: ArmSetpoint,
    pub right: ArmSetpoint,
}

impl SetpointPair {
    pub const fn new(left: ArmSetpoint, right: ArmSetpoint) -> Self {
        Self { left, right }
    }
}
