// File: followme-core/src/arm/gestures.rs
//! Setpoint tables for every arm gesture, in degrees.

use followme_common::models::{ArmSetpoint, GestureLabel, SetpointPair};

const ZERO: ArmSetpoint = [0.0; 6];
/// Left arm slightly raised so it keeps holding the tray.
const TRAY: ArmSetpoint = [0.0, 4.0, 0.0, 0.0, 0.0, 0.0];

const SWING_A: SetpointPair = SetpointPair::new(
    [20.0, 5.0, 0.0, 0.0, 0.0, 0.0],
    [-20.0, -5.0, 0.0, 0.0, 0.0, 0.0],
);
const SWING_B: SetpointPair = SetpointPair::new(
    [-20.0, 5.0, 0.0, 0.0, 0.0, 0.0],
    [20.0, -5.0, 0.0, 0.0, 0.0, 0.0],
);

const GREET: [SetpointPair; 3] = [
    SetpointPair::new(TRAY, [-45.0, 0.0, -20.0, -80.0, 0.0, 0.0]),
    SetpointPair::new(TRAY, [-45.0, 0.0, 20.0, -80.0, 0.0, 0.0]),
    SetpointPair::new(TRAY, [-45.0, 0.0, -20.0, -80.0, 0.0, 0.0]),
];

const SIGNAL_RIGHT: [SetpointPair; 2] = [
    SetpointPair::new(TRAY, [-50.0, -20.0, 10.0, -70.0, 20.0, -40.0]),
    SetpointPair::new(TRAY, [-50.0, -20.0, 10.0, -70.0, 20.0, 0.0]),
];

const SIGNAL_LEFT: [SetpointPair; 2] = [
    SetpointPair::new([-50.0, 20.0, -10.0, -70.0, -20.0, -40.0], ZERO),
    SetpointPair::new([-50.0, 20.0, -10.0, -70.0, -20.0, 0.0], ZERO),
];

const HOMING: [SetpointPair; 1] = [SetpointPair::new(TRAY, ZERO)];

/// Maps a gesture label to the setpoints that realize it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureLibrary;

impl GestureLibrary {
    pub fn setpoints(&self, label: GestureLabel) -> Vec<SetpointPair> {
        match label {
            GestureLabel::Greet => GREET.to_vec(),
            GestureLabel::SignalLeft => SIGNAL_LEFT.to_vec(),
            GestureLabel::SignalRight => SIGNAL_RIGHT.to_vec(),
            GestureLabel::Swing => self.swing(),
            GestureLabel::Homing => HOMING.to_vec(),
            GestureLabel::Rest => Vec::new(),
        }
    }

    /// The two symmetric swing setpoints the sequencer re-arms with.
    pub fn swing(&self) -> Vec<SetpointPair> {
        vec![SWING_A, SWING_B]
    }
}
