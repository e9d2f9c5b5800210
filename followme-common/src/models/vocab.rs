// File: followme-common/src/models/vocab.rs

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Four-letter command tags accepted on the command channel.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Vocab {
    /// Greet gesture.
    Salute,
    SignalLeft,
    SignalRight,
    /// Enable idle arm swinging.
    Swing,
    /// Disable arm swinging and home the arms.
    Homing,
    /// Halt all arm motion.
    Stop,
    FollowMe,
    StopFollowing,
    GetEncoderPosition,
    /// Inbound recognized speech.
    Hear,
    Status,
}

impl Vocab {
    pub const ALL: [Vocab; 11] = [
        Vocab::Salute,
        Vocab::SignalLeft,
        Vocab::SignalRight,
        Vocab::Swing,
        Vocab::Homing,
        Vocab::Stop,
        Vocab::FollowMe,
        Vocab::StopFollowing,
        Vocab::GetEncoderPosition,
        Vocab::Hear,
        Vocab::Status,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Vocab::Salute => "salu",
            Vocab::SignalLeft => "sigl",
            Vocab::SignalRight => "sigr",
            Vocab::Swing => "swin",
            Vocab::Homing => "home",
            Vocab::Stop => "stop",
            Vocab::FollowMe => "foll",
            Vocab::StopFollowing => "sfol",
            Vocab::GetEncoderPosition => "geps",
            Vocab::Hear => "hear",
            Vocab::Status => "stat",
        }
    }
}

impl fmt::Display for Vocab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Vocab {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Vocab::ALL
            .iter()
            .find(|v| v.tag() == lowered)
            .copied()
            .ok_or_else(|| format!("Unknown vocab: {}", s))
    }
}
