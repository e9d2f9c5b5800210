// File: followme-core/src/config.rs
//! Runtime configuration. Every section has sensible defaults; the server
//! binary overrides individual fields from its command-line flags.

use std::net::SocketAddr;
use std::time::Duration;
use followme_common::models::{Language, WaveThresholds};
use crate::Error;

#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub tick_period: Duration,
    pub ref_speed: f64,
    pub ref_acceleration: f64,
    /// When set, a motion that never reports "done" is treated as done after this long.
    pub motion_timeout: Option<Duration>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(100),
            ref_speed: 30.0,
            ref_acceleration: 30.0,
            motion_timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeadTrackingConfig {
    /// Offsets (meters) at or below this magnitude are ignored per axis.
    pub deadband: f64,
    /// Correction step per observation, degrees.
    pub increment: f64,
    pub ref_speed: f64,
    pub ref_acceleration: f64,
    /// Re-home the head on every observation received while following is off.
    pub home_on_disabled_observation: bool,
}

impl Default for HeadTrackingConfig {
    fn default() -> Self {
        Self {
            deadband: 0.03,
            increment: 2.0,
            ref_speed: 30.0,
            ref_acceleration: 30.0,
            home_on_disabled_observation: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DialogueConfig {
    pub language: Language,
    /// `false` runs the scripted no-microphone behavior.
    pub micro: bool,
    pub thresholds: WaveThresholds,
    /// Pause between a signal gesture and the matching announcement.
    pub signal_delay: Duration,
    /// Pause after speech ends before the microphone is unmuted.
    pub settle_delay: Duration,
    pub say_poll_interval: Duration,
    pub say_timeout: Duration,
    pub listen_poll_interval: Duration,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            language: Language::English,
            micro: true,
            thresholds: WaveThresholds::default(),
            signal_delay: Duration::from_secs(5),
            settle_delay: Duration::from_millis(500),
            say_poll_interval: Duration::from_millis(100),
            say_timeout: Duration::from_secs(30),
            listen_poll_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub period: Duration,
    pub report_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(500),
            report_interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub rpc_addr: SocketAddr,
    pub osc_addr: SocketAddr,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_addr: SocketAddr::from(([127, 0, 0, 1], 9011)),
            osc_addr: SocketAddr::from(([127, 0, 0, 1], 9010)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FollowMeConfig {
    pub sequencer: SequencerConfig,
    pub head: HeadTrackingConfig,
    pub dialogue: DialogueConfig,
    pub supervisor: SupervisorConfig,
    pub network: NetworkConfig,
}

impl FollowMeConfig {
    /// Builds a config from the two values that are fatal when wrong.
    pub fn from_language_and_micro(language: &str, micro: &str) -> Result<Self, Error> {
        let mut cfg = Self::default();
        cfg.dialogue.language = parse_language(language)?;
        cfg.dialogue.micro = parse_micro(micro)?;
        Ok(cfg)
    }
}

pub fn parse_language(value: &str) -> Result<Language, Error> {
    value.parse::<Language>().map_err(Error::Config)
}

/// `on` enables the microphone, `off` selects the scripted mode.
pub fn parse_micro(value: &str) -> Result<bool, Error> {
    match value.trim().to_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(Error::Config(format!(
            "micro must be 'on' or 'off', got: {}",
            other
        ))),
    }
}
