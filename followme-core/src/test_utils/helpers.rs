// File: followme-core/src/test_utils/helpers.rs
//! Recording doubles for the collaborator traits. Each one keeps a log of
//! what it was asked to do and can be told to fail.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use async_trait::async_trait;
use tokio::sync::Mutex;

use followme_common::Error;
use followme_common::traits::{ArmApi, ConnectionProbe, HeadApi, JointGroup, SpeechSynthesizer};

#[derive(Debug, Clone, PartialEq)]
pub enum JointCommand {
    PositionMode,
    RefSpeeds(f64),
    RefAccelerations(f64),
    PositionMove(Vec<f64>),
    RelativeMove(Vec<f64>),
    Stop,
}

pub struct RecordingJointGroup {
    name: String,
    axes: usize,
    commands: Mutex<Vec<JointCommand>>,
    encoder: Mutex<f64>,
    motion_done: AtomicBool,
    fail_motion_query: AtomicBool,
    fail_commands: AtomicBool,
    fail_encoder: AtomicBool,
    connected: AtomicBool,
}

impl RecordingJointGroup {
    pub fn new(name: &str, axes: usize) -> Self {
        Self {
            name: name.to_string(),
            axes,
            commands: Mutex::new(Vec::new()),
            encoder: Mutex::new(0.0),
            motion_done: AtomicBool::new(true),
            fail_motion_query: AtomicBool::new(false),
            fail_commands: AtomicBool::new(false),
            fail_encoder: AtomicBool::new(false),
            connected: AtomicBool::new(true),
        }
    }

    pub fn set_motion_done(&self, done: bool) {
        self.motion_done.store(done, Ordering::SeqCst);
    }

    pub fn set_fail_motion_query(&self, fail: bool) {
        self.fail_motion_query.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_encoder(&self, fail: bool) {
        self.fail_encoder.store(fail, Ordering::SeqCst);
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub async fn set_encoder(&self, value: f64) {
        *self.encoder.lock().await = value;
    }

    pub async fn commands(&self) -> Vec<JointCommand> {
        self.commands.lock().await.clone()
    }

    pub async fn position_moves(&self) -> Vec<Vec<f64>> {
        self.commands
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                JointCommand::PositionMove(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn relative_moves(&self) -> Vec<Vec<f64>> {
        self.commands
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                JointCommand::RelativeMove(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, cmd: JointCommand) -> Result<(), Error> {
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(Error::Device(format!("{} rejected {:?}", self.name, cmd)));
        }
        self.commands.lock().await.push(cmd);
        Ok(())
    }
}

#[async_trait]
impl JointGroup for RecordingJointGroup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_position_mode(&self) -> Result<(), Error> {
        self.record(JointCommand::PositionMode).await
    }

    async fn set_ref_speeds(&self, speed: f64) -> Result<(), Error> {
        self.record(JointCommand::RefSpeeds(speed)).await
    }

    async fn set_ref_accelerations(&self, acceleration: f64) -> Result<(), Error> {
        self.record(JointCommand::RefAccelerations(acceleration)).await
    }

    async fn position_move(&self, targets: &[f64]) -> Result<(), Error> {
        self.record(JointCommand::PositionMove(targets.to_vec())).await
    }

    async fn relative_move(&self, deltas: &[f64]) -> Result<(), Error> {
        self.record(JointCommand::RelativeMove(deltas.to_vec())).await
    }

    async fn check_motion_done(&self) -> Result<bool, Error> {
        if self.fail_motion_query.load(Ordering::SeqCst) {
            return Err(Error::Device(format!("{} motion query failed", self.name)));
        }
        Ok(self.motion_done.load(Ordering::SeqCst))
    }

    async fn stop(&self) -> Result<(), Error> {
        self.record(JointCommand::Stop).await
    }

    async fn encoder(&self, axis: usize) -> Result<f64, Error> {
        if self.fail_encoder.load(Ordering::SeqCst) || axis >= self.axes {
            return Err(Error::Device(format!("{} encoder {} unavailable", self.name, axis)));
        }
        Ok(*self.encoder.lock().await)
    }
}

#[async_trait]
impl ConnectionProbe for RecordingJointGroup {
    fn port_name(&self) -> String {
        format!("/{}", self.name)
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Synthesizer that finishes every utterance immediately.
pub struct RecordingSynthesizer {
    said: Mutex<Vec<String>>,
    voice: Mutex<Option<String>>,
    fail_language: AtomicBool,
    connected: AtomicBool,
}

impl RecordingSynthesizer {
    pub fn new() -> Self {
        Self {
            said: Mutex::new(Vec::new()),
            voice: Mutex::new(None),
            fail_language: AtomicBool::new(false),
            connected: AtomicBool::new(true),
        }
    }

    pub fn set_fail_language(&self, fail: bool) {
        self.fail_language.store(fail, Ordering::SeqCst);
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub async fn said(&self) -> Vec<String> {
        self.said.lock().await.clone()
    }

    pub async fn voice(&self) -> Option<String> {
        self.voice.lock().await.clone()
    }
}

impl Default for RecordingSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn set_language(&self, voice: &str) -> Result<bool, Error> {
        if self.fail_language.load(Ordering::SeqCst) {
            return Ok(false);
        }
        *self.voice.lock().await = Some(voice.to_string());
        Ok(true)
    }

    async fn say(&self, text: &str) -> Result<bool, Error> {
        self.said.lock().await.push(text.to_string());
        Ok(true)
    }

    async fn check_say_done(&self) -> Result<bool, Error> {
        Ok(true)
    }
}

#[async_trait]
impl ConnectionProbe for RecordingSynthesizer {
    fn port_name(&self) -> String {
        "/tts".to_string()
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Arm double that only logs which request arrived.
#[derive(Default)]
pub struct RecordingArm {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingArm {
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn log(&self, call: &str) {
        self.calls.lock().await.push(call.to_string());
    }
}

#[async_trait]
impl ArmApi for RecordingArm {
    async fn do_greet(&self) {
        self.log("greet").await;
    }

    async fn do_signal_left(&self) {
        self.log("signal_left").await;
    }

    async fn do_signal_right(&self) {
        self.log("signal_right").await;
    }

    async fn enable_arm_swinging(&self) {
        self.log("swing").await;
    }

    async fn disable_arm_swinging(&self) {
        self.log("homing").await;
    }

    async fn stop_arms(&self) -> bool {
        self.log("stop").await;
        true
    }
}

/// Head double with a settable orientation angle.
#[derive(Default)]
pub struct RecordingHead {
    pub calls: Arc<Mutex<Vec<String>>>,
    angle: Mutex<f64>,
    following: AtomicBool,
}

impl RecordingHead {
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn set_angle(&self, angle: f64) {
        *self.angle.lock().await = angle;
    }

    pub fn is_following(&self) -> bool {
        self.following.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HeadApi for RecordingHead {
    async fn enable_following(&self) {
        self.following.store(true, Ordering::SeqCst);
        self.calls.lock().await.push("enable_following".to_string());
    }

    async fn disable_following(&self) {
        self.following.store(false, Ordering::SeqCst);
        self.calls.lock().await.push("disable_following".to_string());
    }

    async fn get_orientation_angle(&self) -> f64 {
        *self.angle.lock().await
    }

    async fn stop_head(&self) -> bool {
        self.following.store(false, Ordering::SeqCst);
        self.calls.lock().await.push("stop".to_string());
        true
    }
}
