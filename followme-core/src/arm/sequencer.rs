// File: followme-core/src/arm/sequencer.rs
//! Tick-driven setpoint queue for both arms.
//!
//! A gesture request installs a list of setpoints; each `tick()` dispatches
//! the next one only when the previous motion has completed. The label, the
//! queue and the "new setpoints" flag always change together under one lock.
//! Hardware calls happen after the lock is released, so a slow arm never
//! blocks a concurrent `register_gesture`.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use followme_common::models::{GestureLabel, SetpointPair};
use followme_common::traits::JointGroup;
use crate::config::SequencerConfig;
use crate::eventbus::{EventBus, FollowMeEvent};
use crate::Error;

#[derive(Debug)]
struct SequencerState {
    label: GestureLabel,
    queue: VecDeque<SetpointPair>,
    has_new_setpoints: bool,
    last_dispatch: Option<Instant>,
}

/// Consistent copy of the sequencer state, taken under the lock.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerSnapshot {
    pub label: GestureLabel,
    pub queue: Vec<SetpointPair>,
    pub has_new_setpoints: bool,
}

pub struct SetpointSequencer {
    left: Arc<dyn JointGroup>,
    right: Arc<dyn JointGroup>,
    state: Mutex<SequencerState>,
    rearm_setpoints: Vec<SetpointPair>,
    config: SequencerConfig,
    event_bus: Arc<EventBus>,
}

impl SetpointSequencer {
    pub fn new(
        left: Arc<dyn JointGroup>,
        right: Arc<dyn JointGroup>,
        rearm_setpoints: Vec<SetpointPair>,
        config: SequencerConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            left,
            right,
            state: Mutex::new(SequencerState {
                label: GestureLabel::Rest,
                queue: VecDeque::new(),
                has_new_setpoints: false,
                last_dispatch: None,
            }),
            rearm_setpoints,
            config,
            event_bus,
        }
    }

    /// Puts both arms in position mode with the configured reference
    /// speed and acceleration. Any failure aborts startup.
    pub async fn initialize(&self) -> Result<(), Error> {
        for arm in [&self.left, &self.right] {
            arm.set_position_mode().await?;
            arm.set_ref_speeds(self.config.ref_speed).await?;
            arm.set_ref_accelerations(self.config.ref_acceleration).await?;
            info!("Arm '{}' ready in position mode.", arm.name());
        }
        Ok(())
    }

    /// Replaces whatever was queued with `setpoints` and marks them pending.
    pub async fn register_gesture(&self, label: GestureLabel, setpoints: Vec<SetpointPair>) {
        let count = setpoints.len();
        {
            let mut st = self.state.lock().await;
            st.label = label;
            st.queue = setpoints.into();
            st.has_new_setpoints = true;
        }
        debug!("Registered gesture {} with {} setpoints", label, count);
        self.event_bus
            .publish(FollowMeEvent::GestureRegistered { label, setpoints: count })
            .await;
    }

    pub async fn tick(&self) {
        let motion_done = self.query_motion_done().await;

        let mut rearmed = None;
        let dispatch = {
            let mut st = self.state.lock().await;
            let done = motion_done || self.motion_timed_out(&st);

            if st.has_new_setpoints || (done && !st.queue.is_empty()) {
                st.has_new_setpoints = false;
                match st.queue.pop_front() {
                    Some(sp) => {
                        st.last_dispatch = Some(Instant::now());
                        Some((sp, st.label, st.queue.len()))
                    }
                    None => None,
                }
            } else {
                if done && st.queue.is_empty() {
                    if st.label.rearms_swing() {
                        st.label = GestureLabel::Swing;
                        st.queue = self.rearm_setpoints.iter().copied().collect();
                        st.has_new_setpoints = true;
                        rearmed = Some(st.queue.len());
                    } else if st.label == GestureLabel::Homing {
                        st.label = GestureLabel::Rest;
                    }
                }
                None
            }
        };

        if let Some(count) = rearmed {
            debug!("Re-armed swing with {} setpoints", count);
            self.event_bus
                .publish(FollowMeEvent::GestureRegistered {
                    label: GestureLabel::Swing,
                    setpoints: count,
                })
                .await;
        }

        if let Some((sp, label, remaining)) = dispatch {
            self.dispatch(&sp).await;
            self.event_bus
                .publish(FollowMeEvent::SetpointDispatched { label, remaining })
                .await;
        }
    }

    /// Clears everything and hard-stops both arms. Safe to call repeatedly.
    pub async fn stop(&self) -> bool {
        {
            let mut st = self.state.lock().await;
            st.label = GestureLabel::Rest;
            st.queue.clear();
            st.has_new_setpoints = false;
            st.last_dispatch = None;
        }

        let mut ok = true;
        for arm in [&self.left, &self.right] {
            if let Err(e) = arm.stop().await {
                error!("Failed to stop arm '{}': {:?}", arm.name(), e);
                ok = false;
            }
        }
        ok
    }

    pub async fn snapshot(&self) -> SequencerSnapshot {
        let st = self.state.lock().await;
        SequencerSnapshot {
            label: st.label,
            queue: st.queue.iter().copied().collect(),
            has_new_setpoints: st.has_new_setpoints,
        }
    }

    pub async fn current_gesture(&self) -> GestureLabel {
        self.state.lock().await.label
    }

    async fn query_motion_done(&self) -> bool {
        let mut all_done = true;
        for arm in [&self.left, &self.right] {
            match arm.check_motion_done().await {
                Ok(done) => all_done &= done,
                Err(e) => {
                    warn!("Motion query failed on '{}', assuming done: {:?}", arm.name(), e);
                }
            }
        }
        all_done
    }

    fn motion_timed_out(&self, st: &SequencerState) -> bool {
        match (self.config.motion_timeout, st.last_dispatch) {
            (Some(limit), Some(at)) if at.elapsed() >= limit => {
                warn!("Motion not done after {:?}; treating it as done.", limit);
                true
            }
            _ => false,
        }
    }

    async fn dispatch(&self, sp: &SetpointPair) {
        if let Err(e) = self.left.position_move(&sp.left).await {
            error!("Left arm position move failed: {:?}", e);
        }
        if let Err(e) = self.right.position_move(&sp.right).await {
            error!("Right arm position move failed: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::arm::GestureLibrary;
    use crate::test_utils::{JointCommand, RecordingJointGroup};

    fn sp(v: f64) -> SetpointPair {
        SetpointPair::new([v; 6], [-v; 6])
    }

    fn setup(config: SequencerConfig) -> (Arc<RecordingJointGroup>, Arc<RecordingJointGroup>, SetpointSequencer) {
        let left = Arc::new(RecordingJointGroup::new("left", 6));
        let right = Arc::new(RecordingJointGroup::new("right", 6));
        let seq = SetpointSequencer::new(
            left.clone(),
            right.clone(),
            GestureLibrary.swing(),
            config,
            Arc::new(EventBus::new()),
        );
        (left, right, seq)
    }

    #[tokio::test]
    async fn test_initialize_applies_reference_values() {
        let (left, right, seq) = setup(SequencerConfig::default());
        seq.initialize().await.unwrap();

        for arm in [&left, &right] {
            assert_eq!(
                arm.commands().await,
                vec![
                    JointCommand::PositionMode,
                    JointCommand::RefSpeeds(30.0),
                    JointCommand::RefAccelerations(30.0),
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_initialize_failure_is_returned() {
        let (left, _right, seq) = setup(SequencerConfig::default());
        left.set_fail_commands(true);
        assert!(seq.initialize().await.is_err());
    }

    #[tokio::test]
    async fn test_one_dispatch_per_completed_motion_in_order() {
        let (left, right, seq) = setup(SequencerConfig::default());
        seq.register_gesture(GestureLabel::Greet, vec![sp(1.0), sp(2.0), sp(3.0)]).await;

        // First setpoint goes out even though the arms are still moving.
        left.set_motion_done(false);
        seq.tick().await;
        seq.tick().await;
        assert_eq!(left.position_moves().await, vec![vec![1.0; 6]]);

        left.set_motion_done(true);
        seq.tick().await;
        seq.tick().await;
        assert_eq!(
            left.position_moves().await,
            vec![vec![1.0; 6], vec![2.0; 6], vec![3.0; 6]]
        );
        assert_eq!(right.position_moves().await[2], vec![-3.0; 6]);
    }

    #[tokio::test]
    async fn test_drained_gesture_rearms_swing() {
        let (_left, _right, seq) = setup(SequencerConfig::default());
        seq.register_gesture(GestureLabel::SignalLeft, vec![sp(1.0)]).await;
        seq.tick().await;
        seq.tick().await;

        let snap = seq.snapshot().await;
        assert_eq!(snap.label, GestureLabel::Swing);
        assert_eq!(snap.queue, GestureLibrary.swing());
        assert!(snap.has_new_setpoints);
    }

    #[tokio::test]
    async fn test_homing_is_terminal() {
        let (left, _right, seq) = setup(SequencerConfig::default());
        seq.register_gesture(GestureLabel::Homing, vec![sp(0.0)]).await;
        seq.tick().await;
        seq.tick().await;
        assert_eq!(seq.current_gesture().await, GestureLabel::Rest);

        for _ in 0..5 {
            seq.tick().await;
        }
        assert_eq!(left.position_moves().await.len(), 1);
        assert_eq!(seq.current_gesture().await, GestureLabel::Rest);
    }

    #[tokio::test]
    async fn test_stop_clears_queue_and_is_idempotent() {
        let (left, right, seq) = setup(SequencerConfig::default());
        seq.register_gesture(GestureLabel::Swing, GestureLibrary.swing()).await;
        seq.tick().await;

        assert!(seq.stop().await);
        assert!(seq.stop().await);
        let snap = seq.snapshot().await;
        assert_eq!(snap.label, GestureLabel::Rest);
        assert!(snap.queue.is_empty());
        assert!(!snap.has_new_setpoints);

        right.set_fail_commands(true);
        assert!(!seq.stop().await);
        assert!(left.commands().await.contains(&JointCommand::Stop));
    }

    #[tokio::test]
    async fn test_failed_motion_query_counts_as_done() {
        let (left, _right, seq) = setup(SequencerConfig::default());
        left.set_motion_done(false);
        left.set_fail_motion_query(true);
        seq.register_gesture(GestureLabel::Greet, vec![sp(1.0), sp(2.0)]).await;
        seq.tick().await;
        seq.tick().await;
        assert_eq!(left.position_moves().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_dispatch_is_not_fatal() {
        let (left, _right, seq) = setup(SequencerConfig::default());
        seq.register_gesture(GestureLabel::Greet, vec![sp(1.0), sp(2.0)]).await;
        left.set_fail_commands(true);
        seq.tick().await;
        seq.tick().await;
        assert!(seq.snapshot().await.queue.is_empty());
    }

    #[tokio::test]
    async fn test_motion_timeout_unblocks_a_stuck_arm() {
        let (left, _right, seq) = setup(SequencerConfig {
            motion_timeout: Some(Duration::from_millis(20)),
            ..SequencerConfig::default()
        });
        left.set_motion_done(false);
        seq.register_gesture(GestureLabel::Greet, vec![sp(1.0), sp(2.0)]).await;
        seq.tick().await;
        seq.tick().await;
        assert_eq!(left.position_moves().await.len(), 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        seq.tick().await;
        assert_eq!(left.position_moves().await.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_register_and_tick_never_tears_state() {
        let (_left, _right, seq) = setup(SequencerConfig::default());
        let seq = Arc::new(seq);

        let writer = {
            let seq = seq.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    let label = if i % 2 == 0 { GestureLabel::Greet } else { GestureLabel::Homing };
                    let n = if label == GestureLabel::Greet { 3 } else { 1 };
                    seq.register_gesture(label, vec![sp(i as f64); n]).await;
                    tokio::task::yield_now().await;
                }
            })
        };
        let ticker = {
            let seq = seq.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    seq.tick().await;
                    let snap = seq.snapshot().await;
                    match snap.label {
                        GestureLabel::Greet => assert!(snap.queue.len() <= 3),
                        GestureLabel::Homing => assert!(snap.queue.len() <= 1),
                        GestureLabel::Swing => assert!(snap.queue.len() <= 2),
                        GestureLabel::Rest => assert!(snap.queue.is_empty()),
                        other => panic!("unexpected label {:?}", other),
                    }
                    tokio::task::yield_now().await;
                }
            })
        };
        writer.await.unwrap();
        ticker.await.unwrap();
    }
}
