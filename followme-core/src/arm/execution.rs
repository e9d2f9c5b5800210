// File: followme-core/src/arm/execution.rs

use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;

use followme_common::models::GestureLabel;
use followme_common::traits::ArmApi;
use crate::arm::{GestureLibrary, SetpointSequencer};

/// Turns named gesture requests into sequencer registrations.
pub struct ArmExecution {
    sequencer: Arc<SetpointSequencer>,
    library: GestureLibrary,
}

impl ArmExecution {
    pub fn new(sequencer: Arc<SetpointSequencer>) -> Self {
        Self {
            sequencer,
            library: GestureLibrary,
        }
    }

    pub fn sequencer(&self) -> &Arc<SetpointSequencer> {
        &self.sequencer
    }

    async fn request(&self, label: GestureLabel) {
        info!("Arm gesture requested: {}", label);
        self.sequencer
            .register_gesture(label, self.library.setpoints(label))
            .await;
    }
}

#[async_trait]
impl ArmApi for ArmExecution {
    async fn do_greet(&self) {
        self.request(GestureLabel::Greet).await;
    }

    async fn do_signal_left(&self) {
        self.request(GestureLabel::SignalLeft).await;
    }

    async fn do_signal_right(&self) {
        self.request(GestureLabel::SignalRight).await;
    }

    async fn enable_arm_swinging(&self) {
        self.request(GestureLabel::Swing).await;
    }

    async fn disable_arm_swinging(&self) {
        self.request(GestureLabel::Homing).await;
    }

    async fn stop_arms(&self) -> bool {
        info!("Stopping both arms.");
        self.sequencer.stop().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SequencerConfig;
    use crate::eventbus::EventBus;
    use crate::test_utils::RecordingJointGroup;

    #[tokio::test]
    async fn test_requests_install_library_setpoints() {
        let left = Arc::new(RecordingJointGroup::new("left", 6));
        let right = Arc::new(RecordingJointGroup::new("right", 6));
        let seq = Arc::new(SetpointSequencer::new(
            left,
            right,
            GestureLibrary.swing(),
            SequencerConfig::default(),
            Arc::new(EventBus::new()),
        ));
        let arms = ArmExecution::new(seq.clone());

        arms.do_signal_right().await;
        let snap = seq.snapshot().await;
        assert_eq!(snap.label, GestureLabel::SignalRight);
        assert_eq!(snap.queue, GestureLibrary.setpoints(GestureLabel::SignalRight));

        arms.disable_arm_swinging().await;
        assert_eq!(seq.current_gesture().await, GestureLabel::Homing);

        assert!(arms.stop_arms().await);
        assert_eq!(seq.current_gesture().await, GestureLabel::Rest);
    }
}
