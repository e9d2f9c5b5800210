// File: followme-core/src/command/service.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use async_trait::async_trait;
use tracing::info;

use followme_common::Error;
use followme_common::models::FollowMeStatus;
use followme_common::traits::{ArmApi, HeadApi, SpeechInputApi, StatusApi};
use crate::arm::ArmExecution;
use crate::dialogue::ConversationStateMachine;
use crate::head::HeadTracker;
use crate::sim::InboxRecognizer;

/// Everything a remote caller may do, delegated to the components that own
/// the behavior. Holds no state of its own.
pub struct FollowMeService {
    arms: Arc<ArmExecution>,
    head: Arc<HeadTracker>,
    recognizer: Arc<InboxRecognizer>,
    dialogue: Arc<ConversationStateMachine>,
    dialogue_running: Arc<AtomicBool>,
}

impl FollowMeService {
    pub fn new(
        arms: Arc<ArmExecution>,
        head: Arc<HeadTracker>,
        recognizer: Arc<InboxRecognizer>,
        dialogue: Arc<ConversationStateMachine>,
        dialogue_running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            arms,
            head,
            recognizer,
            dialogue,
            dialogue_running,
        }
    }
}

#[async_trait]
impl ArmApi for FollowMeService {
    async fn do_greet(&self) {
        self.arms.do_greet().await;
    }

    async fn do_signal_left(&self) {
        self.arms.do_signal_left().await;
    }

    async fn do_signal_right(&self) {
        self.arms.do_signal_right().await;
    }

    async fn enable_arm_swinging(&self) {
        self.arms.enable_arm_swinging().await;
    }

    async fn disable_arm_swinging(&self) {
        self.arms.disable_arm_swinging().await;
    }

    async fn stop_arms(&self) -> bool {
        self.arms.stop_arms().await
    }
}

#[async_trait]
impl HeadApi for FollowMeService {
    async fn enable_following(&self) {
        self.head.enable_following().await;
    }

    async fn disable_following(&self) {
        self.head.disable_following().await;
    }

    async fn get_orientation_angle(&self) -> f64 {
        self.head.orientation_angle().await
    }

    async fn stop_head(&self) -> bool {
        self.head.stop().await
    }
}

#[async_trait]
impl SpeechInputApi for FollowMeService {
    async fn deliver_speech(&self, text: &str) -> Result<(), Error> {
        info!("Inbound speech: '{}'", text);
        self.recognizer.deliver(text).await
    }
}

#[async_trait]
impl StatusApi for FollowMeService {
    async fn status(&self) -> FollowMeStatus {
        let snap = self.arms.sequencer().snapshot().await;
        FollowMeStatus {
            conversation: self.dialogue.state().await,
            following: self.dialogue.is_following().await,
            gesture: snap.label,
            pending_setpoints: snap.queue.len(),
            head_following: self.head.is_following(),
            dialogue_running: self.dialogue_running.load(Ordering::SeqCst),
        }
    }
}
