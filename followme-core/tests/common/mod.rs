// tests/common/mod.rs
#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use followme_common::traits::ConnectionProbe;
use followme_core::arm::{ArmExecution, GestureLibrary, SetpointSequencer};
use followme_core::command::FollowMeService;
use followme_core::config::{
    DialogueConfig, HeadTrackingConfig, SequencerConfig, SupervisorConfig,
};
use followme_core::dialogue::ConversationStateMachine;
use followme_core::eventbus::EventBus;
use followme_core::head::HeadTracker;
use followme_core::sim::InboxRecognizer;
use followme_core::tasks::{required_collaborators, DialogueSupervisor};
use followme_core::test_utils::{RecordingJointGroup, RecordingSynthesizer};

/// Every component wired together over recording doubles.
pub struct Stack {
    pub left: Arc<RecordingJointGroup>,
    pub right: Arc<RecordingJointGroup>,
    pub head_joints: Arc<RecordingJointGroup>,
    pub tts: Arc<RecordingSynthesizer>,
    pub asr: Arc<InboxRecognizer>,
    pub bus: Arc<EventBus>,
    pub sequencer: Arc<SetpointSequencer>,
    pub arms: Arc<ArmExecution>,
    pub head: Arc<HeadTracker>,
    pub dialogue: Arc<ConversationStateMachine>,
    pub supervisor: Arc<DialogueSupervisor>,
    pub service: Arc<FollowMeService>,
}

pub fn fast_dialogue_config() -> DialogueConfig {
    DialogueConfig {
        signal_delay: Duration::ZERO,
        settle_delay: Duration::ZERO,
        say_poll_interval: Duration::from_millis(1),
        listen_poll_interval: Duration::from_millis(2),
        ..DialogueConfig::default()
    }
}

pub fn build_stack(dialogue_config: DialogueConfig) -> Stack {
    let left = Arc::new(RecordingJointGroup::new("leftArm", 6));
    let right = Arc::new(RecordingJointGroup::new("rightArm", 6));
    let head_joints = Arc::new(RecordingJointGroup::new("head", 2));
    let tts = Arc::new(RecordingSynthesizer::new());
    let asr = Arc::new(InboxRecognizer::new());
    let bus = Arc::new(EventBus::new());

    let sequencer = Arc::new(SetpointSequencer::new(
        left.clone(),
        right.clone(),
        GestureLibrary.swing(),
        SequencerConfig::default(),
        bus.clone(),
    ));
    let arms = Arc::new(ArmExecution::new(sequencer.clone()));
    let head = Arc::new(HeadTracker::new(head_joints.clone(), HeadTrackingConfig::default()));

    let micro = dialogue_config.micro;
    let dialogue = Arc::new(ConversationStateMachine::new(
        arms.clone(),
        head.clone(),
        tts.clone(),
        asr.clone(),
        dialogue_config,
        bus.clone(),
    ));

    let devices: Vec<Arc<dyn ConnectionProbe>> = vec![
        left.clone(),
        right.clone(),
        head_joints.clone(),
        tts.clone(),
    ];
    let probes = required_collaborators(devices, asr.clone(), micro);
    let supervisor = Arc::new(DialogueSupervisor::new(
        dialogue.clone(),
        probes,
        SupervisorConfig {
            period: Duration::from_millis(10),
            report_interval: Duration::from_secs(2),
        },
        bus.clone(),
    ));

    let service = Arc::new(FollowMeService::new(
        arms.clone(),
        head.clone(),
        asr.clone(),
        dialogue.clone(),
        supervisor.running_flag(),
    ));

    Stack {
        left,
        right,
        head_joints,
        tts,
        asr,
        bus,
        sequencer,
        arms,
        head,
        dialogue,
        supervisor,
        service,
    }
}

/// Polls `check` every few milliseconds for up to two seconds.
pub async fn wait_until<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
