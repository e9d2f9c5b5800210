//! followme-server/src/context.rs
//!
//! Builds every component of the server and wires them together.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use followme_common::traits::ConnectionProbe;
use followme_core::arm::{ArmExecution, GestureLibrary, SetpointSequencer};
use followme_core::command::FollowMeService;
use followme_core::config::FollowMeConfig;
use followme_core::dialogue::ConversationStateMachine;
use followme_core::eventbus::EventBus;
use followme_core::head::HeadTracker;
use followme_core::sim::{InboxRecognizer, SimJointGroup, SimSynthesizer};
use followme_core::tasks::{required_collaborators, DialogueSupervisor};
use followme_core::Error;

use crate::Args;

const ARM_AXES: usize = 6;
const HEAD_AXES: usize = 2;

pub struct ServerContext {
    pub config: FollowMeConfig,
    pub event_bus: Arc<EventBus>,
    pub sequencer: Arc<SetpointSequencer>,
    pub head: Arc<HeadTracker>,
    pub recognizer: Arc<InboxRecognizer>,
    pub supervisor: Arc<DialogueSupervisor>,
    pub service: Arc<FollowMeService>,
}

/// Turns command-line flags into a validated configuration.
pub fn config_from_args(args: &Args) -> Result<FollowMeConfig, Error> {
    let mut cfg = FollowMeConfig::from_language_and_micro(&args.language, &args.micro)?;
    cfg.network.rpc_addr = args.rpc_addr.parse::<SocketAddr>()?;
    cfg.network.osc_addr = args.osc_addr.parse::<SocketAddr>()?;
    cfg.sequencer.tick_period = Duration::from_millis(args.tick_ms.max(1));
    cfg.sequencer.motion_timeout = args.motion_timeout_ms.map(Duration::from_millis);
    cfg.supervisor.period = Duration::from_millis(args.supervisor_ms.max(1));
    cfg.head.deadband = args.deadband;
    cfg.head.increment = args.increment;
    Ok(cfg)
}

impl ServerContext {
    pub async fn new(args: &Args) -> Result<Self, Error> {
        let config = config_from_args(args)?;
        let event_bus = Arc::new(EventBus::new());

        let left_arm = Arc::new(SimJointGroup::new("leftArm", ARM_AXES, args.sim_time_scale));
        let right_arm = Arc::new(SimJointGroup::new("rightArm", ARM_AXES, args.sim_time_scale));
        let head_joints = Arc::new(SimJointGroup::new("head", HEAD_AXES, args.sim_time_scale));
        let tts = Arc::new(SimSynthesizer::new(Duration::from_millis(args.tts_char_ms)));
        let recognizer = Arc::new(InboxRecognizer::new());

        let sequencer = Arc::new(SetpointSequencer::new(
            left_arm.clone(),
            right_arm.clone(),
            GestureLibrary.swing(),
            config.sequencer.clone(),
            event_bus.clone(),
        ));
        sequencer.initialize().await?;
        let arms = Arc::new(ArmExecution::new(sequencer.clone()));

        let head = Arc::new(HeadTracker::new(head_joints.clone(), config.head.clone()));
        head.initialize().await?;

        let dialogue = Arc::new(ConversationStateMachine::new(
            arms.clone(),
            head.clone(),
            tts.clone(),
            recognizer.clone(),
            config.dialogue.clone(),
            event_bus.clone(),
        ));
        dialogue.configure_speech().await?;

        let devices: Vec<Arc<dyn ConnectionProbe>> = vec![left_arm, right_arm, head_joints, tts];
        let probes = required_collaborators(devices, recognizer.clone(), config.dialogue.micro);
        let supervisor = Arc::new(DialogueSupervisor::new(
            dialogue.clone(),
            probes,
            config.supervisor.clone(),
            event_bus.clone(),
        ));

        let service = Arc::new(FollowMeService::new(
            arms,
            head.clone(),
            recognizer.clone(),
            dialogue,
            supervisor.running_flag(),
        ));

        info!("Server context ready ({} dialogue).", config.dialogue.language);
        Ok(Self {
            config,
            event_bus,
            sequencer,
            head,
            recognizer,
            supervisor,
            service,
        })
    }
}
