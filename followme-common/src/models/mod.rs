// File: followme-common/src/models/mod.rs
pub mod gesture;
pub mod conversation;
pub mod vocabulary;
pub mod vocab;
pub mod tracking;
pub mod status;

pub use gesture::{ArmSetpoint, GestureLabel, SetpointPair, ARM_JOINTS};
pub use conversation::{AnswerCycle, ConversationState};
pub use vocabulary::{Language, SentenceId, VoiceCommand, Vocabulary};
pub use vocab::Vocab;
pub use tracking::{PersonSide, TargetOffset, WaveThresholds};
pub use status::FollowMeStatus;
