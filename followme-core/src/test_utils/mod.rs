pub mod helpers;

pub use helpers::{
    JointCommand, RecordingArm, RecordingHead, RecordingJointGroup, RecordingSynthesizer,
};
