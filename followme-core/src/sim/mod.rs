//! Simulated collaborators so the server runs end to end without hardware.

pub mod joints;
pub mod speech;

pub use joints::SimJointGroup;
pub use speech::{InboxRecognizer, SimSynthesizer};
