pub mod gestures;
pub mod sequencer;
pub mod execution;

pub use gestures::GestureLibrary;
pub use sequencer::{SequencerSnapshot, SetpointSequencer};
pub use execution::ArmExecution;
