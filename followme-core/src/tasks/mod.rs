pub mod sequencer_tick;
pub mod supervisor;

pub use sequencer_tick::spawn_sequencer_task;
pub use supervisor::{required_collaborators, spawn_supervisor_task, DialogueSupervisor};
