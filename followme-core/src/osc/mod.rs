pub mod runtime;

pub use runtime::{encode_message, FollowMeOscRuntime, CV_ADDR, SPEECH_ADDR};
