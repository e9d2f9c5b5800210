pub mod api;
pub mod device_traits;
pub mod speech_traits;

pub use api::{ArmApi, FollowMeApi, HeadApi, SpeechInputApi, StatusApi};
pub use device_traits::{ConnectionProbe, JointGroup};
pub use speech_traits::{SpeechRecognizer, SpeechSynthesizer};
