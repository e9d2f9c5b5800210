// File: followme-common/src/traits/speech_traits.rs

use async_trait::async_trait;
use crate::error::Error;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn set_language(&self, voice: &str) -> Result<bool, Error>;
    /// Queues `text`; `Ok(false)` means the engine refused it.
    async fn say(&self, text: &str) -> Result<bool, Error>;
    async fn check_say_done(&self) -> Result<bool, Error>;
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn set_dictionary(&self, dictionary: &str, language: &str) -> Result<(), Error>;
    /// Muting keeps the robot from hearing its own voice.
    async fn set_mic(&self, muted: bool) -> Result<(), Error>;
    /// Waits for the next utterance.
    async fn listen(&self) -> Result<String, Error>;
    /// Returns the next utterance if one is already available.
    async fn poll(&self) -> Result<Option<String>, Error>;
}
