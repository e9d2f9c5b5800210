// File: followme-core/src/sim/speech.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use followme_common::Error;
use followme_common::models::Language;
use followme_common::traits::{ConnectionProbe, SpeechRecognizer, SpeechSynthesizer};

const INBOX_CAPACITY: usize = 64;

/// Text-to-speech stand-in: logs each utterance and reports it finished
/// after `per_char` for every character.
pub struct SimSynthesizer {
    per_char: Duration,
    speaking_until: Mutex<Instant>,
    voice: Mutex<Option<String>>,
    connected: AtomicBool,
}

impl SimSynthesizer {
    pub fn new(per_char: Duration) -> Self {
        Self {
            per_char,
            speaking_until: Mutex::new(Instant::now()),
            voice: Mutex::new(None),
            connected: AtomicBool::new(true),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpeechSynthesizer for SimSynthesizer {
    async fn set_language(&self, voice: &str) -> Result<bool, Error> {
        let known = [Language::English, Language::Spanish]
            .iter()
            .any(|l| l.voice() == voice);
        if !known {
            warn!("[TTS] unknown voice '{}'", voice);
            return Ok(false);
        }
        *self.voice.lock().await = Some(voice.to_string());
        info!("[TTS] voice set to {}", voice);
        Ok(true)
    }

    async fn say(&self, text: &str) -> Result<bool, Error> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(Error::NotConnected("tts".into()));
        }
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        *self.speaking_until.lock().await = Instant::now() + self.per_char * chars;
        info!("[TTS] {}", text);
        Ok(true)
    }

    async fn check_say_done(&self) -> Result<bool, Error> {
        Ok(Instant::now() >= *self.speaking_until.lock().await)
    }
}

#[async_trait]
impl ConnectionProbe for SimSynthesizer {
    fn port_name(&self) -> String {
        "/tts".to_string()
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Recognizer fed from outside (OSC, RPC `hear`). Text delivered while the
/// microphone is muted is discarded, like sound the robot would not hear.
pub struct InboxRecognizer {
    tx: mpsc::Sender<String>,
    rx: Mutex<mpsc::Receiver<String>>,
    muted: AtomicBool,
    connected: AtomicBool,
}

impl InboxRecognizer {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
        Self {
            tx,
            rx: Mutex::new(rx),
            muted: AtomicBool::new(false),
            connected: AtomicBool::new(true),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub async fn deliver(&self, text: &str) -> Result<(), Error> {
        if self.is_muted() {
            debug!("[ASR] microphone muted, dropping '{}'", text);
            return Ok(());
        }
        self.tx
            .try_send(text.to_lowercase())
            .map_err(|e| Error::Speech(format!("recognizer inbox: {}", e)))
    }
}

impl Default for InboxRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechRecognizer for InboxRecognizer {
    async fn set_dictionary(&self, dictionary: &str, language: &str) -> Result<(), Error> {
        info!("[ASR] dictionary '{}' ({})", dictionary, language);
        Ok(())
    }

    async fn set_mic(&self, muted: bool) -> Result<(), Error> {
        self.muted.store(muted, Ordering::SeqCst);
        Ok(())
    }

    async fn listen(&self) -> Result<String, Error> {
        let mut rx = self.rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| Error::Speech("recognizer inbox closed".into()))
    }

    async fn poll(&self) -> Result<Option<String>, Error> {
        let mut rx = self.rx.lock().await;
        match rx.try_recv() {
            Ok(text) => Ok(Some(text)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                Err(Error::Speech("recognizer inbox closed".into()))
            }
        }
    }
}

#[async_trait]
impl ConnectionProbe for InboxRecognizer {
    fn port_name(&self) -> String {
        "/asr".to_string()
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
