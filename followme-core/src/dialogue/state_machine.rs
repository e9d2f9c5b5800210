// File: followme-core/src/dialogue/state_machine.rs
//! Conversation driver for the follow-me demo.
//!
//! One `step()` runs the entry action of the current state, listens when the
//! state needs input and moves to the next state. The transition itself is
//! the pure [`transition`] function; everything with side effects (speech,
//! gestures, head following) lives in the step.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use followme_common::models::{
    AnswerCycle, ConversationState, PersonSide, SentenceId, VoiceCommand, Vocabulary,
};
use followme_common::models::vocabulary::DICTIONARY;
use followme_common::traits::{ArmApi, HeadApi, SpeechRecognizer, SpeechSynthesizer};
use crate::config::DialogueConfig;
use crate::eventbus::{shutdown_requested, EventBus, FollowMeEvent};
use crate::Error;

/// Next state after `state` given what was heard (empty when nothing was).
/// Commands match as substrings; the first match in table order wins.
pub fn transition(state: ConversationState, heard: &str, vocab: &Vocabulary) -> ConversationState {
    use ConversationState::*;

    match state {
        Presentation => Listen,
        AskName => Dialogue,
        Follow => AskName,
        StopFollowing => Listen,
        Dialogue => {
            if vocab.matches(heard, VoiceCommand::StopFollowing) {
                StopFollowing
            } else if vocab.matches(heard, VoiceCommand::MyNameIs) {
                Listen
            } else {
                AskName
            }
        }
        Listen => {
            if vocab.matches(heard, VoiceCommand::HiTeo) {
                Presentation
            } else if vocab.matches(heard, VoiceCommand::FollowMe) {
                Follow
            } else if vocab.matches(heard, VoiceCommand::StopFollowing) {
                StopFollowing
            } else {
                Listen
            }
        }
    }
}

#[derive(Debug, Default)]
struct DialogueState {
    state: ConversationState,
    following: bool,
    answer: AnswerCycle,
    introduced: bool,
}

pub struct ConversationStateMachine {
    vocabulary: Vocabulary,
    arm: Arc<dyn ArmApi>,
    head: Arc<dyn HeadApi>,
    tts: Arc<dyn SpeechSynthesizer>,
    asr: Arc<dyn SpeechRecognizer>,
    config: DialogueConfig,
    inner: Mutex<DialogueState>,
    event_bus: Arc<EventBus>,
}

impl ConversationStateMachine {
    pub fn new(
        arm: Arc<dyn ArmApi>,
        head: Arc<dyn HeadApi>,
        tts: Arc<dyn SpeechSynthesizer>,
        asr: Arc<dyn SpeechRecognizer>,
        config: DialogueConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            vocabulary: Vocabulary::new(config.language),
            arm,
            head,
            tts,
            asr,
            config,
            inner: Mutex::new(DialogueState::default()),
            event_bus,
        }
    }

    /// Starts the conversation somewhere other than LISTEN.
    pub fn starting_in(mut self, state: ConversationState) -> Self {
        self.inner.get_mut().state = state;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub async fn state(&self) -> ConversationState {
        self.inner.lock().await.state
    }

    pub async fn is_following(&self) -> bool {
        self.inner.lock().await.following
    }

    pub async fn answer_cycle(&self) -> AnswerCycle {
        self.inner.lock().await.answer
    }

    /// Selects the TTS voice and, with a microphone, the recognizer
    /// dictionary. Run once before the first `run`; a voice the synthesizer
    /// refuses is fatal.
    pub async fn configure_speech(&self) -> Result<(), Error> {
        let language = self.vocabulary.language();
        let voice = language.voice();
        if !self.tts.set_language(voice).await? {
            return Err(Error::Config(format!(
                "speech synthesizer refused voice '{}' for {}",
                voice, language
            )));
        }
        if !self.config.micro {
            info!("Speech configured: voice={}, no microphone", voice);
            return Ok(());
        }
        self.asr
            .set_dictionary(DICTIONARY, &language.to_string())
            .await?;
        info!("Speech configured: voice={}, dictionary={}", voice, DICTIONARY);
        Ok(())
    }

    /// Drives the conversation until `shutdown_rx` turns true.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        let script = async {
            // A previous run may have been aborted while the microphone was muted.
            self.set_mic(false).await;
            self.introduce().await;
            if !self.config.micro {
                self.run_without_microphone().await;
                return;
            }
            loop {
                self.step().await;
            }
        };

        tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown_rx) => {
                info!("Dialogue stopping on shutdown.");
            }
            _ = script => {}
        }
    }

    /// Runs one state: its entry action, then its transition.
    pub async fn step(&self) {
        let (state, following) = {
            let guard = self.inner.lock().await;
            (guard.state, guard.following)
        };

        match state {
            ConversationState::Presentation => {
                self.say_and_wait(SentenceId::Presentation2).await;
                self.say_and_wait(SentenceId::Presentation3).await;
                self.set_state(transition(state, "", &self.vocabulary)).await;
            }
            ConversationState::AskName => {
                self.arm.do_greet().await;
                self.say_and_wait(SentenceId::AskName).await;
                self.set_state(transition(state, "", &self.vocabulary)).await;
            }
            ConversationState::Dialogue => {
                let heard = self.listen().await.unwrap_or_default();
                let next = transition(state, &heard, &self.vocabulary);
                self.set_state(next).await;
                match next {
                    ConversationState::Listen => {
                        let reply = self.inner.lock().await.answer.advance();
                        self.say_and_wait(reply).await;
                    }
                    ConversationState::AskName => {
                        self.say_and_wait(SentenceId::NotUnderstand).await;
                    }
                    _ => {}
                }
            }
            ConversationState::Listen => {
                let heard = if following {
                    Some(self.listen_with_periodic_wave().await)
                } else {
                    self.listen().await
                };
                let next = transition(state, &heard.unwrap_or_default(), &self.vocabulary);
                if next != state {
                    self.set_state(next).await;
                }
            }
            ConversationState::Follow => {
                self.head.enable_following().await;
                self.say_and_wait(SentenceId::OkFollow).await;
                self.inner.lock().await.following = true;
                self.set_state(transition(state, "", &self.vocabulary)).await;
            }
            ConversationState::StopFollowing => {
                self.arm.disable_arm_swinging().await;
                self.head.disable_following().await;
                self.say_and_wait(SentenceId::StopFollow).await;
                self.inner.lock().await.following = false;
                self.set_state(transition(state, "", &self.vocabulary)).await;
            }
        }
    }

    /// Scripted demo for setups without a microphone: follow, greet and
    /// keep announcing where the person stands.
    pub async fn run_without_microphone(&self) {
        info!("Running without microphone.");
        self.head.enable_following().await;
        self.arm.do_greet().await;
        self.say_and_wait(SentenceId::OkFollow).await;
        self.inner.lock().await.following = true;

        let mut last_side = None;
        loop {
            self.watch_person_side(&mut last_side).await;
            sleep(self.config.listen_poll_interval).await;
        }
    }

    /// Waits for one utterance. `None` when the recognizer failed, after one
    /// poll interval so a broken link is not retried in a tight loop.
    pub async fn listen(&self) -> Option<String> {
        match self.asr.listen().await {
            Ok(text) => {
                self.heard(&text).await;
                Some(text)
            }
            Err(e) => {
                warn!("Speech recognizer listen failed: {:?}", e);
                sleep(self.config.listen_poll_interval).await;
                None
            }
        }
    }

    /// Polls the recognizer and, between polls, signals and announces when
    /// the person crosses to another side of the robot.
    pub async fn listen_with_periodic_wave(&self) -> String {
        let mut last_side = None;
        loop {
            match self.asr.poll().await {
                Ok(Some(text)) => {
                    self.heard(&text).await;
                    return text;
                }
                Ok(None) => {}
                Err(e) => warn!("Speech recognizer poll failed: {:?}", e),
            }

            self.watch_person_side(&mut last_side).await;
            sleep(self.config.listen_poll_interval).await;
        }
    }

    async fn watch_person_side(&self, last_side: &mut Option<PersonSide>) {
        let angle = self.head.get_orientation_angle().await;
        let Some(side) = PersonSide::crossing(angle, *last_side, &self.config.thresholds) else {
            return;
        };
        *last_side = Some(side);
        debug!("Person crossed to {:?} (head angle {:.1})", side, angle);

        match side {
            PersonSide::Left => {
                self.arm.do_signal_left().await;
                sleep(self.config.signal_delay).await;
                self.say_no_wait(SentenceId::OnTheLeft).await;
            }
            PersonSide::Right => {
                self.arm.do_signal_right().await;
                sleep(self.config.signal_delay).await;
                self.say_no_wait(SentenceId::OnTheRight).await;
            }
            PersonSide::Center => {
                self.say_no_wait(SentenceId::OnTheCenter).await;
            }
        }
    }

    async fn introduce(&self) {
        let first = {
            let mut guard = self.inner.lock().await;
            !std::mem::replace(&mut guard.introduced, true)
        };
        if first {
            self.say_and_wait(SentenceId::Presentation1).await;
        }
    }

    /// Speaks with the microphone muted so the robot does not hear itself.
    pub async fn say_and_wait(&self, id: SentenceId) {
        let text = self.vocabulary.sentence(id);

        self.set_mic(true).await;

        if self.request_speech(text).await {
            let wait = async {
                loop {
                    match self.tts.check_say_done().await {
                        Ok(true) => break,
                        Ok(false) => sleep(self.config.say_poll_interval).await,
                        Err(e) => {
                            warn!("Speech completion query failed: {:?}", e);
                            break;
                        }
                    }
                }
            };
            if timeout(self.config.say_timeout, wait).await.is_err() {
                warn!("Speech did not finish within {:?}", self.config.say_timeout);
            }
        }

        sleep(self.config.settle_delay).await;
        self.set_mic(false).await;
    }

    /// No-op without a microphone; the recognizer may not even be running.
    async fn set_mic(&self, muted: bool) {
        if !self.config.micro {
            return;
        }
        if let Err(e) = self.asr.set_mic(muted).await {
            warn!("Failed to {} microphone: {:?}", if muted { "mute" } else { "unmute" }, e);
        }
    }

    pub async fn say_no_wait(&self, id: SentenceId) {
        self.request_speech(self.vocabulary.sentence(id)).await;
    }

    async fn request_speech(&self, text: &str) -> bool {
        match self.tts.say(text).await {
            Ok(true) => {
                self.event_bus.publish_said(text).await;
                true
            }
            Ok(false) => {
                warn!("Speech synthesizer refused: '{}'", text);
                false
            }
            Err(e) => {
                error!("Speech synthesizer failed: {:?}", e);
                false
            }
        }
    }

    async fn heard(&self, text: &str) {
        info!("Heard: '{}'", text);
        self.event_bus.publish_heard(text).await;
    }

    async fn set_state(&self, to: ConversationState) {
        let from = {
            let mut guard = self.inner.lock().await;
            std::mem::replace(&mut guard.state, to)
        };
        info!("Dialogue state {} -> {}", from, to);
        self.event_bus
            .publish(FollowMeEvent::StateChanged { from, to })
            .await;
    }
}
