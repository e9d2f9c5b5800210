// tests/dialogue_tests.rs

mod common;

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use mockall::mock;
use mockall::predicate::always;

use followme_common::models::{
    AnswerCycle, ConversationState, GestureLabel, Language, SentenceId, Vocabulary,
};
use followme_common::traits::SpeechSynthesizer;
use followme_core::config::DialogueConfig;
use followme_core::dialogue::ConversationStateMachine;
use followme_core::eventbus::{EventBus, FollowMeEvent};
use followme_core::sim::InboxRecognizer;
use followme_core::test_utils::{RecordingArm, RecordingHead};
use followme_core::Error;

use common::{build_stack, fast_dialogue_config, wait_until};

mock! {
    Synth {}
    #[async_trait]
    impl SpeechSynthesizer for Synth {
        async fn set_language(&self, voice: &str) -> Result<bool, Error>;
        async fn say(&self, text: &str) -> Result<bool, Error>;
        async fn check_say_done(&self) -> Result<bool, Error>;
    }
}

fn with_mock_synth(synth: MockSynth, state: ConversationState, config: DialogueConfig) -> ConversationStateMachine {
    ConversationStateMachine::new(
        Arc::new(RecordingArm::default()),
        Arc::new(RecordingHead::default()),
        Arc::new(synth),
        Arc::new(InboxRecognizer::new()),
        config,
        Arc::new(EventBus::new()),
    )
    .starting_in(state)
}

#[tokio::test]
async fn test_follow_me_then_name_through_whole_stack() {
    let s = build_stack(fast_dialogue_config());
    let en = Vocabulary::new(Language::English);
    let mut events = s.bus.subscribe(None).await;

    let dialogue = s.dialogue.clone();
    let task = tokio::spawn({
        let rx = s.bus.shutdown_signal();
        async move { dialogue.run(rx).await }
    });

    // Wait for the introduction so the microphone is open again.
    let tts = s.tts.clone();
    let asr = s.asr.clone();
    assert!(wait_until(|| {
        let (tts, asr) = (tts.clone(), asr.clone());
        async move { tts.said().await.len() == 1 && !asr.is_muted() }
    }).await);

    s.asr.deliver("please follow me now").await.unwrap();
    let d = s.dialogue.clone();
    assert!(wait_until(|| {
        let d = d.clone();
        async move { d.state().await == ConversationState::Dialogue }
    }).await);

    assert!(s.head.is_following());
    assert!(s.dialogue.is_following().await);
    assert_eq!(s.sequencer.current_gesture().await, GestureLabel::Greet);
    assert_eq!(
        s.tts.said().await,
        vec![
            en.sentence(SentenceId::Presentation1),
            en.sentence(SentenceId::OkFollow),
            en.sentence(SentenceId::AskName),
        ]
    );

    s.asr.deliver("my name is ana").await.unwrap();
    assert!(wait_until(|| {
        let tts = tts.clone();
        async move { tts.said().await.contains(&en.sentence(SentenceId::Answer1).to_string()) }
    }).await);
    assert_eq!(s.dialogue.answer_cycle().await, AnswerCycle::Answer2);

    s.bus.shutdown();
    tokio::time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();

    let mut saw_follow = false;
    while let Ok(evt) = events.try_recv() {
        if let FollowMeEvent::StateChanged { to: ConversationState::Follow, .. } = evt {
            saw_follow = true;
        }
    }
    assert!(saw_follow);
}

#[tokio::test]
async fn test_name_replies_rotate_and_wrap() {
    let s = build_stack(fast_dialogue_config());
    let en = Vocabulary::new(Language::English);
    let mut replies = Vec::new();

    for _ in 0..4 {
        // LISTEN -> FOLLOW -> ASK_NAME -> DIALOGUE -> LISTEN
        s.asr.deliver("follow me").await.unwrap();
        s.dialogue.step().await;
        assert_eq!(s.dialogue.state().await, ConversationState::Follow);
        s.dialogue.step().await;
        s.dialogue.step().await;
        assert_eq!(s.dialogue.state().await, ConversationState::Dialogue);

        s.asr.deliver("my name is bob").await.unwrap();
        s.dialogue.step().await;
        assert_eq!(s.dialogue.state().await, ConversationState::Listen);
        replies.push(s.tts.said().await.last().cloned().unwrap());
    }

    let expected: Vec<String> = [
        SentenceId::Answer1,
        SentenceId::Answer2,
        SentenceId::Answer3,
        SentenceId::Answer1,
    ]
    .iter()
    .map(|id| en.sentence(*id).to_string())
    .collect();
    assert_eq!(replies, expected);
}

#[tokio::test]
async fn test_stop_following_from_dialogue_homes_arms() {
    let s = build_stack(fast_dialogue_config());
    s.head.enable_following().await;

    s.asr.deliver("follow me").await.unwrap();
    for _ in 0..3 {
        s.dialogue.step().await;
    }
    s.asr.deliver("stop following please").await.unwrap();
    s.dialogue.step().await;
    assert_eq!(s.dialogue.state().await, ConversationState::StopFollowing);

    s.dialogue.step().await;
    assert_eq!(s.dialogue.state().await, ConversationState::Listen);
    assert!(!s.dialogue.is_following().await);
    assert!(!s.head.is_following());
    assert_eq!(s.sequencer.current_gesture().await, GestureLabel::Homing);
    assert_eq!(s.head_joints.position_moves().await.last(), Some(&vec![0.0, 0.0]));
}

#[tokio::test]
async fn test_spanish_voice_is_selected_at_startup() {
    let mut synth = MockSynth::new();
    synth
        .expect_set_language()
        .withf(|voice| voice == "mb-es1")
        .times(1)
        .returning(|_| Ok(true));

    let config = DialogueConfig {
        language: Language::Spanish,
        ..fast_dialogue_config()
    };
    let sm = with_mock_synth(synth, ConversationState::Listen, config);
    sm.configure_speech().await.unwrap();
}

#[tokio::test]
async fn test_refused_speech_does_not_wait_for_completion() {
    let mut synth = MockSynth::new();
    synth.expect_say().with(always()).times(1).returning(|_| Ok(false));
    synth.expect_check_say_done().times(0);

    let sm = with_mock_synth(synth, ConversationState::Follow, fast_dialogue_config());
    sm.step().await;
    assert_eq!(sm.state().await, ConversationState::AskName);
}

#[tokio::test]
async fn test_speech_that_never_finishes_times_out() {
    let mut synth = MockSynth::new();
    synth.expect_say().returning(|_| Ok(true));
    synth.expect_check_say_done().returning(|| Ok(false));

    let config = DialogueConfig {
        say_timeout: Duration::from_millis(30),
        ..fast_dialogue_config()
    };
    let sm = with_mock_synth(synth, ConversationState::Follow, config);
    tokio::time::timeout(Duration::from_secs(1), sm.step()).await.unwrap();
    assert_eq!(sm.state().await, ConversationState::AskName);
}

#[tokio::test]
async fn test_without_microphone_follows_and_greets() {
    let config = DialogueConfig {
        micro: false,
        ..fast_dialogue_config()
    };
    let s = build_stack(config);
    s.head_joints.set_encoder(20.0).await;

    let dialogue = s.dialogue.clone();
    let task = tokio::spawn({
        let rx = s.bus.shutdown_signal();
        async move { dialogue.run(rx).await }
    });

    let seq = s.sequencer.clone();
    assert!(wait_until(|| {
        let seq = seq.clone();
        async move { seq.current_gesture().await == GestureLabel::SignalLeft }
    }).await);
    assert!(s.head.is_following());

    // Speech is ignored in this mode.
    s.asr.deliver("stop following").await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(s.head.is_following());

    s.bus.shutdown();
    tokio::time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
}
