//! src/eventbus/mod.rs
//!
//! In-process diagnostic event bus. Every subscriber gets its own bounded
//! MPSC queue; the bus also carries the process-wide shutdown flag that all
//! long-running tasks poll.

pub mod event_logger;

use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use chrono::{DateTime, Utc};
use followme_common::models::{ConversationState, GestureLabel};

/// Diagnostic events published by the orchestration core.
#[derive(Debug, Clone)]
pub enum FollowMeEvent {
    /// Periodic heartbeat from the server loop.
    Tick,

    StateChanged {
        from: ConversationState,
        to: ConversationState,
    },

    GestureRegistered {
        label: GestureLabel,
        setpoints: usize,
    },

    SetpointDispatched {
        label: GestureLabel,
        remaining: usize,
    },

    SpeechHeard {
        text: String,
        timestamp: DateTime<Utc>,
    },

    SpeechSaid {
        text: String,
        timestamp: DateTime<Utc>,
    },

    SystemMessage(String),
}

impl FollowMeEvent {
    pub fn event_type(&self) -> String {
        match self {
            FollowMeEvent::Tick => "tick".to_string(),
            FollowMeEvent::StateChanged { .. } => "dialogue.state_changed".to_string(),
            FollowMeEvent::GestureRegistered { .. } => "arm.gesture_registered".to_string(),
            FollowMeEvent::SetpointDispatched { .. } => "arm.setpoint_dispatched".to_string(),
            FollowMeEvent::SpeechHeard { .. } => "speech.heard".to_string(),
            FollowMeEvent::SpeechSaid { .. } => "speech.said".to_string(),
            FollowMeEvent::SystemMessage(_) => "system_message".to_string(),
        }
    }
}

/// Each subscriber gets its own `mpsc::Sender<FollowMeEvent>`.
///
/// - If a subscriber's buffer fills, `publish` waits for space.
/// - Subscribers that dropped their `Receiver` are skipped.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<FollowMeEvent>>>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Default size for each subscriber's buffer.
const DEFAULT_BUFFER_SIZE: usize = 10000;

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// A fresh receiver for the shutdown flag.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<FollowMeEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    pub async fn publish(&self, event: FollowMeEvent) {
        let senders = {
            let mut subs = self.subscribers.lock().await;
            subs.retain(|s| !s.is_closed());
            subs.clone()
        };
        for s in senders {
            let _ = s.send(event.clone()).await;
        }
    }

    pub async fn publish_heard(&self, text: &str) {
        self.publish(FollowMeEvent::SpeechHeard {
            text: text.to_string(),
            timestamp: Utc::now(),
        })
        .await;
    }

    pub async fn publish_said(&self, text: &str) {
        self.publish(FollowMeEvent::SpeechSaid {
            text: text.to_string(),
            timestamp: Utc::now(),
        })
        .await;
    }
}

/// Resolves once the shutdown flag is true or its sender is gone.
pub async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        let stop = *rx.borrow_and_update();
        if stop {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
