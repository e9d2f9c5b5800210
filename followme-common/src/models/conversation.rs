// File: followme-common/src/models/conversation.rs

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::models::vocabulary::SentenceId;

/// States of the dialogue driver.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Presentation,
    AskName,
    Dialogue,
    #[default]
    Listen,
    Follow,
    StopFollowing,
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationState::Presentation => write!(f, "presentation"),
            ConversationState::AskName => write!(f, "ask_name"),
            ConversationState::Dialogue => write!(f, "dialogue"),
            ConversationState::Listen => write!(f, "listen"),
            ConversationState::Follow => write!(f, "follow"),
            ConversationState::StopFollowing => write!(f, "stop_following"),
        }
    }
}

/// Rotating pointer over the three canned replies to "my name is".
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Default)]
pub enum AnswerCycle {
    #[default]
    Answer1,
    Answer2,
    Answer3,
}

impl AnswerCycle {
    pub fn next(self) -> Self {
        match self {
            AnswerCycle::Answer1 => AnswerCycle::Answer2,
            AnswerCycle::Answer2 => AnswerCycle::Answer3,
            AnswerCycle::Answer3 => AnswerCycle::Answer1,
        }
    }

    pub fn sentence(self) -> SentenceId {
        match self {
            AnswerCycle::Answer1 => SentenceId::Answer1,
            AnswerCycle::Answer2 => SentenceId::Answer2,
            AnswerCycle::Answer3 => SentenceId::Answer3,
        }
    }

    /// Returns the reply to speak now and moves the pointer one position.
    pub fn advance(&mut self) -> SentenceId {
        let reply = self.sentence();
        *self = self.next();
        reply
    }
}
