// File: followme-common/src/models/status.rs

use serde::{Deserialize, Serialize};
use crate::models::conversation::ConversationState;
use crate::models::gesture::GestureLabel;

/// Eventually-consistent view of the whole system, served by `stat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowMeStatus {
    pub conversation: ConversationState,
    pub following: bool,
    pub gesture: GestureLabel,
    pub pending_setpoints: usize,
    pub head_following: bool,
    pub dialogue_running: bool,
}
