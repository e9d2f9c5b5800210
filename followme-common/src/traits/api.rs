// File: followme-common/src/traits/api.rs
//! Request/response surface shared by the dialogue driver, the RPC server
//! and anything else that wants to move the robot.

use async_trait::async_trait;
use crate::error::Error;
use crate::models::FollowMeStatus;

pub trait FollowMeApi: ArmApi + HeadApi + SpeechInputApi + StatusApi {}

impl<T> FollowMeApi for T
where
    T: ArmApi + HeadApi + SpeechInputApi + StatusApi,
{
    // marker
}

#[async_trait]
pub trait ArmApi: Send + Sync {
    async fn do_greet(&self);
    async fn do_signal_left(&self);
    async fn do_signal_right(&self);
    async fn enable_arm_swinging(&self);
    async fn disable_arm_swinging(&self);
    /// Halts all arm motion and clears the queue.
    async fn stop_arms(&self) -> bool;
}

#[async_trait]
pub trait HeadApi: Send + Sync {
    async fn enable_following(&self);
    async fn disable_following(&self);
    /// Head yaw in degrees, positive to the robot's left. 0.0 on read failure.
    async fn get_orientation_angle(&self) -> f64;
    async fn stop_head(&self) -> bool;
}

#[async_trait]
pub trait SpeechInputApi: Send + Sync {
    /// Hands recognized text to the dialogue's recognizer inbox.
    async fn deliver_speech(&self, text: &str) -> Result<(), Error>;
}

#[async_trait]
pub trait StatusApi: Send + Sync {
    async fn status(&self) -> FollowMeStatus;
}
