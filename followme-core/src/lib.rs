// src/lib.rs

pub mod arm;
pub mod head;
pub mod dialogue;
pub mod command;
pub mod osc;
pub mod eventbus;
pub mod tasks;
pub mod sim;
pub mod config;
pub mod test_utils;

pub use followme_common::error::Error;
pub use config::FollowMeConfig;
