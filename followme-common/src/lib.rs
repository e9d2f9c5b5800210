//! followme-common/src/lib.rs
//!
//! Shared models, the error type and the collaborator traits used by every
//! other crate in the workspace.

pub mod error;
pub mod models;
pub mod traits;

pub use error::Error;
