// File: followme-common/src/traits/device_traits.rs

use async_trait::async_trait;
use crate::error::Error;

/// A group of position-controlled joints (one arm, the head, ...).
///
/// Every call may block briefly on hardware I/O. Callers decide what a
/// failure means; nothing in here retries.
#[async_trait]
pub trait JointGroup: Send + Sync {
    fn name(&self) -> &str;

    async fn set_position_mode(&self) -> Result<(), Error>;
    async fn set_ref_speeds(&self, speed: f64) -> Result<(), Error>;
    async fn set_ref_accelerations(&self, acceleration: f64) -> Result<(), Error>;

    /// Absolute move of every axis; `targets.len()` may be shorter than the axis count.
    async fn position_move(&self, targets: &[f64]) -> Result<(), Error>;
    /// Relative move of every axis by `deltas`.
    async fn relative_move(&self, deltas: &[f64]) -> Result<(), Error>;

    async fn check_motion_done(&self) -> Result<bool, Error>;
    async fn stop(&self) -> Result<(), Error>;

    async fn encoder(&self, axis: usize) -> Result<f64, Error>;
}

/// Anything the supervisor must see connected before the dialogue may run.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    fn port_name(&self) -> String;
    async fn is_connected(&self) -> bool;
}
