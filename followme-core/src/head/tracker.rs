// File: followme-core/src/head/tracker.rs
//! Visual-servo loop for the head.
//!
//! Vision pushes one `TargetOffset` per detection. While following is on,
//! each axis whose offset leaves the deadband gets a fixed relative step
//! toward the person. Pan turns against `x`, tilt follows `y`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use followme_common::models::TargetOffset;
use followme_common::traits::{HeadApi, JointGroup};
use crate::config::HeadTrackingConfig;
use crate::Error;

const HOME: [f64; 2] = [0.0, 0.0];

pub struct HeadTracker {
    head: Arc<dyn JointGroup>,
    following: AtomicBool,
    config: HeadTrackingConfig,
}

impl HeadTracker {
    pub fn new(head: Arc<dyn JointGroup>, config: HeadTrackingConfig) -> Self {
        Self {
            head,
            following: AtomicBool::new(false),
            config,
        }
    }

    pub async fn initialize(&self) -> Result<(), Error> {
        self.head.set_position_mode().await?;
        self.head.set_ref_speeds(self.config.ref_speed).await?;
        self.head.set_ref_accelerations(self.config.ref_acceleration).await?;
        info!("Head '{}' ready in position mode.", self.head.name());
        Ok(())
    }

    pub fn is_following(&self) -> bool {
        self.following.load(Ordering::SeqCst)
    }

    /// Relative correction for one observation, or `None` inside the deadband.
    pub fn correction(&self, offset: &TargetOffset) -> Option<[f64; 2]> {
        let db = self.config.deadband;
        let inc = self.config.increment;

        let pan = if offset.x.abs() > db { inc.copysign(-offset.x) } else { 0.0 };
        let tilt = if offset.y.abs() > db { inc.copysign(offset.y) } else { 0.0 };

        if offset.x.abs() > db || offset.y.abs() > db {
            Some([pan, tilt])
        } else {
            None
        }
    }

    pub async fn on_observation(&self, offset: TargetOffset) {
        if !self.is_following() {
            if self.config.home_on_disabled_observation {
                self.home().await;
            }
            return;
        }

        if let Some(delta) = self.correction(&offset) {
            debug!("Head correction {:?} for offset ({:.3}, {:.3})", delta, offset.x, offset.y);
            if let Err(e) = self.head.relative_move(&delta).await {
                error!("Head relative move failed: {:?}", e);
            }
        }
    }

    pub async fn enable_following(&self) {
        self.following.store(true, Ordering::SeqCst);
        info!("Head following enabled.");
    }

    pub async fn disable_following(&self) {
        self.following.store(false, Ordering::SeqCst);
        info!("Head following disabled.");
        self.home().await;
    }

    /// Live pan angle in degrees; 0.0 when the encoder cannot be read.
    pub async fn orientation_angle(&self) -> f64 {
        match self.head.encoder(0).await {
            Ok(angle) => angle,
            Err(e) => {
                warn!("Head encoder read failed, reporting 0.0: {:?}", e);
                0.0
            }
        }
    }

    pub async fn stop(&self) -> bool {
        self.following.store(false, Ordering::SeqCst);
        match self.head.stop().await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to stop head: {:?}", e);
                false
            }
        }
    }

    async fn home(&self) {
        if let Err(e) = self.head.position_move(&HOME).await {
            error!("Head homing failed: {:?}", e);
        }
    }
}

#[async_trait]
impl HeadApi for HeadTracker {
    async fn enable_following(&self) {
        HeadTracker::enable_following(self).await;
    }

    async fn disable_following(&self) {
        HeadTracker::disable_following(self).await;
    }

    async fn get_orientation_angle(&self) -> f64 {
        self.orientation_angle().await
    }

    async fn stop_head(&self) -> bool {
        self.stop().await
    }
}
