// File: followme-core/src/tasks/sequencer_tick.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::arm::SetpointSequencer;
use crate::eventbus::shutdown_requested;

/// Spawns the periodic driver that advances the arm setpoint queue.
pub fn spawn_sequencer_task(
    sequencer: Arc<SetpointSequencer>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown_rx) => break,
                _ = ticker.tick() => sequencer.tick().await,
            }
        }
        info!("Sequencer task exiting.");
    })
}
