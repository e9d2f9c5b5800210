// File: followme-core/src/eventbus/event_logger.rs

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use crate::eventbus::{EventBus, FollowMeEvent};

/// Subscribes to the bus and writes every event to the log at debug level.
/// Exits when the bus shuts down or every sender is gone.
pub fn spawn_event_logger_task(bus: Arc<EventBus>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = bus.subscribe(None).await;
        let mut shutdown_rx = bus.shutdown_signal();

        loop {
            tokio::select! {
                maybe_event = rx.recv() => {
                    match maybe_event {
                        Some(event) => log_event(&event),
                        None => break,
                    }
                }
                Ok(_) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Event logger task exiting.");
    })
}

fn log_event(event: &FollowMeEvent) {
    match event {
        FollowMeEvent::Tick => {}
        FollowMeEvent::StateChanged { from, to } => {
            debug!("[{}] {} -> {}", event.event_type(), from, to);
        }
        FollowMeEvent::GestureRegistered { label, setpoints } => {
            debug!("[{}] {} ({} setpoints)", event.event_type(), label, setpoints);
        }
        FollowMeEvent::SetpointDispatched { label, remaining } => {
            debug!("[{}] {} ({} remaining)", event.event_type(), label, remaining);
        }
        FollowMeEvent::SpeechHeard { text, timestamp } => {
            debug!("[{}] {} '{}'", event.event_type(), timestamp, text);
        }
        FollowMeEvent::SpeechSaid { text, timestamp } => {
            debug!("[{}] {} '{}'", event.event_type(), timestamp, text);
        }
        FollowMeEvent::SystemMessage(msg) => {
            debug!("[{}] {}", event.event_type(), msg);
        }
    }
}
