// File: followme-core/src/tasks/supervisor.rs
//! Keeps the dialogue task alive only while every collaborator is reachable,
//! and reports the dialogue state at a throttled rate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{info, warn};

use followme_common::traits::ConnectionProbe;
use crate::config::SupervisorConfig;
use crate::dialogue::ConversationStateMachine;
use crate::eventbus::{shutdown_requested, EventBus, FollowMeEvent};

pub struct DialogueSupervisor {
    dialogue: Arc<ConversationStateMachine>,
    probes: Vec<Arc<dyn ConnectionProbe>>,
    config: SupervisorConfig,
    running: Arc<AtomicBool>,
    event_bus: Arc<EventBus>,
    task: Mutex<Option<JoinHandle<()>>>,
    last_report: Mutex<Option<Instant>>,
}

impl DialogueSupervisor {
    pub fn new(
        dialogue: Arc<ConversationStateMachine>,
        probes: Vec<Arc<dyn ConnectionProbe>>,
        config: SupervisorConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            dialogue,
            probes,
            config,
            running: Arc::new(AtomicBool::new(false)),
            event_bus,
            task: Mutex::new(None),
            last_report: Mutex::new(None),
        }
    }

    /// Shared flag, true while the dialogue task is alive.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn all_connected(&self) -> bool {
        let mut ok = true;
        for probe in &self.probes {
            if !probe.is_connected().await {
                warn!("Waiting for connection to {}", probe.port_name());
                ok = false;
            }
        }
        ok
    }

    /// One supervision period: start, stop or leave the dialogue task.
    pub async fn update(&self) {
        let connected = self.all_connected().await;

        {
            let mut task = self.task.lock().await;
            if task.as_ref().is_some_and(|h| h.is_finished()) {
                *task = None;
            }

            match (connected, task.is_some()) {
                (true, false) => {
                    let dialogue = self.dialogue.clone();
                    let rx = self.event_bus.shutdown_signal();
                    *task = Some(tokio::spawn(async move { dialogue.run(rx).await }));
                    info!("All collaborators connected; dialogue started.");
                    self.event_bus
                        .publish(FollowMeEvent::SystemMessage("dialogue started".into()))
                        .await;
                }
                (false, true) => {
                    if let Some(handle) = task.take() {
                        handle.abort();
                    }
                    warn!("Collaborator lost; dialogue stopped until it reconnects.");
                    self.event_bus
                        .publish(FollowMeEvent::SystemMessage("dialogue stopped".into()))
                        .await;
                }
                _ => {}
            }
            self.running.store(task.is_some(), Ordering::SeqCst);
        }

        self.report_state().await;
    }

    async fn report_state(&self) {
        let mut last = self.last_report.lock().await;
        let due = last.is_none_or(|at| at.elapsed() >= self.config.report_interval);
        if due {
            *last = Some(Instant::now());
            info!(
                "Dialogue state: {} (following={}, running={})",
                self.dialogue.state().await,
                self.dialogue.is_following().await,
                self.is_running()
            );
        }
    }

    /// Aborts the dialogue task if it is running.
    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Collaborators the dialogue needs. Without a microphone the recognizer
/// is left out, so the scripted demo runs with speech recognition down.
pub fn required_collaborators(
    mut devices: Vec<Arc<dyn ConnectionProbe>>,
    recognizer: Arc<dyn ConnectionProbe>,
    micro: bool,
) -> Vec<Arc<dyn ConnectionProbe>> {
    if micro {
        devices.push(recognizer);
    }
    devices
}

pub fn spawn_supervisor_task(
    supervisor: Arc<DialogueSupervisor>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(supervisor.config.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown_rx) => break,
                _ = ticker.tick() => supervisor.update().await,
            }
        }
        supervisor.stop().await;
        info!("Supervisor task exiting.");
    })
}
