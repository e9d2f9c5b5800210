//! followme-server/src/server.rs
//!
//! Server mode: spawns the periodic tasks, the command channel and the OSC
//! receiver, then waits for Ctrl-C.

use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};

use followme_common::traits::{ArmApi, FollowMeApi, HeadApi};
use followme_core::command::RpcServer;
use followme_core::eventbus::event_logger::spawn_event_logger_task;
use followme_core::eventbus::FollowMeEvent;
use followme_core::osc::FollowMeOscRuntime;
use followme_core::tasks::{spawn_sequencer_task, spawn_supervisor_task};
use followme_core::Error;

use crate::context::ServerContext;
use crate::Args;

const HEARTBEAT: Duration = Duration::from_secs(10);
const TASK_GRACE: Duration = Duration::from_secs(2);

pub async fn run_server(args: Args) -> Result<(), Error> {
    let ctx = ServerContext::new(&args).await?;
    let bus = ctx.event_bus.clone();

    let logger_handle = spawn_event_logger_task(bus.clone());
    let sequencer_handle = spawn_sequencer_task(
        ctx.sequencer.clone(),
        ctx.config.sequencer.tick_period,
        bus.shutdown_signal(),
    );
    let supervisor_handle = spawn_supervisor_task(ctx.supervisor.clone(), bus.shutdown_signal());

    let api: std::sync::Arc<dyn FollowMeApi> = ctx.service.clone();
    let rpc = RpcServer::bind(ctx.config.network.rpc_addr, api).await?;
    let rpc_handle = tokio::spawn(rpc.serve(bus.shutdown_signal()));

    let osc = FollowMeOscRuntime::bind(
        ctx.config.network.osc_addr,
        ctx.head.clone(),
        ctx.recognizer.clone(),
    )
    .await?;
    let osc_handle = tokio::spawn(osc.run(bus.shutdown_signal()));

    let eb_clone = bus.clone();
    let _ctrlc_handle = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {:?}", e);
        }
        info!("Ctrl-C detected; shutting down event bus...");
        eb_clone.shutdown();
    });

    let mut shutdown_rx = bus.shutdown_signal();
    loop {
        tokio::select! {
            _ = time::sleep(HEARTBEAT) => {
                bus.publish(FollowMeEvent::Tick).await;
            }
            Ok(_) = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    info!("Shutdown signaled; exiting server loop.");
                    break;
                }
            }
        }
    }

    for (name, handle) in [
        ("sequencer", sequencer_handle),
        ("supervisor", supervisor_handle),
        ("rpc", rpc_handle),
        ("osc", osc_handle),
        ("event logger", logger_handle),
    ] {
        if time::timeout(TASK_GRACE, handle).await.is_err() {
            warn!("{} task did not exit in time", name);
        }
    }

    let arms_ok = ctx.service.stop_arms().await;
    let head_ok = ctx.service.stop_head().await;
    info!("Hardware stopped (arms={}, head={}).", arms_ok, head_ok);
    Ok(())
}
