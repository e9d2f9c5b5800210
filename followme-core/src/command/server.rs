// File: followme-core/src/command/server.rs
//! TCP line server for the command channel. Each connection gets its own
//! task; each request is answered before the next line is read.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

use followme_common::models::Vocab;
use followme_common::traits::FollowMeApi;
use crate::command::protocol::{RpcReply, RpcRequest};
use crate::eventbus::shutdown_requested;
use crate::Error;

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Maps one request onto the API. Validation happened in `RpcRequest::parse`.
pub async fn dispatch<A: FollowMeApi + ?Sized>(api: &A, request: &RpcRequest) -> RpcReply {
    match request.vocab {
        Vocab::Salute => {
            api.do_greet().await;
            RpcReply::Ok
        }
        Vocab::SignalLeft => {
            api.do_signal_left().await;
            RpcReply::Ok
        }
        Vocab::SignalRight => {
            api.do_signal_right().await;
            RpcReply::Ok
        }
        Vocab::Swing => {
            api.enable_arm_swinging().await;
            RpcReply::Ok
        }
        Vocab::Homing => {
            api.disable_arm_swinging().await;
            RpcReply::Ok
        }
        Vocab::Stop => RpcReply::Bool(api.stop_arms().await),
        Vocab::FollowMe => {
            api.enable_following().await;
            RpcReply::Ok
        }
        Vocab::StopFollowing => {
            api.disable_following().await;
            RpcReply::Ok
        }
        Vocab::GetEncoderPosition => RpcReply::Angle(api.get_orientation_angle().await),
        Vocab::Hear => match api.deliver_speech(&request.args).await {
            Ok(()) => RpcReply::Ok,
            Err(e) => RpcReply::Fail(e.to_string()),
        },
        Vocab::Status => RpcReply::Status(api.status().await),
    }
}

pub struct RpcServer {
    listener: TcpListener,
    api: Arc<dyn FollowMeApi>,
}

impl RpcServer {
    pub async fn bind(addr: SocketAddr, api: Arc<dyn FollowMeApi>) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, api })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until shutdown.
    pub async fn serve(self, mut shutdown_rx: watch::Receiver<bool>) {
        match self.listener.local_addr() {
            Ok(addr) => info!("RPC server listening on {}", addr),
            Err(e) => warn!("RPC server address unknown: {:?}", e),
        }

        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown_rx) => {
                    info!("RPC server shutting down.");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!("RPC client connected: {}", peer);
                            let api = self.api.clone();
                            let rx = shutdown_rx.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, api, rx).await {
                                    warn!("RPC connection {} ended with error: {:?}", peer, e);
                                }
                            });
                        }
                        Err(e) => error!("RPC accept failed: {:?}", e),
                    }
                }
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    api: Arc<dyn FollowMeApi>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), Error> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown_rx) => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };

        let reply = match RpcRequest::parse(&line) {
            Ok(request) => dispatch(api.as_ref(), &request).await,
            Err(e) => {
                warn!("Refusing RPC request '{}': {}", line.trim(), e);
                RpcReply::Fail(e.to_string())
            }
        };
        writer.write_all(format!("{}\n", reply).as_bytes()).await?;
    }
    Ok(())
}

/// Sends one request line and returns the reply line without its newline.
pub async fn send_request(addr: SocketAddr, request: &str) -> Result<String, Error> {
    send_request_within(addr, request, REPLY_TIMEOUT).await
}

/// Like [`send_request`], failing with `Error::Timeout` after `wait`.
pub async fn send_request_within(
    addr: SocketAddr,
    request: &str,
    wait: Duration,
) -> Result<String, Error> {
    timeout(wait, exchange(addr, request)).await?
}

async fn exchange(addr: SocketAddr, request: &str) -> Result<String, Error> {
    let stream = TcpStream::connect(addr).await?;
    let (reader, mut writer) = stream.into_split();
    writer.write_all(format!("{}\n", request.trim()).as_bytes()).await?;

    let mut lines = BufReader::new(reader).lines();
    lines
        .next_line()
        .await?
        .ok_or_else(|| Error::Protocol("connection closed before reply".into()))
}
