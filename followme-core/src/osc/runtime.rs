// File: followme-core/src/osc/runtime.rs
//! Inbound OSC over UDP. The vision process sends `/followme/cv x y depth`
//! for every detection, the speech front-end sends `/followme/speech text`.

use std::net::SocketAddr;
use std::sync::Arc;
use rosc::{OscMessage, OscPacket, OscType};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use followme_common::models::TargetOffset;
use crate::eventbus::shutdown_requested;
use crate::head::HeadTracker;
use crate::sim::InboxRecognizer;
use crate::Error;

pub const CV_ADDR: &str = "/followme/cv";
pub const SPEECH_ADDR: &str = "/followme/speech";

pub struct FollowMeOscRuntime {
    socket: UdpSocket,
    head: Arc<HeadTracker>,
    recognizer: Arc<InboxRecognizer>,
}

impl FollowMeOscRuntime {
    pub async fn bind(
        addr: SocketAddr,
        head: Arc<HeadTracker>,
        recognizer: Arc<InboxRecognizer>,
    ) -> Result<Self, Error> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| Error::Osc(format!("Failed to bind OSC port {addr}: {e}")))?;
        Ok(Self { socket, head, recognizer })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.socket.local_addr()?)
    }

    /// Receives until shutdown. Bad packets are logged and dropped.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        match self.socket.local_addr() {
            Ok(addr) => info!("OSC runtime listening on UDP {}", addr),
            Err(e) => warn!("OSC runtime address unknown: {:?}", e),
        }

        let mut buf = vec![0u8; rosc::decoder::MTU];
        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown_rx) => {
                    info!("OSC runtime shutting down.");
                    break;
                }
                res = self.socket.recv_from(&mut buf) => {
                    match res {
                        Ok((size, peer)) => {
                            if let Err(e) = self.handle_incoming_packet(&buf[..size]).await {
                                warn!("Dropping OSC packet from {} => {:?}", peer, e);
                            }
                        }
                        Err(e) => error!("Error receiving OSC => {:?}", e),
                    }
                }
            }
        }
    }

    async fn handle_incoming_packet(&self, data: &[u8]) -> Result<(), Error> {
        let (_rest, packet) = rosc::decoder::decode_udp(data)?;
        let mut messages = Vec::new();
        flatten(packet, &mut messages);

        for msg in messages {
            if let Err(e) = self.handle_osc_message(msg).await {
                warn!("Ignoring OSC message => {:?}", e);
            }
        }
        Ok(())
    }

    async fn handle_osc_message(&self, msg: OscMessage) -> Result<(), Error> {
        match msg.addr.as_str() {
            CV_ADDR => {
                let values = msg
                    .args
                    .iter()
                    .map(numeric)
                    .collect::<Option<Vec<f64>>>()
                    .ok_or_else(|| Error::Protocol(format!("{} expects numbers", CV_ADDR)))?;
                let offset = TargetOffset::from_values(&values)?;
                self.head.on_observation(offset).await;
                Ok(())
            }
            SPEECH_ADDR => match msg.args.first() {
                Some(OscType::String(text)) => self.recognizer.deliver(text).await,
                _ => Err(Error::Protocol(format!("{} expects a string", SPEECH_ADDR))),
            },
            other => {
                debug!("Unhandled OSC address {}", other);
                Ok(())
            }
        }
    }
}

fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(m) => out.push(m),
        OscPacket::Bundle(bundle) => {
            for p in bundle.content {
                flatten(p, out);
            }
        }
    }
}

fn numeric(arg: &OscType) -> Option<f64> {
    match arg {
        OscType::Float(f) => Some(f64::from(*f)),
        OscType::Double(d) => Some(*d),
        OscType::Int(i) => Some(f64::from(*i)),
        OscType::Long(l) => Some(*l as f64),
        _ => None,
    }
}

/// Encodes a single OSC message, for senders and tests.
pub fn encode_message(addr: &str, args: Vec<OscType>) -> Result<Vec<u8>, Error> {
    let packet = OscPacket::Message(OscMessage {
        addr: addr.to_string(),
        args,
    });
    Ok(rosc::encoder::encode(&packet)?)
}
