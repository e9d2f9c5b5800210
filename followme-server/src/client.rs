//! followme-server/src/client.rs
//!
//! Client mode: sends one command-channel request and/or one vision
//! observation to a running server.

use std::net::SocketAddr;
use rosc::OscType;
use tokio::net::UdpSocket;
use tracing::info;

use followme_common::models::TargetOffset;
use followme_core::command::send_request;
use followme_core::osc::{encode_message, CV_ADDR};
use followme_core::Error;

use crate::Args;

pub async fn run_client(args: Args) -> Result<(), Error> {
    if args.command.is_none() && args.cv.is_none() {
        return Err(Error::Config("client mode needs --command or --cv".into()));
    }

    if let Some(cv) = args.cv.as_deref() {
        let offset = parse_cv(cv)?;
        let target: SocketAddr = args.osc_addr.parse()?;
        let bytes = encode_message(
            CV_ADDR,
            vec![
                OscType::Double(offset.x),
                OscType::Double(offset.y),
                OscType::Double(offset.depth),
            ],
        )?;
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        socket.send_to(&bytes, target).await?;
        info!("Sent {} ({}, {}, {}) to {}", CV_ADDR, offset.x, offset.y, offset.depth, target);
    }

    if let Some(command) = args.command.as_deref() {
        let addr: SocketAddr = args.rpc_addr.parse()?;
        let reply = send_request(addr, command).await?;
        println!("{}", reply);
    }
    Ok(())
}

fn parse_cv(raw: &str) -> Result<TargetOffset, Error> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::Parse(format!("invalid --cv '{}': {}", raw, e)))?;
    TargetOffset::from_values(&values)
}
