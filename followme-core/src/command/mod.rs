//! Request/response boundary: the in-process `FollowMeService` and the
//! line-based RPC server that exposes it to other processes.

pub mod protocol;
pub mod service;
pub mod server;

pub use protocol::{RpcReply, RpcRequest};
pub use service::FollowMeService;
pub use server::{dispatch, send_request, send_request_within, RpcServer};
