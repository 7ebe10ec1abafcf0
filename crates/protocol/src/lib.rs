//! Control-plane model for the storage gateway.
//!
//! Holds the request/response messages, the status and resource types,
//! the opaque key/value side channel, and the [`GatewayApi`] trait that a
//! generated RPC stub implements. Nothing in this crate performs I/O.

pub mod constants;
pub mod gateway;
pub mod messages;
pub mod opaque;
pub mod rpc;
pub mod types;

pub use gateway::{CallContext, CallError, CallFuture, GatewayApi};
pub use opaque::{Opaque, OpaqueEntry, OpaqueError, decode_opaque};
pub use rpc::{Code, Status};
pub use types::{
    ChecksumPriority, ChecksumType, Reference, ResourceInfo, ResourceType, TransferEndpoint,
};
