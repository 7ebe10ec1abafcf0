//! Session error types.

use storegate_protocol::CallError;

use crate::config::ConfigError;
use crate::status::RpcError;

/// Errors produced by session setup and authentication.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("gateway call failed: {0}")]
    Call(#[from] CallError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
