//! Action error types.

use storegate_protocol::{CallError, Code};
use storegate_session::{RpcError, SessionError};
use storegate_transfer::TransferError;

/// Errors produced by upload, download and file actions.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("gateway call failed: {0}")]
    Call(#[from] CallError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("invalid target path '{0}'")]
    InvalidTarget(String),

    #[error("'{0}' is not a file")]
    NotAFile(String),

    #[error("'{0}' is not a directory")]
    NotADirectory(String),

    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("upload to '{path}' may have succeeded but verification failed: {source}")]
    Verification {
        path: String,
        source: Box<ActionError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ActionError {
    /// `true` for a missing resource, whether reported locally or by the gateway.
    pub fn is_not_found(&self) -> bool {
        match self {
            ActionError::NotFound(_) => true,
            ActionError::Rpc(e) => e.is_code(Code::NotFound),
            _ => false,
        }
    }
}
