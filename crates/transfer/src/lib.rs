//! Data-plane transfers for the storage gateway.
//!
//! The control plane hands out a [`TransferEndpoint`] per operation. This
//! crate decides which wire protocol to use for it, negotiates a checksum,
//! and drives the chosen [`TransferClient`] variant.
//!
//! # Transport selection
//!
//! 1. **Combined protocol** when the endpoint's opaque hints carry both
//!    reserved keys with the `plain` decoder.
//! 2. Otherwise **resumable upload** or **direct HTTP**, per caller preference.
//!
//! Only an unsupported combined protocol falls back. A malformed hint or a
//! failed transfer is returned to the caller as is.
//!
//! [`TransferEndpoint`]: storegate_protocol::TransferEndpoint

pub mod checksum;
pub mod client;
pub mod context;
pub mod data;
pub mod hints;

pub use checksum::{
    ChecksumError, ChecksumSelection, compute_checksum, negotiate_checksum, select_checksum_type,
};
pub use client::{
    CombinedProtocolClient, DirectHttpClient, Protocol, ResumableUploadClient, TransferClient,
    select_download_client, select_upload_client,
};
pub use context::TransferContext;
pub use data::UploadData;
pub use hints::{CombinedProtocolHints, NegotiationError};

/// Default size of a single resumable-upload `PATCH` request: 2 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 2 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),

    #[error("checksum error: {0}")]
    Checksum(#[from] ChecksumError),

    #[error("error while transferring to '{endpoint}' via {protocol}: {reason}")]
    Execution {
        endpoint: String,
        protocol: Protocol,
        reason: String,
    },

    #[error("{protocol} does not support {operation}")]
    Unsupported {
        protocol: Protocol,
        operation: &'static str,
    },

    #[error("transfer cancelled")]
    Cancelled,
}

impl TransferError {
    pub(crate) fn execution(
        endpoint: impl Into<String>,
        protocol: Protocol,
        reason: impl std::fmt::Display,
    ) -> Self {
        TransferError::Execution {
            endpoint: endpoint.into(),
            protocol,
            reason: reason.to_string(),
        }
    }

    /// `true` if the combined protocol was simply not offered.
    pub fn is_unsupported_transport(&self) -> bool {
        matches!(self, TransferError::Negotiation(e) if e.is_unsupported())
    }
}
