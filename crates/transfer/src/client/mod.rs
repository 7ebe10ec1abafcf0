//! Data-plane clients and transport selection.
//!
//! Each initiate-transfer response yields exactly one [`TransferClient`].
//! Selection tries the combined protocol first and falls back only when the
//! endpoint does not offer it.

mod combined;
mod direct;
mod resumable;


use std::fmt;

use tracing::{debug, info};

use crate::checksum::ChecksumSelection;
use crate::context::TransferContext;
use crate::data::UploadData;
use crate::hints::CombinedProtocolHints;
use crate::TransferError;
use storegate_protocol::TransferEndpoint;

pub use combined::CombinedProtocolClient;
pub use direct::DirectHttpClient;
pub use resumable::ResumableUploadClient;

/// Wire protocol driven by a [`TransferClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Combined,
    Resumable,
    Direct,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Combined => f.write_str("WebDAV"),
            Protocol::Resumable => f.write_str("TUS"),
            Protocol::Direct => f.write_str("HTTP"),
        }
    }
}

/// A data-plane client bound to one transfer endpoint.
#[derive(Debug, Clone)]
pub enum TransferClient {
    Combined(CombinedProtocolClient),
    Resumable(ResumableUploadClient),
    Direct(DirectHttpClient),
}

impl TransferClient {
    pub fn protocol(&self) -> Protocol {
        match self {
            TransferClient::Combined(_) => Protocol::Combined,
            TransferClient::Resumable(_) => Protocol::Resumable,
            TransferClient::Direct(_) => Protocol::Direct,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            TransferClient::Combined(c) => c.endpoint(),
            TransferClient::Resumable(c) => c.endpoint(),
            TransferClient::Direct(c) => c.endpoint(),
        }
    }

    /// `false` for upload-only protocols.
    pub fn supports_read(&self) -> bool {
        !matches!(self, TransferClient::Resumable(_))
    }

    /// `true` if the caller should negotiate a checksum before writing.
    pub fn accepts_checksum(&self) -> bool {
        !matches!(self, TransferClient::Combined(_))
    }

    /// Sends `size` bytes of `data` to the endpoint.
    ///
    /// `target` is the gateway path of the upload; only the resumable
    /// protocol forwards it as metadata.
    pub async fn write(
        &self,
        data: UploadData,
        size: u64,
        target: &str,
        checksum: &ChecksumSelection,
    ) -> Result<(), TransferError> {
        match self {
            TransferClient::Combined(c) => c.write(data, size).await,
            TransferClient::Resumable(c) => c.write(data, size, target, checksum).await,
            TransferClient::Direct(c) => c.write(data, size, checksum).await,
        }
    }

    /// Fetches the whole payload from the endpoint.
    pub async fn read(&self) -> Result<Vec<u8>, TransferError> {
        match self {
            TransferClient::Combined(c) => c.read().await,
            TransferClient::Direct(c) => c.read().await,
            TransferClient::Resumable(_) => Err(TransferError::Unsupported {
                protocol: Protocol::Resumable,
                operation: "read",
            }),
        }
    }
}

/// Picks the upload client for `endpoint`.
///
/// Only an endpoint that does not offer the combined protocol falls back;
/// malformed hints are returned as errors.
pub fn select_upload_client(
    ctx: &TransferContext,
    endpoint: &TransferEndpoint,
    prefer_resumable: bool,
) -> Result<TransferClient, TransferError> {
    match CombinedProtocolHints::from_opaque(endpoint.opaque.as_ref()) {
        Ok(hints) => {
            info!(endpoint = %endpoint.endpoint, protocol = %Protocol::Combined, "transport selected");
            Ok(TransferClient::Combined(CombinedProtocolClient::new(
                ctx,
                &endpoint.endpoint,
                hints,
            )))
        }
        Err(e) if e.is_unsupported() => {
            debug!(reason = %e, prefer_resumable, "combined protocol unavailable, falling back");
            let client = if prefer_resumable {
                TransferClient::Resumable(ResumableUploadClient::new(ctx, endpoint))
            } else {
                TransferClient::Direct(DirectHttpClient::new(ctx, endpoint))
            };
            info!(endpoint = %endpoint.endpoint, protocol = %client.protocol(), "transport selected");
            Ok(client)
        }
        Err(e) => Err(e.into()),
    }
}

/// Picks the download client for `endpoint`, falling back to direct HTTP.
pub fn select_download_client(
    ctx: &TransferContext,
    endpoint: &TransferEndpoint,
) -> Result<TransferClient, TransferError> {
    select_upload_client(ctx, endpoint, false)
}

// ---------------------------------------------------------------------------
// Shared request helpers
// ---------------------------------------------------------------------------

/// Sends `request`, aborting when the context is cancelled.
pub(crate) async fn send(
    ctx: &TransferContext,
    request: reqwest::RequestBuilder,
    endpoint: &str,
    protocol: Protocol,
) -> Result<reqwest::Response, TransferError> {
    tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => Err(TransferError::Cancelled),
        result = request.send() => {
            result.map_err(|e| TransferError::execution(endpoint, protocol, e))
        }
    }
}

/// Reads the full response body, aborting when the context is cancelled.
pub(crate) async fn read_body(
    ctx: &TransferContext,
    mut response: reqwest::Response,
    endpoint: &str,
    protocol: Protocol,
) -> Result<Vec<u8>, TransferError> {
    let mut body = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    loop {
        let chunk = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return Err(TransferError::Cancelled),
            chunk = response.chunk() => {
                chunk.map_err(|e| TransferError::execution(endpoint, protocol, e))?
            }
        };
        match chunk {
            Some(bytes) => body.extend_from_slice(&bytes),
            None => break,
        }
    }
    debug!(endpoint, %protocol, bytes = body.len(), "payload received");
    Ok(body)
}

/// Fails with an execution error unless `response` has one of `expected`.
pub(crate) fn expect_status(
    response: &reqwest::Response,
    expected: &[reqwest::StatusCode],
    endpoint: &str,
    protocol: Protocol,
) -> Result<(), TransferError> {
    let status = response.status();
    if expected.contains(&status) {
        Ok(())
    } else {
        Err(TransferError::execution(
            endpoint,
            protocol,
            format!("unexpected status {status}"),
        ))
    }
}
