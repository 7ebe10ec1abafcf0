//! Upload orchestration.
//!
//! Flow per call: prepare the parent directory, initiate the upload on the
//! control plane, select a data-plane client, negotiate a checksum, send the
//! payload, then stat the target. Once a client has started sending there is
//! no retry over another protocol.

use std::path::Path;

use tracing::{debug, info};

use storegate_protocol::ResourceInfo;
use storegate_protocol::messages::InitiateFileUploadRequest;
use storegate_session::{Session, check_rpc_status};
use storegate_transfer::{
    ChecksumSelection, TransferError, UploadData, negotiate_checksum, select_upload_client,
};

use crate::error::ActionError;
use crate::fileops::FileOperationsAction;
use crate::paths;

/// Uploads data to a gateway path.
#[derive(Debug, Clone, Copy)]
pub struct UploadAction<'a> {
    session: &'a Session,
    /// Use the resumable protocol instead of direct HTTP when the combined
    /// protocol is not offered.
    pub prefer_resumable: bool,
}

impl<'a> UploadAction<'a> {
    /// Fails unless `session` is logged in.
    pub fn new(session: &'a Session) -> Result<Self, ActionError> {
        session.gateway()?;
        Ok(Self {
            session,
            prefer_resumable: false,
        })
    }

    /// Uploads `size` bytes of `data` to `target` and returns its new metadata.
    pub async fn upload(
        &self,
        mut data: UploadData,
        size: u64,
        target: &str,
    ) -> Result<ResourceInfo, ActionError> {
        let target = target.trim();
        if target.is_empty() || target.ends_with('/') {
            return Err(ActionError::InvalidTarget(target.to_string()));
        }

        let files = FileOperationsAction::new(self.session)?;
        files.make_path(paths::parent(target)).await?;

        let (gateway, ctx) = self.session.gateway()?;
        let req = InitiateFileUploadRequest::for_path(target, size);
        let resp = ctx.run(gateway.initiate_file_upload(ctx, req)).await?;
        check_rpc_status("initiating upload", &resp.status)?;
        let endpoint = resp.endpoint;

        let transfer = self.session.transfer_context();
        let client = select_upload_client(&transfer, &endpoint, self.prefer_resumable)?;

        let checksum = if client.accepts_checksum() {
            negotiate_checksum(&endpoint.available_checksums, &mut data)
                .await
                .map_err(TransferError::from)?
        } else {
            ChecksumSelection::none()
        };
        debug!(
            %target,
            protocol = %client.protocol(),
            checksum_type = %checksum.checksum_type,
            "sending payload"
        );

        client.write(data, size, target, &checksum).await?;
        info!(%target, bytes = size, protocol = %client.protocol(), "upload complete");

        files
            .stat(target)
            .await
            .map_err(|e| ActionError::Verification {
                path: target.to_string(),
                source: Box::new(e),
            })
    }

    /// Uploads an in-memory buffer.
    pub async fn upload_bytes(
        &self,
        data: impl Into<Vec<u8>>,
        target: &str,
    ) -> Result<ResourceInfo, ActionError> {
        let data = data.into();
        let size = data.len() as u64;
        self.upload(UploadData::from_bytes(data), size, target).await
    }

    /// Uploads a local file.
    pub async fn upload_file(
        &self,
        local_path: &Path,
        target: &str,
    ) -> Result<ResourceInfo, ActionError> {
        let file = tokio::fs::File::open(local_path).await?;
        let size = file.metadata().await?.len();
        debug!(path = %local_path.display(), size, "uploading local file");
        self.upload(UploadData::from_file(file), size, target).await
    }
}
