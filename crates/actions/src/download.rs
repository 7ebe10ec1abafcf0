use tracing::info;

use storegate_protocol::messages::InitiateFileDownloadRequest;
use storegate_protocol::ResourceInfo;
use storegate_session::{Session, check_rpc_status};
use storegate_transfer::select_download_client;

use crate::error::ActionError;
use crate::fileops::FileOperationsAction;

/// Downloads whole files into memory.
#[derive(Debug, Clone, Copy)]
pub struct DownloadAction<'a> {
    session: &'a Session,
}

impl<'a> DownloadAction<'a> {
    /// Fails unless `session` is logged in.
    pub fn new(session: &'a Session) -> Result<Self, ActionError> {
        session.gateway()?;
        Ok(Self { session })
    }

    /// Downloads the file described by `info`, by path or else by id.
    ///
    /// A failed read is returned as is; only an endpoint without
    /// combined-protocol hints is served over direct HTTP instead.
    pub async fn download_file(&self, info: &ResourceInfo) -> Result<Vec<u8>, ActionError> {
        if !info.is_file() {
            return Err(ActionError::NotAFile(info.path.clone()));
        }
        let reference = info
            .reference()
            .ok_or_else(|| ActionError::InvalidTarget(info.path.clone()))?;

        let (gateway, ctx) = self.session.gateway()?;
        let req = InitiateFileDownloadRequest {
            reference: reference.clone(),
        };
        let resp = ctx.run(gateway.initiate_file_download(ctx, req)).await?;
        check_rpc_status("initiating download", &resp.status)?;

        let transfer = self.session.transfer_context();
        let client = select_download_client(&transfer, &resp.endpoint)?;
        let data = client.read().await?;

        info!(
            resource = %reference,
            bytes = data.len(),
            protocol = %client.protocol(),
            "download complete"
        );
        Ok(data)
    }

    /// Stats `path` and downloads it.
    pub async fn download_file_by_path(&self, path: &str) -> Result<Vec<u8>, ActionError> {
        let info = FileOperationsAction::new(self.session)?.stat(path).await?;
        self.download_file(&info).await
    }
}
