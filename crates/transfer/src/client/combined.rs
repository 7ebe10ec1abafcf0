use reqwest::StatusCode;
use reqwest::header::CONTENT_LENGTH;
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::{Protocol, expect_status, read_body, send};
use crate::TransferError;
use crate::context::TransferContext;
use crate::data::UploadData;
use crate::hints::CombinedProtocolHints;
use storegate_protocol::constants::{ACCESS_TOKEN_HEADER, UPLOAD_LENGTH_KEY};

/// WebDAV-style client addressing the hinted file path under the endpoint.
#[derive(Debug, Clone)]
pub struct CombinedProtocolClient {
    ctx: TransferContext,
    endpoint: String,
    file_url: String,
    token: String,
}

impl CombinedProtocolClient {
    pub fn new(ctx: &TransferContext, endpoint: &str, hints: CombinedProtocolHints) -> Self {
        let file_url = format!(
            "{}/{}",
            endpoint.trim_end_matches('/'),
            hints.file_path.trim_start_matches('/')
        );
        Self {
            ctx: ctx.clone(),
            endpoint: endpoint.to_string(),
            file_url,
            token: hints.token,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full URL of the hinted file.
    pub fn file_url(&self) -> &str {
        &self.file_url
    }

    /// Uploads `data`; zero-length payloads are written as well.
    pub async fn write(&self, data: UploadData, size: u64) -> Result<(), TransferError> {
        let request = self
            .ctx
            .http
            .put(&self.file_url)
            .header(ACCESS_TOKEN_HEADER, &self.token)
            .header(UPLOAD_LENGTH_KEY, size)
            .header(CONTENT_LENGTH, size)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(data)));

        let response = send(&self.ctx, request, &self.endpoint, Protocol::Combined).await?;
        expect_status(
            &response,
            &[StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT],
            &self.endpoint,
            Protocol::Combined,
        )?;
        debug!(url = %self.file_url, bytes = size, "WebDAV upload complete");
        Ok(())
    }

    pub async fn read(&self) -> Result<Vec<u8>, TransferError> {
        let request = self
            .ctx
            .http
            .get(&self.file_url)
            .header(ACCESS_TOKEN_HEADER, &self.token);
        let response = send(&self.ctx, request, &self.endpoint, Protocol::Combined).await?;
        expect_status(&response, &[StatusCode::OK], &self.endpoint, Protocol::Combined)?;
        read_body(&self.ctx, response, &self.endpoint, Protocol::Combined).await
    }
}
