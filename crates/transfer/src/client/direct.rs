use reqwest::StatusCode;
use reqwest::header::CONTENT_LENGTH;
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::{Protocol, expect_status, read_body, send};
use crate::TransferError;
use crate::checksum::ChecksumSelection;
use crate::context::TransferContext;
use crate::data::UploadData;
use storegate_protocol::TransferEndpoint;

/// Plain HTTP `PUT`/`GET` against the endpoint URL.
#[derive(Debug, Clone)]
pub struct DirectHttpClient {
    ctx: TransferContext,
    endpoint: String,
    transport_token: String,
}

impl DirectHttpClient {
    pub fn new(ctx: &TransferContext, endpoint: &TransferEndpoint) -> Self {
        Self {
            ctx: ctx.clone(),
            endpoint: endpoint.endpoint.clone(),
            transport_token: endpoint.token.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        self.ctx.authorize(request, &self.transport_token)
    }

    /// Streams `data` in a single `PUT`.
    ///
    /// A selected checksum is sent as the `xs` and `xs_type` query parameters.
    pub async fn write(
        &self,
        data: UploadData,
        size: u64,
        checksum: &ChecksumSelection,
    ) -> Result<(), TransferError> {
        let mut request = self
            .authorize(self.ctx.http.put(&self.endpoint))
            .header(CONTENT_LENGTH, size);
        if !checksum.is_empty() {
            request = request.query(&[
                ("xs", checksum.digest.as_str()),
                ("xs_type", checksum.checksum_type.name()),
            ]);
        }
        let request = request.body(reqwest::Body::wrap_stream(ReaderStream::new(data)));

        let response = send(&self.ctx, request, &self.endpoint, Protocol::Direct).await?;
        expect_status(
            &response,
            &[StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT],
            &self.endpoint,
            Protocol::Direct,
        )?;
        debug!(endpoint = %self.endpoint, bytes = size, "HTTP upload complete");
        Ok(())
    }

    pub async fn read(&self) -> Result<Vec<u8>, TransferError> {
        let request = self.authorize(self.ctx.http.get(&self.endpoint));
        let response = send(&self.ctx, request, &self.endpoint, Protocol::Direct).await?;
        expect_status(&response, &[StatusCode::OK], &self.endpoint, Protocol::Direct)?;
        read_body(&self.ctx, response, &self.endpoint, Protocol::Direct).await
    }
}
