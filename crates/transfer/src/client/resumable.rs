//! tus 1.0.0 creation and sequential `PATCH` uploads.

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use tokio::io::AsyncReadExt;
use tracing::debug;

use super::{Protocol, expect_status, send};
use crate::TransferError;
use crate::checksum::ChecksumSelection;
use crate::context::TransferContext;
use crate::data::UploadData;
use storegate_protocol::TransferEndpoint;

const TUS_VERSION: &str = "1.0.0";
const TUS_RESUMABLE: &str = "Tus-Resumable";
const UPLOAD_LENGTH: &str = "Upload-Length";
const UPLOAD_OFFSET: &str = "Upload-Offset";
const UPLOAD_METADATA: &str = "Upload-Metadata";
const OFFSET_CONTENT_TYPE: &str = "application/offset+octet-stream";

/// Resumable upload client. Upload only.
#[derive(Debug, Clone)]
pub struct ResumableUploadClient {
    ctx: TransferContext,
    endpoint: String,
    token: String,
}

impl ResumableUploadClient {
    /// Uses the resumable session token when the endpoint carries one.
    pub fn new(ctx: &TransferContext, endpoint: &TransferEndpoint) -> Self {
        let token = endpoint
            .resumable_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&endpoint.token)
            .to_string();
        Self {
            ctx: ctx.clone(),
            endpoint: endpoint.endpoint.clone(),
            token,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        self.ctx
            .authorize(request, &self.token)
            .header(TUS_RESUMABLE, TUS_VERSION)
    }

    /// Creates the upload and sends `data` in `chunk_size` pieces.
    pub async fn write(
        &self,
        mut data: UploadData,
        size: u64,
        target: &str,
        checksum: &ChecksumSelection,
    ) -> Result<(), TransferError> {
        let location = self.create(size, target, checksum).await?;
        debug!(endpoint = %self.endpoint, %location, size, "resumable upload created");

        let mut offset: u64 = 0;
        while offset < size {
            if self.ctx.cancel.is_cancelled() {
                return Err(TransferError::Cancelled);
            }

            let want = (size - offset).min(self.ctx.chunk_size as u64);
            let mut chunk = Vec::with_capacity(want as usize);
            (&mut data).take(want).read_to_end(&mut chunk).await?;
            if chunk.is_empty() {
                return Err(TransferError::execution(
                    &self.endpoint,
                    Protocol::Resumable,
                    format!("data ended at offset {offset} of {size}"),
                ));
            }

            offset = self.patch(&location, offset, chunk).await?;
        }

        debug!(endpoint = %self.endpoint, bytes = offset, "resumable upload complete");
        Ok(())
    }

    async fn create(
        &self,
        size: u64,
        target: &str,
        checksum: &ChecksumSelection,
    ) -> Result<reqwest::Url, TransferError> {
        let request = self
            .authorize(self.ctx.http.post(&self.endpoint))
            .header(UPLOAD_LENGTH, size)
            .header(UPLOAD_METADATA, upload_metadata(target, checksum));

        let response = send(&self.ctx, request, &self.endpoint, Protocol::Resumable).await?;
        expect_status(
            &response,
            &[StatusCode::CREATED],
            &self.endpoint,
            Protocol::Resumable,
        )?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                TransferError::execution(
                    &self.endpoint,
                    Protocol::Resumable,
                    "creation response has no Location header",
                )
            })?;
        response
            .url()
            .join(location)
            .map_err(|e| TransferError::execution(&self.endpoint, Protocol::Resumable, e))
    }

    /// Sends one chunk at `offset` and returns the server's new offset.
    async fn patch(
        &self,
        location: &reqwest::Url,
        offset: u64,
        chunk: Vec<u8>,
    ) -> Result<u64, TransferError> {
        let expected = offset + chunk.len() as u64;
        let request = self
            .authorize(self.ctx.http.patch(location.clone()))
            .header(UPLOAD_OFFSET, offset)
            .header(CONTENT_TYPE, OFFSET_CONTENT_TYPE)
            .body(chunk);

        let response = send(&self.ctx, request, &self.endpoint, Protocol::Resumable).await?;
        expect_status(
            &response,
            &[StatusCode::NO_CONTENT, StatusCode::OK],
            &self.endpoint,
            Protocol::Resumable,
        )?;

        let reported = response
            .headers()
            .get(UPLOAD_OFFSET)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        match reported {
            Some(n) if n == expected => Ok(n),
            Some(n) => Err(TransferError::execution(
                &self.endpoint,
                Protocol::Resumable,
                format!("server reported offset {n}, expected {expected}"),
            )),
            None => Err(TransferError::execution(
                &self.endpoint,
                Protocol::Resumable,
                "PATCH response has no valid Upload-Offset",
            )),
        }
    }
}

/// Builds the `Upload-Metadata` header: comma-separated `key base64(value)`.
fn upload_metadata(target: &str, checksum: &ChecksumSelection) -> String {
    let (dir, filename) = match target.rfind('/') {
        Some(0) => ("/", &target[1..]),
        Some(i) => (&target[..i], &target[i + 1..]),
        None => ("", target),
    };

    let mut pairs = vec![
        format!("filename {}", STANDARD.encode(filename)),
        format!("dir {}", STANDARD.encode(dir)),
    ];
    if !checksum.is_empty() {
        let value = format!("{} {}", checksum.checksum_type.name(), checksum.digest);
        pairs.push(format!("checksum {}", STANDARD.encode(value)));
    }
    pairs.join(",")
}
