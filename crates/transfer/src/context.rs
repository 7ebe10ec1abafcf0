use tokio_util::sync::CancellationToken;

use crate::DEFAULT_CHUNK_SIZE;
use storegate_protocol::constants::{ACCESS_TOKEN_HEADER, TRANSPORT_TOKEN_HEADER};

/// Shared state handed to every [`TransferClient`](crate::TransferClient).
#[derive(Debug, Clone)]
pub struct TransferContext {
    pub http: reqwest::Client,
    /// Session access token; empty when unauthenticated.
    pub access_token: String,
    pub cancel: CancellationToken,
    /// Maximum body size of one resumable-upload `PATCH`.
    pub chunk_size: usize,
}

impl TransferContext {
    pub fn new(http: reqwest::Client, access_token: impl Into<String>) -> Self {
        Self {
            http,
            access_token: access_token.into(),
            cancel: CancellationToken::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets the resumable chunk size; zero keeps the current value.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        if chunk_size > 0 {
            self.chunk_size = chunk_size;
        }
        self
    }

    /// Adds the access and transport token headers; empty tokens are left out.
    pub fn authorize(
        &self,
        mut request: reqwest::RequestBuilder,
        transport_token: &str,
    ) -> reqwest::RequestBuilder {
        if !self.access_token.is_empty() {
            request = request.header(ACCESS_TOKEN_HEADER, &self.access_token);
        }
        if !transport_token.is_empty() {
            request = request.header(TRANSPORT_TOKEN_HEADER, transport_token);
        }
        request
    }
}
