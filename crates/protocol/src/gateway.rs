//! Gateway stub interface and per-call context.
//!
//! `GatewayApi` mirrors the generated control-plane client. Keeping it a
//! trait lets the session and actions run against in-memory fakes.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::constants::ACCESS_TOKEN_HEADER;
use crate::messages::{
    AuthenticateRequest, AuthenticateResponse, CreateContainerRequest, CreateContainerResponse,
    DeleteRequest, DeleteResponse, InitiateFileDownloadRequest, InitiateFileDownloadResponse,
    InitiateFileUploadRequest, InitiateFileUploadResponse, ListAuthProvidersResponse,
    ListContainerRequest, ListContainerResponse, MoveRequest, MoveResponse, StatRequest,
    StatResponse,
};

/// Failure of the call itself, before any status was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("channel unavailable: {0}")]
    Unavailable(String),

    #[error("call cancelled")]
    Cancelled,

    #[error("call failed: {0}")]
    Failed(String),
}

/// Boxed future returned by every [`GatewayApi`] method.
pub type CallFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CallError>> + Send + 'a>>;

/// Outgoing metadata and cancellation shared by every call on a session.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    metadata: Vec<(String, String)>,
    cancel: CancellationToken,
}

impl CallContext {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            metadata: Vec::new(),
            cancel,
        }
    }

    /// Returns a copy of this context with `key: value` appended to the metadata.
    pub fn with_metadata(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut ctx = self.clone();
        ctx.metadata.push((key.into(), value.into()));
        ctx
    }

    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// Last value stored under `key`.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The access token attached at login, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.metadata_value(ACCESS_TOKEN_HEADER)
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs `fut` unless the context is cancelled first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, CallError>
    where
        F: Future<Output = Result<T, CallError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CallError::Cancelled),
            result = fut => result,
        }
    }
}

/// Control-plane client for the storage gateway.
pub trait GatewayApi: Send + Sync {
    fn list_auth_providers<'a>(
        &'a self,
        ctx: &'a CallContext,
    ) -> CallFuture<'a, ListAuthProvidersResponse>;

    fn authenticate<'a>(
        &'a self,
        ctx: &'a CallContext,
        req: AuthenticateRequest,
    ) -> CallFuture<'a, AuthenticateResponse>;

    fn stat<'a>(&'a self, ctx: &'a CallContext, req: StatRequest) -> CallFuture<'a, StatResponse>;

    fn create_container<'a>(
        &'a self,
        ctx: &'a CallContext,
        req: CreateContainerRequest,
    ) -> CallFuture<'a, CreateContainerResponse>;

    fn delete<'a>(
        &'a self,
        ctx: &'a CallContext,
        req: DeleteRequest,
    ) -> CallFuture<'a, DeleteResponse>;

    fn move_resource<'a>(
        &'a self,
        ctx: &'a CallContext,
        req: MoveRequest,
    ) -> CallFuture<'a, MoveResponse>;

    fn list_container<'a>(
        &'a self,
        ctx: &'a CallContext,
        req: ListContainerRequest,
    ) -> CallFuture<'a, ListContainerResponse>;

    fn initiate_file_upload<'a>(
        &'a self,
        ctx: &'a CallContext,
        req: InitiateFileUploadRequest,
    ) -> CallFuture<'a, InitiateFileUploadResponse>;

    fn initiate_file_download<'a>(
        &'a self,
        ctx: &'a CallContext,
        req: InitiateFileDownloadRequest,
    ) -> CallFuture<'a, InitiateFileDownloadResponse>;
}
