//! Control-plane request and response messages.

use serde::{Deserialize, Serialize};

use crate::constants::UPLOAD_LENGTH_KEY;
use crate::opaque::Opaque;
use crate::rpc::Status;
use crate::types::{Reference, ResourceInfo, TransferEndpoint};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListAuthProvidersResponse {
    pub status: Status,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    #[serde(rename = "type")]
    pub method: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticateResponse {
    pub status: Status,
    #[serde(default)]
    pub token: String,
}

// ---------------------------------------------------------------------------
// Resource metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRequest {
    pub reference: Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ResourceInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateContainerRequest {
    pub reference: Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateContainerResponse {
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub reference: Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub source: Reference,
    pub destination: Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListContainerRequest {
    pub reference: Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListContainerResponse {
    pub status: Status,
    #[serde(default)]
    pub infos: Vec<ResourceInfo>,
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiateFileUploadRequest {
    pub reference: Reference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opaque: Option<Opaque>,
}

impl InitiateFileUploadRequest {
    /// Builds an upload request announcing `size` via the `Upload-Length` key.
    pub fn for_path(path: impl Into<String>, size: u64) -> Self {
        Self {
            reference: Reference::path(path),
            opaque: Some(Opaque::new().with_plain(UPLOAD_LENGTH_KEY, size.to_string())),
        }
    }

    /// Returns the announced upload length, if present and parseable.
    pub fn upload_length(&self) -> Option<u64> {
        self.opaque
            .as_ref()?
            .get(UPLOAD_LENGTH_KEY)?
            .decode_plain(UPLOAD_LENGTH_KEY)
            .ok()?
            .parse()
            .ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiateFileUploadResponse {
    pub status: Status,
    #[serde(flatten)]
    pub endpoint: TransferEndpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiateFileDownloadRequest {
    pub reference: Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiateFileDownloadResponse {
    pub status: Status,
    #[serde(flatten)]
    pub endpoint: TransferEndpoint,
}
