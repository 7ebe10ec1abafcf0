use std::fmt;

use serde::{Deserialize, Serialize};

use crate::opaque::Opaque;

/// Identifies a resource on the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Reference {
    Path(String),
    Id { storage_id: String, opaque_id: String },
}

impl Reference {
    pub fn path(path: impl Into<String>) -> Self {
        Reference::Path(path.into())
    }

    /// Parses a `storage:opaque` resource id; an id without a storage part
    /// keeps the whole string as the opaque id.
    pub fn from_id(id: &str) -> Self {
        let (storage_id, opaque_id) = id.split_once(':').unwrap_or(("", id));
        Reference::Id {
            storage_id: storage_id.to_string(),
            opaque_id: opaque_id.to_string(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Path(p) => f.write_str(p),
            Reference::Id {
                storage_id,
                opaque_id,
            } => write!(f, "{storage_id}:{opaque_id}"),
        }
    }
}

/// Kind of a stored resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    #[default]
    Invalid,
    File,
    Container,
    Reference,
    Symlink,
    Internal,
}

impl ResourceType {
    /// `true` for the types a listing reports (files, containers, references, symlinks).
    pub fn is_listable(&self) -> bool {
        matches!(
            self,
            ResourceType::File
                | ResourceType::Container
                | ResourceType::Reference
                | ResourceType::Symlink
        )
    }
}

/// Metadata describing a stored resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub path: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    /// Modification time in seconds since the Unix epoch.
    #[serde(default)]
    pub mtime: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ResourceChecksum>,
}

impl ResourceInfo {
    pub fn is_file(&self) -> bool {
        self.resource_type == ResourceType::File
    }

    pub fn is_container(&self) -> bool {
        self.resource_type == ResourceType::Container
    }

    /// Path reference when the path is known, else an id reference.
    pub fn reference(&self) -> Option<Reference> {
        if !self.path.trim().is_empty() {
            Some(Reference::path(self.path.as_str()))
        } else if !self.id.trim().is_empty() {
            Some(Reference::from_id(&self.id))
        } else {
            None
        }
    }
}

/// Checksum stored alongside a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceChecksum {
    #[serde(rename = "type")]
    pub checksum_type: ChecksumType,
    pub sum: String,
}

/// Checksum algorithms a transfer endpoint may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumType {
    /// No checksum; sent as an empty string.
    #[default]
    #[serde(rename = "", alias = "unset")]
    Unset,
    Adler32,
    Md5,
    Sha1,
    /// Any algorithm this client does not know.
    #[serde(other)]
    Invalid,
}

impl ChecksumType {
    /// Name sent on the data plane; empty for [`ChecksumType::Unset`].
    pub fn name(&self) -> &'static str {
        match self {
            ChecksumType::Unset => "",
            ChecksumType::Adler32 => "adler32",
            ChecksumType::Md5 => "md5",
            ChecksumType::Sha1 => "sha1",
            ChecksumType::Invalid => "invalid",
        }
    }

    /// Parses a data-plane name; unknown names return `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "" | "unset" => Some(ChecksumType::Unset),
            "adler32" => Some(ChecksumType::Adler32),
            "md5" => Some(ChecksumType::Md5),
            "sha1" => Some(ChecksumType::Sha1),
            "invalid" => Some(ChecksumType::Invalid),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        *self == ChecksumType::Unset
    }
}

impl fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumType::Unset => f.write_str("unset"),
            other => f.write_str(other.name()),
        }
    }
}

/// A checksum algorithm offered by the server; lower priority values win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecksumPriority {
    #[serde(rename = "type")]
    pub checksum_type: ChecksumType,
    pub priority: u32,
}

impl ChecksumPriority {
    pub fn new(checksum_type: ChecksumType, priority: u32) -> Self {
        Self {
            checksum_type,
            priority,
        }
    }
}

/// Data-plane target returned by an initiate-transfer call.
///
/// Single-use: consumed by exactly one upload or download.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEndpoint {
    pub endpoint: String,
    /// Short-lived transport token scoped to `endpoint`.
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumable_token: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_checksums: Vec<ChecksumPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opaque: Option<Opaque>,
}
