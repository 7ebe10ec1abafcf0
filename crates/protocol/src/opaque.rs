//! Opaque key/value side channel attached to control-plane messages.
//!
//! Each entry carries a decoder name and raw bytes. Only the
//! [`PLAIN_DECODER`] is understood by this client.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::PLAIN_DECODER;

/// Errors from [`decode_opaque`] and [`OpaqueEntry::decode_plain`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpaqueError {
    #[error("missing opaque key '{0}'")]
    MissingKey(String),

    #[error("unsupported opaque decoder '{decoder}' for key '{key}'")]
    UnsupportedDecoder { key: String, decoder: String },

    #[error("opaque value for key '{0}' is not valid UTF-8")]
    InvalidValue(String),
}

/// A single opaque entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueEntry {
    pub decoder: String,
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
}

impl OpaqueEntry {
    /// Creates a `plain` entry holding `value`.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            decoder: PLAIN_DECODER.to_string(),
            value: value.into().into_bytes(),
        }
    }

    /// `true` if the decoder is `plain` (case-insensitive).
    pub fn is_plain(&self) -> bool {
        self.decoder.eq_ignore_ascii_case(PLAIN_DECODER)
    }

    /// Decodes a plain entry into a string.
    pub fn decode_plain(&self, key: &str) -> Result<String, OpaqueError> {
        if !self.is_plain() {
            return Err(OpaqueError::UnsupportedDecoder {
                key: key.to_string(),
                decoder: self.decoder.clone(),
            });
        }
        String::from_utf8(self.value.clone()).map_err(|_| OpaqueError::InvalidValue(key.to_string()))
    }
}

/// Server-supplied key/value map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Opaque {
    #[serde(default)]
    pub map: HashMap<String, OpaqueEntry>,
}

impl Opaque {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `plain` entry, replacing any existing one.
    pub fn with_plain(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.map.insert(key.into(), OpaqueEntry::plain(value));
        self
    }

    /// Adds an entry with an explicit decoder.
    pub fn with_entry(mut self, key: impl Into<String>, entry: OpaqueEntry) -> Self {
        self.map.insert(key.into(), entry);
        self
    }

    pub fn get(&self, key: &str) -> Option<&OpaqueEntry> {
        self.map.get(key)
    }
}

/// Decodes `required_keys` from `opaque`.
///
/// Missing keys fail with [`OpaqueError::MissingKey`]. A non-plain decoder
/// fails when `strict` is set and skips the key otherwise.
pub fn decode_opaque(
    opaque: &Opaque,
    required_keys: &[&str],
    strict: bool,
) -> Result<HashMap<String, String>, OpaqueError> {
    let mut decoded = HashMap::with_capacity(required_keys.len());
    for key in required_keys {
        let entry = opaque
            .get(key)
            .ok_or_else(|| OpaqueError::MissingKey((*key).to_string()))?;
        match entry.decode_plain(key) {
            Ok(value) => {
                decoded.insert((*key).to_string(), value);
            }
            Err(OpaqueError::UnsupportedDecoder { .. }) if !strict => {}
            Err(e) => return Err(e),
        }
    }
    Ok(decoded)
}

/// Base64 serde for opaque byte values.
mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
