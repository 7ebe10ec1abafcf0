//! Typed decoding of the combined-protocol transport hints.

use storegate_protocol::constants::{COMBINED_PATH_KEY, COMBINED_TOKEN_KEY};
use storegate_protocol::{Opaque, OpaqueError, decode_opaque};

/// Why the combined protocol cannot be used for an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NegotiationError {
    /// The endpoint does not offer the transport; callers fall back.
    #[error("transport not offered by endpoint: {0}")]
    Unsupported(String),

    /// The hints are present but unusable; callers abort.
    #[error("malformed transport hint: {0}")]
    Malformed(String),
}

impl NegotiationError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, NegotiationError::Unsupported(_))
    }
}

/// Validated combined-protocol hints: session token and target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedProtocolHints {
    pub token: String,
    pub file_path: String,
}

impl CombinedProtocolHints {
    /// Decodes both reserved keys with the `plain` decoder.
    pub fn from_opaque(opaque: Option<&Opaque>) -> Result<Self, NegotiationError> {
        let Some(opaque) = opaque else {
            return Err(NegotiationError::Unsupported("no opaque hints".into()));
        };

        let mut decoded = decode_opaque(opaque, &[COMBINED_TOKEN_KEY, COMBINED_PATH_KEY], true)
            .map_err(|e| match e {
                OpaqueError::MissingKey(_) => NegotiationError::Unsupported(e.to_string()),
                other => NegotiationError::Malformed(other.to_string()),
            })?;

        let token = decoded.remove(COMBINED_TOKEN_KEY).unwrap_or_default();
        let file_path = decoded.remove(COMBINED_PATH_KEY).unwrap_or_default();
        if token.is_empty() {
            return Err(NegotiationError::Malformed(format!(
                "empty value for '{COMBINED_TOKEN_KEY}'"
            )));
        }
        if file_path.is_empty() {
            return Err(NegotiationError::Malformed(format!(
                "empty value for '{COMBINED_PATH_KEY}'"
            )));
        }

        Ok(Self { token, file_path })
    }
}
