//! Header names and reserved keys shared by the control and data planes.

/// Metadata key / HTTP header carrying the session access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// HTTP header carrying the per-endpoint transport token.
pub const TRANSPORT_TOKEN_HEADER: &str = "X-Reva-Transfer";

/// The only opaque decoder this client understands.
pub const PLAIN_DECODER: &str = "plain";

/// Opaque key announcing the payload size when initiating an upload.
pub const UPLOAD_LENGTH_KEY: &str = "Upload-Length";

/// Reserved hint key: token for the combined metadata+data protocol.
pub const COMBINED_TOKEN_KEY: &str = "webdav-token";

/// Reserved hint key: file path for the combined metadata+data protocol.
pub const COMBINED_PATH_KEY: &str = "webdav-file-path";

/// Login method name used by basic (user/password) authentication.
pub const BASIC_LOGIN_METHOD: &str = "basic";
