//! Authenticated session against the storage gateway.
//!
//! A [`Session`] owns the control-plane channel, the access token and the
//! call context. Every control-plane response passes through
//! [`check_rpc_status`] before its payload is used.

pub mod config;
pub mod connector;
pub mod error;
pub mod session;
pub mod status;

pub use config::{ConfigError, SessionConfig, default_config_path};
pub use connector::Connector;
pub use error::SessionError;
pub use session::Session;
pub use status::{RpcError, check_rpc_status};
