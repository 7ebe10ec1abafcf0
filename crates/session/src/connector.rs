use std::sync::Arc;

use storegate_protocol::{CallFuture, GatewayApi};

/// Dials the control-plane channel for a host.
///
/// `insecure` selects a plaintext channel instead of TLS. Implementations
/// perform a single attempt; retries are up to the caller.
pub trait Connector: Send + Sync {
    fn connect<'a>(
        &'a self,
        host: &'a str,
        insecure: bool,
    ) -> CallFuture<'a, Arc<dyn GatewayApi>>;
}
