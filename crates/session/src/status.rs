use storegate_protocol::{Code, Status};

/// A control-plane call returned a non-OK status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error while {operation}: {message} (code {code}, trace {trace:?})")]
pub struct RpcError {
    pub operation: String,
    pub message: String,
    pub code: Code,
    pub trace: String,
}

impl RpcError {
    pub fn is_code(&self, code: Code) -> bool {
        self.code == code
    }
}

/// Maps `status` to a result. Only [`Code::Ok`] succeeds.
pub fn check_rpc_status(operation: &str, status: &Status) -> Result<(), RpcError> {
    if status.is_ok() {
        return Ok(());
    }
    Err(RpcError {
        operation: operation.to_string(),
        message: status.message.clone(),
        code: status.code,
        trace: status.trace.clone(),
    })
}
