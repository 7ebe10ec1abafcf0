use std::fmt;

use serde::{Deserialize, Serialize};

/// Status codes returned by every control-plane call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
    InsufficientStorage,
    Redirection,
}

impl Code {
    /// All known codes, in wire order.
    pub const ALL: [Code; 19] = [
        Code::Ok,
        Code::Cancelled,
        Code::Unknown,
        Code::InvalidArgument,
        Code::DeadlineExceeded,
        Code::NotFound,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::ResourceExhausted,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::Internal,
        Code::Unavailable,
        Code::DataLoss,
        Code::Unauthenticated,
        Code::InsufficientStorage,
        Code::Redirection,
    ];

    /// Prefixed name used in logs and error messages (`CODE_OK`,
    /// `CODE_NOT_FOUND`, ...). The JSON form is the unprefixed variant name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "CODE_OK",
            Code::Cancelled => "CODE_CANCELLED",
            Code::Unknown => "CODE_UNKNOWN",
            Code::InvalidArgument => "CODE_INVALID_ARGUMENT",
            Code::DeadlineExceeded => "CODE_DEADLINE_EXCEEDED",
            Code::NotFound => "CODE_NOT_FOUND",
            Code::AlreadyExists => "CODE_ALREADY_EXISTS",
            Code::PermissionDenied => "CODE_PERMISSION_DENIED",
            Code::ResourceExhausted => "CODE_RESOURCE_EXHAUSTED",
            Code::FailedPrecondition => "CODE_FAILED_PRECONDITION",
            Code::Aborted => "CODE_ABORTED",
            Code::OutOfRange => "CODE_OUT_OF_RANGE",
            Code::Unimplemented => "CODE_UNIMPLEMENTED",
            Code::Internal => "CODE_INTERNAL",
            Code::Unavailable => "CODE_UNAVAILABLE",
            Code::DataLoss => "CODE_DATA_LOSS",
            Code::Unauthenticated => "CODE_UNAUTHENTICATED",
            Code::InsufficientStorage => "CODE_INSUFFICIENT_STORAGE",
            Code::Redirection => "CODE_REDIRECTION",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single control-plane call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: Code,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trace: String,
}

impl Status {
    /// A successful status with no message.
    pub fn ok() -> Self {
        Self {
            code: Code::Ok,
            message: String::new(),
            trace: String::new(),
        }
    }

    /// A status with the given code and message.
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace: String::new(),
        }
    }

    /// Attaches a server trace identifier.
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = trace.into();
        self
    }

    pub fn is_ok(&self) -> bool {
        self.code == Code::Ok
    }
}
