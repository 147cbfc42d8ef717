//! Normalized failure type shared by the gateway, the aggregator and the
//! view layer.
//!
//! Every failure is distinguishable by [`ErrorKind`]; `detail` carries the
//! server's debug payload and is never part of [`ApiError::user_message`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Network failure, timeout, non-404 error status, undecodable body
    Transport,
    /// 404, also "this address has no cluster"
    NotFound,
    /// Rejected before any request was made
    Validation,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Validation => write!(f, "validation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status when the server answered
    pub status: Option<u16>,
    pub detail: Option<Value>,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            detail: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Build from a non-success HTTP answer and its (possibly empty) body
    pub fn from_response(status: u16, body: &str) -> Self {
        let kind = if status == 404 {
            ErrorKind::NotFound
        } else {
            ErrorKind::Transport
        };
        let envelope = serde_json::from_str::<ErrorEnvelope>(body).unwrap_or_default();
        let message = envelope
            .message
            .or_else(|| envelope.detail.as_ref().and_then(|d| d.as_str().map(str::to_string)))
            .unwrap_or_else(|| format!("http {status}"));
        let detail = envelope.detail.or(envelope.error).filter(|d| !d.is_null());

        Self {
            kind,
            message,
            status: Some(status),
            detail,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Text to show an end user. Never includes `detail`, except that a
    /// bare string `detail` from the server doubles as the message when
    /// the envelope carries no `message`.
    pub fn user_message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        let mut err = if e.is_timeout() {
            ApiError::transport(format!("request timed out: {e}"))
        } else if e.is_decode() {
            ApiError::transport(format!("invalid response body: {e}"))
        } else {
            ApiError::transport(e.to_string())
        };
        if let Some(status) = e.status() {
            err = err.with_status(status.as_u16());
        }
        err
    }
}

/// `{ message?, detail?, error?, status }` as emitted by the backend's
/// exception handlers
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}
