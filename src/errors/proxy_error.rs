use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// External collaborator that failed during a transcription request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    ObjectStore,
    JobService,
    ResultFetch,
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dependency::ObjectStore => write!(f, "object store"),
            Dependency::JobService => write!(f, "transcription job service"),
            Dependency::ResultFetch => write!(f, "transcript result fetch"),
        }
    }
}

/// Every way a transcription request can fail.
///
/// All variants collapse into the same `{"error": message}` body at the HTTP
/// boundary; only the status code differs.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Malformed request body or audio encoding. Caller fault.
    #[error("Invalid request: {0}")]
    Input(String),

    /// Request body exceeded the configured size limit.
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    /// An object store, job service or result fetch call failed.
    #[error("{service} error: {message}")]
    Dependency {
        service: Dependency,
        message: String,
    },

    /// The job service reported the job as failed.
    #[error("Transcription failed: {reason}")]
    JobFailed { reason: String },

    /// The poll loop ran out of budget without a terminal job state.
    #[error("Transcription timeout after {max_wait_secs} seconds")]
    Timeout { max_wait_secs: u64 },

    /// The transcript document was absent or malformed.
    #[error("Invalid transcript result: {0}")]
    ResultParse(String),

    /// The request task panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProxyResult<T> = Result<T, ProxyError>;

impl ProxyError {
    pub fn dependency(service: Dependency, message: impl Into<String>) -> Self {
        ProxyError::Dependency {
            service,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Input(_) => StatusCode::BAD_REQUEST,
            ProxyError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Dependency { .. }
            | ProxyError::JobFailed { .. }
            | ProxyError::ResultParse(_)
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(json!({
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
