//! Request-level error taxonomy and its mapping onto HTTP responses.

use std::path::PathBuf;

use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::relay::upstream::UpstreamError;
use crate::security::{Forbidden, InvalidTarget, RelayKind};

/// Every way a request can end without a relayed or served body.
///
/// Client-facing bodies are fixed strings; details stay in the logs.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] InvalidTarget),

    #[error("missing types parameter")]
    MissingTypes,

    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),

    #[error("{kind} upstream failed: {source}")]
    Upstream {
        kind: RelayKind,
        #[source]
        source: UpstreamError,
    },

    #[error("failed to read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidTarget(_) | RelayError::MissingTypes => StatusCode::BAD_REQUEST,
            RelayError::Forbidden(_) => StatusCode::FORBIDDEN,
            RelayError::NotFound(_) => StatusCode::NOT_FOUND,
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Upstream { .. } | RelayError::FileRead { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Plain-text body sent to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            RelayError::InvalidTarget(_) => "Invalid target",
            RelayError::MissingTypes => "Missing types",
            RelayError::Forbidden(_) => "Forbidden",
            RelayError::NotFound(_) => "404 Not Found",
            RelayError::MethodNotAllowed(_) => "Method not allowed",
            RelayError::Upstream {
                kind: RelayKind::Audio,
                ..
            } => "Proxy failed",
            RelayError::Upstream {
                kind: RelayKind::Api,
                ..
            } => "API proxy failed",
            RelayError::FileRead { .. } => "Internal Server Error",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            RelayError::Upstream { kind, source } => {
                tracing::error!(kind = %kind, error = %source, "Upstream request failed");
            }
            RelayError::FileRead { .. } => {
                tracing::error!(error = %self, "Static file read failed");
            }
            RelayError::Forbidden(_) => tracing::warn!(error = %self, "Rejected request"),
            _ => tracing::debug!(error = %self, "Rejected request"),
        }

        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain")],
            self.client_message(),
        )
            .into_response()
    }
}
