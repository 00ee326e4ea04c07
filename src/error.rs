//! Server error types with HTTP status code mapping.
//!
//! [`SyncError`] is the central error type. Each variant maps to a numeric
//! error code and, for the REST surface, a structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::diff::DiffError;
use crate::domain::PeerId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "peer not found: 7d9c...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code (see ranges on [`SyncError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                |
/// |-----------|------------------|----------------------------|
/// | 1000–1999 | Bad diffs        | 422 Unprocessable Entity   |
/// | 2000–2999 | Not-found        | 404 Not Found              |
/// | 3000–3999 | Server           | 500 Internal Server Error  |
/// | 4000–4999 | Delivery         | 503 Service Unavailable    |
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Peer with the given ID was never registered or is gone.
    #[error("peer not found: {0}")]
    PeerNotFound(uuid::Uuid),

    /// A diff did not fit the document it was applied to.
    #[error("diff rejected: {0}")]
    Diff(#[from] DiffError),

    /// The peer has no live connection on the transport.
    #[error("peer {peer_id} is not reachable")]
    PeerUnreachable {
        /// The unreachable peer.
        peer_id: PeerId,
    },

    /// The peer's outbound queue is full; it is not keeping up.
    #[error("outbound queue full for peer {peer_id}")]
    QueueFull {
        /// The backed-up peer.
        peer_id: PeerId,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Diff(_) => 1001,
            Self::PeerNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::PeerUnreachable { .. } => 4001,
            Self::QueueFull { .. } => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Diff(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PeerNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PeerUnreachable { .. } | Self::QueueFull { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
