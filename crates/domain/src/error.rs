use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScreeningError>;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Distinguishes the three ways an upstream bios/opportunities lookup can
/// go wrong, so the HTTP boundary can map them to 422/502/503 respectively
/// while the rest of the codebase still matches on one `UpstreamFailure`
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailureKind {
    /// The upstream responded but the payload was missing fields or
    /// otherwise unusable.
    UnusableResponse,
    /// The upstream responded with a 5xx status.
    ServerError,
    /// The request never got a response: connect/timeout/DNS failure.
    Transport,
}

/// Shared error taxonomy for the screening domain. Individual crates return
/// this type at their public seams rather than declaring their own enum, so
/// the mapping to HTTP status codes and close codes lives in one place.
#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream failure: {1}")]
    UpstreamFailure(UpstreamFailureKind, String),

    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("fatal: {0}")]
    Fatal(String),
}

impl ScreeningError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::UpstreamFailure(_, _) => "upstream_failure",
            Self::BrokerUnavailable(_) => "broker_unavailable",
            Self::InvalidEnvelope(_) => "invalid_envelope",
            Self::Transient(_) => "transient",
            Self::Fatal(_) => "fatal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamFailure(UpstreamFailureKind::UnusableResponse, _) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::UpstreamFailure(UpstreamFailureKind::ServerError, _) => StatusCode::BAD_GATEWAY,
            Self::UpstreamFailure(UpstreamFailureKind::Transport, _) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::BrokerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidEnvelope(_) => StatusCode::BAD_REQUEST,
            Self::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ScreeningError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Fatal(_)) {
            tracing::error!(error = %self, "fatal_error");
        }

        let body = Json(ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
        });

        (self.status(), body).into_response()
    }
}
