//! Gate Error Types
//!
//! Every variant carries operator-facing detail for the logs. The client only
//! ever sees the generic message of the variant's [`ErrorKind`], rendered in
//! the shared `kernel` envelope.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use jsonwebtoken::Algorithm;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::context::ClientIdentity;

/// Client-facing message for every 401
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Client-facing message for every 429
pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests";

/// Gate-specific result type alias
pub type GateResult<T> = Result<T, GateError>;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Authorization header is missing")]
    MissingAuthorization,

    #[error("Authorization header is not a bearer credential")]
    MalformedAuthorization,

    #[error("Token algorithm {0:?} is outside the accepted HMAC family")]
    UnsupportedAlgorithm(Algorithm),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token rejected: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Request signature header is missing")]
    MissingSignature,

    #[error("Header {0} is not valid UTF-8")]
    InvalidHeader(&'static str),

    #[error("Request signature does not match")]
    SignatureMismatch,

    /// Handler reached without passing the gate
    #[error("No verified request context")]
    UnverifiedContext,

    #[error("Client {client} exceeded its admission window, retry after {retry_after_secs}s")]
    RateLimited {
        client: ClientIdentity,
        retry_after_secs: u64,
    },

    #[error("Admission store failure: {0}")]
    AdmissionStore(String),

    #[error("Token could not be issued: {0}")]
    TokenIssue(#[source] jsonwebtoken::errors::Error),

    /// Unexpected fault caught at the isolation boundary
    #[error("Request {method} {path} faulted: {detail}")]
    Fault {
        method: String,
        path: String,
        detail: String,
    },
}

impl GateError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GateError::MissingAuthorization
            | GateError::MalformedAuthorization
            | GateError::UnsupportedAlgorithm(_)
            | GateError::TokenExpired
            | GateError::InvalidToken(_)
            | GateError::MissingSignature
            | GateError::InvalidHeader(_)
            | GateError::SignatureMismatch
            | GateError::UnverifiedContext => ErrorKind::Unauthorized,
            GateError::RateLimited { .. } => ErrorKind::TooManyRequests,
            GateError::AdmissionStore(_) | GateError::TokenIssue(_) | GateError::Fault { .. } => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Convert to AppError
    ///
    /// Client errors get a fixed message per kind. Server errors carry their
    /// detail, which the kernel's exposure rules keep out of the response.
    pub fn to_app_error(&self) -> AppError {
        match self.kind() {
            ErrorKind::Unauthorized => AppError::unauthorized(UNAUTHORIZED_MESSAGE),
            ErrorKind::TooManyRequests => AppError::too_many_requests(TOO_MANY_REQUESTS_MESSAGE),
            kind => AppError::new(kind, self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            GateError::Fault { .. } => {
                tracing::error!(error = %self, "Isolated request fault");
            }
            GateError::AdmissionStore(_) | GateError::TokenIssue(_) => {
                tracing::error!(error = %self, "Gate internal error");
            }
            GateError::UnsupportedAlgorithm(_) | GateError::SignatureMismatch => {
                tracing::warn!(error = %self, "Rejected suspicious credential");
            }
            GateError::RateLimited { client, .. } => {
                tracing::warn!(client = %client, "Admission rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Request rejected");
            }
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        self.log();
        let retry_after = match &self {
            GateError::RateLimited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        };

        let mut response = self.to_app_error().into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_status_codes() {
        assert_eq!(
            GateError::MissingAuthorization.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GateError::SignatureMismatch.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GateError::RateLimited {
                client: ClientIdentity::unknown(),
                retry_after_secs: 3,
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            GateError::Fault {
                method: "GET".to_string(),
                path: "/".to_string(),
                detail: "boom".to_string(),
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_variants_share_one_public_message() {
        for err in [
            GateError::MissingAuthorization,
            GateError::MalformedAuthorization,
            GateError::UnsupportedAlgorithm(Algorithm::RS256),
            GateError::TokenExpired,
            GateError::SignatureMismatch,
        ] {
            assert_eq!(err.to_app_error().public_message(), UNAUTHORIZED_MESSAGE);
        }
    }

    #[test]
    fn test_fault_detail_stays_internal() {
        let err = GateError::Fault {
            method: "POST".to_string(),
            path: "/api/v1/user/login".to_string(),
            detail: "index out of bounds".to_string(),
        };
        let app_err = err.to_app_error();
        assert!(app_err.message().contains("index out of bounds"));
        assert_eq!(app_err.public_message(), "Internal Server Error");
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = GateError::RateLimited {
            client: ClientIdentity::new("10.0.0.1"),
            retry_after_secs: 42,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
