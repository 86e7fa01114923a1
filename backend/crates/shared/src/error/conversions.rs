//! Error conversions - HTTP rendering for [`AppError`] and [`ApiResponse`]
//!
//! Feature-gated behind `axum`.

#[cfg(feature = "axum")]
use crate::response::ApiResponse;

#[cfg(feature = "axum")]
use super::app_error::AppError;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(ApiResponse::error(self.public_message()))).into_response()
    }
}

#[cfg(feature = "axum")]
impl<T: serde::Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self).into_response()
    }
}
