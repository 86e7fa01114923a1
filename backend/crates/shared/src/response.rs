//! Response Envelope
//!
//! Every endpoint, and every rejection emitted by the request gate, answers
//! with the same JSON shape:
//!
//! ```json
//! { "status": "success" | "error", "message": "...", "data": ..., "token": "..." }
//! ```
//!
//! `token` is only present when a handler hands out a credential.

use serde::Serialize;

/// Outcome tag of the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// JSON response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: ResponseStatus,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: "OK".to_string(),
            data: Some(data),
            token: None,
        }
    }

    /// Attach an issued token to a successful response
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl ApiResponse<()> {
    /// Error response; `data` is always `null`
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            data: None,
            token: None,
        }
    }
}
