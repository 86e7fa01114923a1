//! Application Error
//!
//! [`AppError`] is what every failure becomes at the HTTP boundary, and
//! [`AppResult<T>`] is the matching result alias.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// Failure ready to be rendered into the response envelope
///
/// `message` is written for operators. What the client sees is decided by
/// [`AppError::public_message`].
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::unauthorized("Unauthorized");
/// assert_eq!(err.public_message(), "Unauthorized");
///
/// let err = AppError::new(ErrorKind::InternalServerError, "pool exhausted on shard 3");
/// assert_eq!(err.public_message(), "Internal Server Error");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 401, for every credential failure
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// 429, for admission rejections
    pub fn too_many_requests(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::TooManyRequests, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Message as constructed, possibly with internal detail
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message that may be sent to the client
    ///
    /// Kinds outside the exposure allow-list answer with their fixed reason
    /// phrase instead.
    pub fn public_message(&self) -> &str {
        if self.kind.is_exposed() {
            &self.message
        } else {
            self.kind.as_str()
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.status_code(), self.message)
    }
}

impl Error for AppError {}
