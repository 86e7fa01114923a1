//! Token Claims
//!
//! Payload carried inside a bearer token. Nothing here is trusted until the
//! token signature has been verified.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Identity of the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLogin {
    pub uuid: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user
    pub user: UserLogin,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Claims for `user`, valid for `ttl` from now
    pub fn new(user: UserLogin, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            user,
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
        }
    }

    pub fn user_uuid(&self) -> Uuid {
        self.user.uuid
    }
}
