//! Verified identity extractor for business handlers

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::claims::UserLogin;
use crate::domain::context::RequestContext;
use crate::error::GateError;

/// Identity of a request that passed every gate stage
///
/// Extraction fails with 401 on routes the gate does not cover.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: UserLogin,
    /// Literal `Authorization` header value
    pub authorization: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<RequestContext>()
            .filter(|ctx| ctx.is_forwarded())
            .ok_or(GateError::UnverifiedContext)?;

        match (ctx.user_login(), ctx.authorization()) {
            (Some(user), Some(authorization)) => Ok(Self {
                user: user.clone(),
                authorization: authorization.to_string(),
            }),
            _ => Err(GateError::UnverifiedContext),
        }
    }
}
