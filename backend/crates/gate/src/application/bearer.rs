//! Bearer Token Verification
//!
//! Parses the `Authorization` header, verifies the token against the
//! process-wide secret and yields the claims it carries. Issuing lives here
//! too so that both directions share one key and one algorithm family.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use std::time::Duration;

use crate::application::config::GateConfig;
use crate::domain::claims::{Claims, UserLogin};
use crate::error::{GateError, GateResult};

/// Scheme marker expected in front of the token
pub const BEARER_SCHEME: &str = "Bearer";

/// The only algorithms a token may declare
pub const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Token part of `Bearer <token>`
///
/// The scheme is matched exactly and the token must be a single non-empty
/// word.
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.split_once(' ')?;
    if scheme != BEARER_SCHEME || token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Result of a successful bearer check
#[derive(Debug, Clone)]
pub struct VerifiedBearer {
    pub claims: Claims,
    /// Literal header value the claims were taken from
    pub authorization: String,
}

pub struct BearerTokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl BearerTokenVerifier {
    pub fn new(config: &GateConfig) -> Self {
        let secret = config.token_secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = config.token_leeway.as_secs();
        validation.validate_exp = true;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: config.token_ttl,
        }
    }

    /// Verify the raw `Authorization` header value
    pub fn verify(&self, authorization: Option<&str>) -> GateResult<VerifiedBearer> {
        let authorization = authorization.ok_or(GateError::MissingAuthorization)?;
        let token = extract_bearer_token(authorization).ok_or(GateError::MalformedAuthorization)?;

        // The declared algorithm is checked before any signature work.
        let header = decode_header(token).map_err(GateError::InvalidToken)?;
        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            return Err(GateError::UnsupportedAlgorithm(header.alg));
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => GateError::TokenExpired,
                _ => GateError::InvalidToken(e),
            }
        })?;

        tracing::debug!(
            user_uuid = %data.claims.user_uuid(),
            alg = ?header.alg,
            "Bearer token verified"
        );

        Ok(VerifiedBearer {
            claims: data.claims,
            authorization: authorization.to_string(),
        })
    }

    /// Sign a fresh token for `user`
    pub fn issue(&self, user: &UserLogin) -> GateResult<String> {
        let claims = Claims::new(user.clone(), self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(GateError::TokenIssue)
    }
}
