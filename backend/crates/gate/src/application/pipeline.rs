//! Authorization Pipeline
//!
//! Runs the bearer check and then the signature check against an admitted
//! request. Both must pass. The first failure ends the request: later checks
//! never run and the context keeps the stage it had reached.

use axum::http::{HeaderMap, header};

use crate::application::bearer::{BearerTokenVerifier, VerifiedBearer};
use crate::application::config::GateConfig;
use crate::application::signature::SignatureVerifier;
use crate::domain::context::RequestContext;
use crate::error::{GateError, GateResult};

pub struct AuthPipeline {
    bearer: BearerTokenVerifier,
    signature: SignatureVerifier,
}

impl AuthPipeline {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            bearer: BearerTokenVerifier::new(config),
            signature: SignatureVerifier::new(config),
        }
    }

    /// Token verifier, also used to issue tokens at login
    pub fn bearer(&self) -> &BearerTokenVerifier {
        &self.bearer
    }

    /// Advance `ctx` from `Admitted` to `SignatureChecked`
    pub fn authorize(&self, ctx: &mut RequestContext, headers: &HeaderMap) -> GateResult<()> {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .map(|value| {
                value
                    .to_str()
                    .map_err(|_| GateError::InvalidHeader("authorization"))
            })
            .transpose()?;

        let VerifiedBearer {
            claims,
            authorization,
        } = self.bearer.verify(authorization)?;
        ctx.record_bearer(claims.user, authorization);

        self.signature.verify_headers(headers)?;
        ctx.record_signature();

        tracing::debug!(
            client = %ctx.client(),
            stage = %ctx.stage(),
            "Request authorized"
        );
        Ok(())
    }
}
