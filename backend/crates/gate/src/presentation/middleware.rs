//! Gate Middleware
//!
//! The three gate stages as axum middleware functions. [`apply_gate`] layers
//! them in order; each may end the request with its own response.
//!
//! [`apply_gate`]: crate::presentation::router::apply_gate

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::extract_client_ip;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::application::pipeline::AuthPipeline;
use crate::domain::admission::{AdmissionDecision, AdmissionLimiter};
use crate::domain::context::{ClientIdentity, RequestContext};
use crate::error::GateError;
use crate::presentation::GateState;

/// Outermost stage: run the rest of the chain in its own task
///
/// A panic anywhere below becomes a single 500 and the process keeps serving.
pub async fn isolate_failures(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    match tokio::spawn(next.run(req)).await {
        Ok(response) => response,
        Err(err) => {
            let detail = if err.is_panic() {
                panic_message(err.into_panic())
            } else {
                "request task was cancelled".to_string()
            };
            GateError::Fault {
                method,
                path,
                detail,
            }
            .into_response()
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Admission stage: count the request against its client's window
///
/// Admitted requests leave with a fresh [`RequestContext`] in their
/// extensions.
pub async fn admit_request<L>(
    State(state): State<GateState<L>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, GateError>
where
    L: AdmissionLimiter + Send + Sync + 'static,
{
    let peer_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let client_ip = extract_client_ip(req.headers(), peer_ip, state.config.trust_forwarded_for);
    let client = ClientIdentity::from_ip(client_ip);

    match state.limiter.check_and_consume(&client).await? {
        AdmissionDecision::Admitted { remaining } => {
            tracing::trace!(client = %client, remaining, "Request admitted");
            req.extensions_mut().insert(RequestContext::admitted(client));
            Ok(next.run(req).await)
        }
        AdmissionDecision::Rejected { retry_after_secs } => Err(GateError::RateLimited {
            client,
            retry_after_secs,
        }),
    }
}

/// Authorization stage: bearer token, then request signature
pub async fn authenticate(
    State(pipeline): State<Arc<AuthPipeline>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, GateError> {
    let mut ctx = req
        .extensions_mut()
        .remove::<RequestContext>()
        .ok_or(GateError::UnverifiedContext)?;

    pipeline.authorize(&mut ctx, req.headers())?;
    ctx.mark_forwarded();

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}
