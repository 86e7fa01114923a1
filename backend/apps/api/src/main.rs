//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use axum::{Router, extract::State, routing::get};
use gate::{AuthenticatedUser, GateConfig, GateError, MemoryGate, UserLogin, apply_gate};
use kernel::response::ApiResponse;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8001";

/// Verified identity of the caller
async fn current_user(user: AuthenticatedUser) -> ApiResponse<UserLogin> {
    ApiResponse::success(user.user)
}

/// Fresh token for the caller, in the envelope's `token` field
async fn refresh_token(
    State(gate): State<MemoryGate>,
    user: AuthenticatedUser,
) -> Result<ApiResponse<UserLogin>, GateError> {
    let token = gate.pipeline.bearer().issue(&user.user)?;
    tracing::info!(user_uuid = %user.user.uuid, "Token refreshed");
    Ok(ApiResponse::success(user.user).with_token(token))
}

fn user_router(gate: MemoryGate) -> Router {
    Router::new()
        .route("/me", get(current_user))
        .route("/token", get(refresh_token))
        .with_state(gate)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,gate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GateConfig::from_env()?;
    tracing::info!(?config, "Gate configuration loaded");

    let (gate, store) = MemoryGate::in_memory(config.clone());
    let _cleanup = store.spawn_cleanup(config.rate_limit.clone());

    // Build router
    let app = apply_gate(
        Router::new().nest("/api/v1/user", user_router(gate.clone())),
        gate,
    )
    .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDRESS")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string())
        .parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
