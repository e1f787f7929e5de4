//! HTTP surface for the Leko answer service.
//!
//! The router wires the health, ask, command-queue, and vision endpoints
//! onto a shared [`state::AppState`]. Provider failures never become HTTP
//! errors here; only missing configuration and genuinely unexpected
//! problems reach the wire as structured error bodies.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::signal;

use crate::state::AppState;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::health::health))
        .route("/health", get(routes::health::health))
        .route("/ask", post(routes::ask::ask))
        .route("/command", post(routes::command::enqueue_command))
        .route("/command/next", get(routes::command::next_command))
        .route("/vision", post(routes::vision::vision))
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("failed to listen for shutdown signal");
}
