//! HTTP server implementation.

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use super::service;
use crate::error::{FloodgateError, Result};
use crate::limit::{Gate, LimiterBackend, RateLimiter};

/// Build the router for the decision service.
pub fn router<B: LimiterBackend + 'static>(gate: Arc<Gate<B>>) -> Router {
    Router::new()
        .route("/v1/check", post(service::check::<B>))
        .route("/healthz", get(service::healthz))
        .with_state(gate)
}

/// HTTP server for the rate limit decision service.
pub struct HttpServer<B: LimiterBackend + 'static> {
    /// Address to bind to
    addr: SocketAddr,
    /// The gate evaluating requests
    gate: Arc<Gate<B>>,
}

impl HttpServer<RateLimiter> {
    /// Create a new HTTP server over the in-process rate limiter.
    pub fn new(addr: SocketAddr, gate: Arc<Gate<RateLimiter>>) -> Self {
        Self { addr, gate }
    }
}

impl<B: LimiterBackend + 'static> HttpServer<B> {
    /// Create a new HTTP server over a custom limiter backend.
    pub fn with_backend(addr: SocketAddr, gate: Arc<Gate<B>>) -> Self {
        Self { addr, gate }
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;

        info!(
            addr = %self.addr,
            "Starting HTTP server for rate limit decisions"
        );

        axum::serve(listener, router(self.gate))
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                FloodgateError::Server(e.to_string())
            })
    }
}
