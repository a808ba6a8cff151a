//! API server initialization

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::routes::{exposition, health, ingest};
use crate::core::CoreApp;
use crate::core::constants::INGEST_BODY_LIMIT;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(
            host.parse()
                .with_context(|| format!("Invalid listen host: {}", host))?,
            port,
        );

        let ingest_routes = ingest::routes(app.samples_topic.publisher())
            .layer(DefaultBodyLimit::max(INGEST_BODY_LIMIT));

        let router = Router::new()
            .merge(exposition::routes(
                app.registry.clone(),
                app.stats.clone(),
            ))
            .merge(ingest_routes)
            .route("/api/v1/health", get(health::health))
            .layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        tracing::info!(%addr, "Scrape endpoint listening on /metrics");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await
            .context("Server error")?;

        Ok(app)
    }
}
