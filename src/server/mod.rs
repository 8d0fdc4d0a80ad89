// server/mod.rs — public HTTP surface.
//
// Axum server exposing exactly two routes:
//   GET  /        HTML status page (runs the probe set on every request)
//   GET  /health  process liveness, unconditional — no external calls
pub mod routes;

use anyhow::Result;
use axum::{http::Method, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::AppContext;

pub async fn start_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("status server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    // Read-only surface; allow dashboards on other origins to poll it.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any);

    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(ctx)
}
