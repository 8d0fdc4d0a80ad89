use crate::{render, AppContext};
use axum::{extract::State, response::Html, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// GET / — run the probe set and render the status page.
///
/// Always answers 200 with HTML; failed probes degrade to
/// Disconnected/Unreachable cards rather than an error page.
pub async fn index(State(ctx): State<Arc<AppContext>>) -> Html<String> {
    let results = ctx.aggregator.collect().await;
    debug!(
        probes = results.len(),
        reachable = results.iter().filter(|r| r.reachable).count(),
        "status page rendered"
    );
    Html(render::status_page(&results, ctx.config.port))
}

/// GET /health — process liveness only.
///
/// Performs no probe work and no external calls; reports healthy as long as
/// the process is serving requests. Dependency reachability is the status
/// page's concern, not this endpoint's.
pub async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}
