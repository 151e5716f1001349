use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::app::collector::Collector;
use crate::constants::EXPOSITION_CONTENT_TYPE;
use crate::error::Result;
use crate::exposition;

/// Renders every target's families, then the exporter's own metrics.
pub async fn render_all(collector: &Collector) -> Result<String> {
    let reports = collector.collect().await;
    let mut body = exposition::render(
        reports
            .iter()
            .filter_map(|report| report.outcome.as_ref().ok())
            .flat_map(|result| result.families()),
    )?;
    body.push_str(&crate::metrics::render());
    Ok(body)
}

async fn metrics(Extension(collector): Extension<Arc<Collector>>) -> impl IntoResponse {
    match render_all(&collector).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
            body,
        ),
        Err(e) => {
            error!("exposition failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                e.to_string(),
            )
        }
    }
}

/// Health check endpoint
async fn health(Extension(collector): Extension<Arc<Collector>>) -> impl IntoResponse {
    let targets: Vec<_> = collector
        .targets()
        .iter()
        .map(|t| {
            serde_json::json!({
                "service": t.target.key(),
                "url": t.target.url,
            })
        })
        .collect();
    Json(serde_json::json!({
        "status": "healthy",
        "service": "hadoop_exporter",
        "version": env!("CARGO_PKG_VERSION"),
        "time": chrono::Utc::now().to_rfc3339(),
        "targets": targets,
    }))
}

pub fn create_server(collector: Arc<Collector>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(collector)),
        )
}

/// Start the HTTP server on `addr`
pub async fn start_server(collector: Arc<Collector>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_server(collector);
    info!("hadoop_exporter listening on http://{}/metrics", addr);
    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
