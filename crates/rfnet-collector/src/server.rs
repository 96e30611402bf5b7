//! HTTP server implementation using axum.

use std::future::Future;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rfnet_telemetry::Metrics;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ApiError, CollectorResult};
use crate::state::AppState;
use crate::{ingest, query, ws};

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/readings",
            get(query::get_readings).post(ingest::post_reading),
        )
        .route("/api/v1/readings/latest", get(query::get_latest))
        .route(
            "/api/v1/sensors",
            get(query::get_sensors).post(query::post_sensor),
        )
        .route("/api/v1/ws", get(ws::subscribe))
        .route("/api/v1/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "subscribers": state.registry().len(),
    }))
}

async fn metrics() -> Result<Response, ApiError> {
    let text = Metrics::gather_text().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    )
        .into_response())
}

/// Serve on an already-bound listener until `shutdown` resolves.
///
/// On shutdown every subscriber connection is cancelled.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> CollectorResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let registry = state.registry();
    let app = create_router(state);

    info!(addr = ?listener.local_addr().ok(), "Collector listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutdown requested, closing subscribers");
            registry.close_all();
        })
        .await?;

    Ok(())
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run_server(state: AppState) -> CollectorResult<()> {
    let addr = state.config().socket_addr()?;
    info!(%addr, "Starting collector");

    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}
