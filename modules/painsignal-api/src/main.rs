//! HTTP front end for the pain-point discovery pipeline.
//!
//! One endpoint: `POST /api/search` takes `{keywords, sources}` and returns
//! the full pipeline result, or `{error}` with a non-success status. Empty
//! results are a valid success; only invalid input and unrecoverable
//! extraction failures become errors.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use painsignal_common::{Config, PainSignalError};
use painsignal_engine::{ClaudeOracle, Pipeline, SearchRequest};
use painsignal_sources::default_adapters;

struct AppState {
    pipeline: Pipeline,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("painsignal=info".parse()?))
        .init();

    let config = Config::from_env();

    let oracle = Arc::new(ClaudeOracle::new(&config.anthropic_api_key));
    let pipeline = Pipeline::new(oracle, default_adapters());
    let state = Arc::new(AppState { pipeline });

    let app = Router::new()
        .route("/api/search", post(api_search))
        .route("/health", get(health))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!(addr, "painsignal api listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn api_search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Response {
    match state.pipeline.run(&request).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(e),
    }
}

/// A hard failure never yields a partially-populated success payload: it is
/// a single `{error}` object with the matching status.
fn error_response(e: PainSignalError) -> Response {
    let status = match &e {
        PainSignalError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(error = %e, "pipeline run failed");
    }
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}
