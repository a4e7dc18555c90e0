//! HTTP surface: `/analyze`, `/calculate` and `/history` plus service probes.

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{bearer_token, credentials_from_header};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::schemas::{AnalysisResult, HistoryItem, LifestyleInput};
use crate::supervisor::Supervisor;

/// Application state shared across handlers
pub struct AppState {
    pub supervisor: Supervisor,
}

type AppStateArc = Arc<AppState>;

pub fn router(state: AppStateArc) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/analyze", post(analyze))
        .route("/calculate", post(calculate))
        .route("/history", get(history))
        .with_state(state)
}

/// CORS for the web client. Credentials are allowed, so methods and headers
/// mirror the preflight instead of using wildcards.
pub fn cors_layer(frontend_origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(frontend_origin)
        .with_context(|| format!("Invalid frontend origin '{}'", frontend_origin))?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Run the HTTP server until ctrl-c.
pub async fn run(config: &AppConfig, supervisor: Supervisor) -> Result<()> {
    let state = Arc::new(AppState { supervisor });
    let app = router(state)
        .layer(cors_layer(&config.frontend_origin)?)
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down gracefully");
        })
        .await?;
    Ok(())
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "EcoTrack Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/analyze": "POST - Analyze carbon footprint",
            "/calculate": "POST - Analyze + persist history",
            "/history": "GET - Past analyses for the signed-in user"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Stateless analysis; no credentials, no history.
async fn analyze(
    State(state): State<AppStateArc>,
    payload: Result<Json<LifestyleInput>, JsonRejection>,
) -> AppResult<Json<AnalysisResult>> {
    let Json(input) = payload?;
    Ok(Json(state.supervisor.analyze(&input, None).await))
}

async fn calculate(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    payload: Result<Json<LifestyleInput>, JsonRejection>,
) -> AppResult<Json<AnalysisResult>> {
    let credentials = credentials_from_header(authorization(&headers))?;
    let Json(input) = payload?;
    info!(user_id = %credentials.user_id, "calculate request");
    let result = state
        .supervisor
        .analyze_and_persist(&input, &credentials)
        .await?;
    Ok(Json(result))
}

async fn history(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<HistoryItem>>> {
    let token = bearer_token(authorization(&headers))?;
    Ok(Json(state.supervisor.history(token).await?))
}
