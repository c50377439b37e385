//! JSON HTTP API for the chat front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` | Answer the latest user message of a transcript |
//! | `POST` | `/analyze` | Intent analysis and routing plan, no source calls |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Source failures never surface here; `/chat` degrades to the apology reply
//! instead. Only malformed requests are rejected.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the website can call
//! the API from the browser.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use concierge_core::models::{Message, OrchestratedResponse};

use crate::concierge::{plan, Concierge, QueryPlan};
use crate::config::Config;

#[derive(Clone)]
struct AppState {
    concierge: Arc<Concierge>,
}

/// Start the API on `[server].bind` and serve until the process exits.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let concierge = Concierge::from_config(config)?;
    for source in concierge.registry().sources() {
        tracing::info!(source = %source.kind(), "{}", source.description());
    }

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("concierge API listening on http://{}", config.server.bind);
    axum::serve(listener, router(Arc::new(concierge))).await?;

    Ok(())
}

/// The API routes, for embedding or in-process tests.
pub fn router(concierge: Arc<Concierge>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handle_chat))
        .route("/analyze", post(handle_analyze))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { concierge })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`).
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    messages: Vec<Message>,
}

async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<OrchestratedResponse>, AppError> {
    let Json(request) = body?;
    if request.messages.is_empty() {
        return Err(bad_request("messages must not be empty"));
    }
    Ok(Json(state.concierge.respond(&request.messages).await))
}

// ============ POST /analyze ============

#[derive(Deserialize)]
struct AnalyzeRequest {
    query: String,
}

async fn handle_analyze(
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<QueryPlan>, AppError> {
    let Json(request) = body?;
    if request.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    Ok(Json(plan(&request.query, Utc::now().date_naive())))
}
