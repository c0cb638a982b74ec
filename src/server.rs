//! HTTP API for the assistant widget and operator tooling.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/chat` | Answer a visitor message |
//! | `POST` | `/api/init-knowledge` | Embed and upsert the knowledge base |
//! | `GET`  | `/api/init-knowledge` | Report whether retrieval is configured |
//! | `GET`  | `/api/knowledge/stats` | Vector store record count and dimension |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Errors from `/api/chat` and `/api/knowledge/stats` use one body shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "message must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_configured` (503),
//! `vector_store_error` (502).
//!
//! `POST /api/init-knowledge` keeps its own `{status, ...}` envelope so the
//! operator sees the root cause in `details`.
//!
//! # Init Endpoint
//!
//! `POST /api/init-knowledge` is an operator action: every call re-embeds
//! the whole knowledge base against the paid embedding API and rewrites the
//! index. It has no authentication and sits behind the permissive CORS layer
//! below, so any page can trigger it. Public deployments should set
//! `[server].init_endpoint = false` and run `pobo init` instead; the route
//! then answers `405 Method Not Allowed` while `GET` keeps working.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the portfolio page can
//! call the API from another origin.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use pobo_core::models::{ConversationTurn, StoreStats};
use pobo_core::RagError;

use crate::app::App;
use crate::loader::{initialize_knowledge, InitStatus};

/// Build the router with all routes and layers.
pub fn router(app: App) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut init_route = get(handle_init_status);
    if app.config.server.init_endpoint {
        init_route = init_route.post(handle_init_knowledge);
    } else {
        tracing::info!("POST /api/init-knowledge disabled by [server].init_endpoint");
    }

    Router::new()
        .route("/api/chat", post(handle_chat))
        .route("/api/init-knowledge", init_route)
        .route("/api/knowledge/stats", get(handle_stats))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app)
}

/// Serve on `[server].bind` until Ctrl-C.
pub async fn run_server(app: App) -> anyhow::Result<()> {
    let bind_addr = app.config.server.bind.clone();
    let router = router(app);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Pobo API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::NotConfigured(_) => AppError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "not_configured",
                message: err.to_string(),
            },
            other => AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "vector_store_error",
                message: other.to_string(),
            },
        }
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

// ============ POST /api/chat ============

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    history: Vec<ConversationTurn>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

/// Answers with the assistant reply. Retrieval and chat failures are
/// absorbed by the responder, so only malformed input is an error.
async fn handle_chat(
    State(app): State<App>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = req
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| bad_request("message must not be empty"))?;

    let reply = app.responder().respond(message, &req.history).await;
    tracing::info!(
        fallback = reply.context_source.is_fallback(),
        chat_failed = reply.failure.is_some(),
        history = req.history.len(),
        "answered chat message"
    );

    Ok(Json(ChatResponse { response: reply.text }))
}

// ============ /api/init-knowledge ============

#[derive(Serialize)]
struct InitResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upserted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

async fn handle_init_knowledge(State(app): State<App>) -> (StatusCode, Json<InitResponse>) {
    match initialize_knowledge(&app).await {
        Ok(InitStatus::Populated(report)) => (
            StatusCode::OK,
            Json(InitResponse {
                status: "success",
                message: Some("Knowledge base initialized successfully".to_string()),
                upserted: Some(report.upserted),
                fingerprint: Some(report.fingerprint),
                error: None,
                details: None,
            }),
        ),
        Ok(InitStatus::Skipped) => (
            StatusCode::OK,
            Json(InitResponse {
                status: "fallback",
                message: Some(
                    "Vector store not configured, using fallback knowledge base".to_string(),
                ),
                upserted: None,
                fingerprint: None,
                error: None,
                details: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "knowledge initialization failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(InitResponse {
                    status: "error",
                    message: None,
                    upserted: None,
                    fingerprint: None,
                    error: Some("Failed to initialize knowledge base".to_string()),
                    details: Some(e.to_string()),
                }),
            )
        }
    }
}

#[derive(Serialize)]
struct InitStatusResponse {
    vector_store_configured: bool,
    index_name: String,
    status: &'static str,
    message: String,
}

async fn handle_init_status(State(app): State<App>) -> Json<InitStatusResponse> {
    let configured = app.store.is_configured();
    let (status, message) = if configured && app.config.server.init_endpoint {
        (
            "ready",
            "Vector store is configured. POST to this endpoint to initialize the knowledge base.",
        )
    } else if configured {
        (
            "ready",
            "Vector store is configured. Run `pobo init` to initialize the knowledge base.",
        )
    } else {
        (
            "fallback",
            "Vector store not configured. Answers use the fallback knowledge base.",
        )
    };
    Json(InitStatusResponse {
        vector_store_configured: configured,
        index_name: app.config.vector_store.index_name.clone(),
        status,
        message: message.to_string(),
    })
}

// ============ GET /api/knowledge/stats ============

async fn handle_stats(State(app): State<App>) -> Result<Json<StoreStats>, AppError> {
    Ok(Json(app.store.describe_stats().await?))
}
