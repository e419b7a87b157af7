//! HTTP Server for the gridkey API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/answers`    | Compute answer keys for a batch          |
//! | POST   | `/api/validate`   | Schema-check a batch without computing   |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, AnswerResponse, ValidationResponse};
use crate::batch::{ensure_batch_size, execute_values};
use crate::config::ServerConfig;
use crate::error::{BatchError, ServerError, ServerResult};
use crate::validation::validate_batch;

type ApiError = (StatusCode, Json<Value>);

/// Build the API router.
pub fn router(config: ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/answers", post(compute_answers))
        .route("/api/validate", post(validate_records))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(Arc::new(config))
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> ServerResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 Gridkey server running on http://localhost:{}", config.port);
    println!("   POST /api/answers  - Compute answer keys (max {} records)", config.max_batch);
    println!("   POST /api/validate - Schema-check records");
    println!("   GET  /api/logs     - SSE log stream");
    println!("   GET  /health       - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
    axum::serve(listener, router(config))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "gridkey",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "answers": "POST /api/answers",
            "validate": "POST /api/validate",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Compute answer keys for a JSON array of question records
async fn compute_answers(
    State(config): State<Arc<ServerConfig>>,
    Json(rows): Json<Vec<Value>>,
) -> Result<Json<AnswerResponse>, ApiError> {
    check_batch(&rows, &config).map_err(api_error)?;

    let process_id = Uuid::new_v4();
    log_info(format!("📄 New batch {}: {} records", process_id, rows.len()));

    // Engines are synchronous; keep them off the async workers
    let report = tokio::task::spawn_blocking(move || execute_values(&rows, process_id))
        .await
        .map_err(|e| api_error(ServerError::Internal(e.to_string())))?;

    Ok(Json(AnswerResponse::from(report)))
}

/// Schema-check a JSON array of question records
async fn validate_records(
    State(config): State<Arc<ServerConfig>>,
    Json(rows): Json<Vec<Value>>,
) -> Result<Json<ValidationResponse>, ApiError> {
    check_batch(&rows, &config).map_err(api_error)?;
    let failures = validate_batch(&rows);
    Ok(Json(ValidationResponse::new(rows.len(), failures)))
}

fn check_batch(rows: &[Value], config: &ServerConfig) -> ServerResult<()> {
    if rows.is_empty() {
        return Err(BatchError::EmptyInput.into());
    }
    ensure_batch_size(rows.len(), config.max_batch).map_err(|e| ServerError::BadRequest(e.to_string()))
}

fn api_error(error: ServerError) -> ApiError {
    let status = match &error {
        ServerError::Batch(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    log_error(error.to_string());
    (status, Json(error_response(&error.to_string())))
}
