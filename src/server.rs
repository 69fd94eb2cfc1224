//! JSON HTTP server.
//!
//! Exposes dataset loading and archive views over HTTP for browser
//! dashboards and notebooks. The server holds one [`RecordStore`]; every
//! `GET /view` is computed from the current snapshot with the view state
//! taken from the query string, so no view selection lives on the server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/datasets` | Configured datasets and availability |
//! | `POST` | `/datasets/{id}/load` | Load a dataset into the store |
//! | `GET`  | `/view?phase=&q=&mode=` | Filtered, aggregated view of the current snapshot |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "unknown dataset: 'X.csv'" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `no_dataset` (409),
//! `ingest_failed` (502), `internal` (500).
//!
//! # Concurrency
//!
//! Overlapping load requests each get a generation; only the most recently
//! requested one is installed. A superseded load responds with
//! `"applied": false`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use coverage_lens_core::{build_view, CoreError, DisplayMode, PhaseFilter, RecordStore, ViewState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::datasets::{get_datasets, DatasetStatus};
use crate::ingest::{row_source, RowSource};
use crate::loader::{load_dataset, LoadReport};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<RecordStore>,
    source: Arc<dyn RowSource>,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<RecordStore>, source: Arc<dyn RowSource>) -> Self {
        Self {
            config,
            store,
            source,
        }
    }
}

/// Starts the HTTP server on `[server].bind` with the configured row source.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let source: Arc<dyn RowSource> = Arc::from(row_source(config)?);
    let state = AppState::new(
        Arc::new(config.clone()),
        Arc::new(RecordStore::new()),
        source,
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(
        "covlens server listening on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Builds the router with CORS open to all origins.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/datasets", get(handle_datasets))
        .route("/datasets/{id}/load", post(handle_load))
        .route("/view", get(handle_view))
        .layer(cors)
        .with_state(state)
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

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
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

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownDataset(_) => {
                AppError::new(StatusCode::NOT_FOUND, "not_found", err.to_string())
            }
            CoreError::InvalidViewParam { .. } | CoreError::DateParse(_) => {
                AppError::new(StatusCode::BAD_REQUEST, "bad_request", err.to_string())
            }
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

// ============ GET /datasets ============

#[derive(Serialize)]
struct DatasetsResponse {
    datasets: Vec<DatasetStatus>,
    /// Dataset of the current snapshot, if one is loaded.
    loaded: Option<String>,
}

async fn handle_datasets(State(state): State<AppState>) -> Json<DatasetsResponse> {
    Json(DatasetsResponse {
        datasets: get_datasets(&state.config),
        loaded: state.store.snapshot().map(|s| s.dataset.clone()),
    })
}

// ============ POST /datasets/{id}/load ============

/// Loads a dataset. Unknown identifiers fail with 404 before any fetch.
async fn handle_load(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LoadReport>, AppError> {
    state.config.reference_date(&id)?;

    let report = load_dataset(&state.config, &state.store, state.source.as_ref(), &id)
        .await
        .map_err(|e| AppError::new(StatusCode::BAD_GATEWAY, "ingest_failed", format!("{:#}", e)))?;

    Ok(Json(report))
}

// ============ GET /view ============

#[derive(Debug, Default, Deserialize)]
struct ViewParams {
    phase: Option<String>,
    q: Option<String>,
    mode: Option<String>,
}

impl ViewParams {
    fn into_view_state(self) -> Result<ViewState, CoreError> {
        let phase: PhaseFilter = self.phase.as_deref().unwrap_or("all").parse()?;
        let mode: DisplayMode = self.mode.as_deref().unwrap_or("table").parse()?;
        Ok(ViewState::new(phase, self.q.unwrap_or_default(), mode))
    }
}

/// Returns the `ArchiveView` of the current snapshot for the requested
/// view state.
async fn handle_view(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let view = params.into_view_state()?;
    let snapshot = state.store.snapshot().ok_or_else(|| {
        AppError::new(
            StatusCode::CONFLICT,
            "no_dataset",
            "no dataset loaded; POST /datasets/{id}/load first",
        )
    })?;

    let archive = build_view(&snapshot, &view);
    let body = serde_json::to_value(&archive).map_err(|e| {
        AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string())
    })?;
    Ok(Json(body))
}
