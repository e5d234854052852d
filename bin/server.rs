// Contact Deduplicator - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use clap::Parser;
use contact_dedup::{
    init_logging, run_and_report, ContactRecord, ContactSource, DuplicateGroup, DuplicateResolver,
    OperationReport, ServerCli, SqliteContactStore, SERVER_LOG_FILTER,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared application state. The mutex serializes dedupe runs.
#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<SqliteContactStore>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn err(data: T, message: String) -> Self {
        Self {
            success: false,
            data,
            error: Some(message),
        }
    }
}

/// Run a blocking closure against the store off the async runtime
async fn with_store<T, F>(state: AppState, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut SqliteContactStore) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || -> Result<T> {
        let mut store = state
            .store
            .lock()
            .map_err(|_| anyhow::anyhow!("contact store lock poisoned"))?;
        Ok(f(&mut *store))
    })
    .await
    .context("store task panicked")?
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/contacts - All contacts ordered by name
async fn get_contacts(State(state): State<AppState>) -> impl IntoResponse {
    match with_store(state, |store| store.list_all()).await {
        Ok(Ok(contacts)) => (StatusCode::OK, Json(ApiResponse::ok(contacts))).into_response(),
        Ok(Err(e)) => contacts_error(e.to_string()),
        Err(e) => contacts_error(e.to_string()),
    }
}

fn contacts_error(message: String) -> axum::response::Response {
    error!(error = %message, "error listing contacts");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err(Vec::<ContactRecord>::new(), message)),
    )
        .into_response()
}

/// GET /api/duplicates - Preview of what a dedupe run would delete
async fn get_duplicates(State(state): State<AppState>) -> impl IntoResponse {
    let result = with_store(state, |store| {
        store
            .list_all()
            .map(|contacts| DuplicateResolver::new().duplicate_groups(&contacts))
    })
    .await;

    match result {
        Ok(Ok(groups)) => (StatusCode::OK, Json(ApiResponse::ok(groups))).into_response(),
        Ok(Err(e)) => duplicates_error(e.to_string()),
        Err(e) => duplicates_error(e.to_string()),
    }
}

fn duplicates_error(message: String) -> axum::response::Response {
    error!(error = %message, "error previewing duplicates");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err(Vec::<DuplicateGroup>::new(), message)),
    )
        .into_response()
}

/// POST /api/deduplicate - Run deduplication, answer with {status, message}
async fn deduplicate(State(state): State<AppState>) -> impl IntoResponse {
    let report = match with_store(state, |store| run_and_report(store)).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "deduplication task failed");
            OperationReport::from(contact_dedup::ResolutionOutcome::Failed)
        }
    };

    info!(status = report.status, "deduplication finished");
    (StatusCode::OK, Json(report)).into_response()
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/contacts", get(get_contacts))
        .route("/duplicates", get(get_duplicates))
        .route("/deduplicate", post(deduplicate))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServerCli::parse();
    init_logging(SERVER_LOG_FILTER);

    let store = SqliteContactStore::open(&cli.config.db_path)?;
    info!(path = %cli.config.db_path.display(), "database opened");

    let state = AppState {
        store: Arc::new(Mutex::new(store)),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&cli.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", cli.addr))?;

    info!(addr = %cli.addr, "server running");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
