//! HTTP API for uploading, reading, renaming and sharing card lists

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rusqlite::{Connection, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;
use tower_http::cors::CorsLayer;

use crate::config::ServiceConfig;
use crate::csv_import::extract_card_requests_from_path;
use crate::database;
use crate::error::ServiceError;
use crate::html::{render_card_list_page, render_not_found_page};
use crate::models::{CardList, ResolvedCard};
use crate::scryfall::ScryfallClient;

/// Shared application state (database connection, Scryfall client, settings)
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    scryfall: ScryfallClient,
    config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(db: Arc<Mutex<Connection>>, scryfall: ScryfallClient, config: ServiceConfig) -> Self {
        Self {
            db,
            scryfall,
            config: Arc::new(config),
        }
    }

    fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db.lock().map_err(|_| {
            log::error!("Database mutex poisoned");
            AppError::internal("An error occurred while processing your request.")
        })
    }
}

/// Error rendered as a JSON `{"error": "..."}` response
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }

    /// Map a database error: lost connectivity is 503, anything else 500
    fn database(err: &rusqlite::Error, context: &str) -> Self {
        if is_connectivity_error(err) {
            log::error!("Database connection error: {}", err);
            Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "Database connection error. Please try again later.".to_string(),
            }
        } else {
            log::error!("Database error: {}", err);
            Self::internal(format!("{}: {}", context, err))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::Csv(e) => {
                log::error!("Error processing CSV file: {}", e);
                AppError::bad_request(format!("Invalid CSV file: {}", e))
            }
            ServiceError::Database(e) => AppError::database(e, "Error saving to database"),
            ServiceError::Io(_) => {
                log::error!("Unexpected error during file upload: {}", err);
                AppError::internal(format!("An unexpected error occurred: {}", err))
            }
        }
    }
}

fn is_connectivity_error(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(
            ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
        )
    )
}

/// Response for a successful upload
#[derive(Serialize)]
struct UploadResponse {
    id: String,
    name: String,
    cards: Vec<ResolvedCard>,
}

/// PATCH body for renaming a list
#[derive(Deserialize)]
struct RenameRequest {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct ShareResponse {
    url: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// The `file` part of an upload
struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

/// Over-limit bodies surface as a multipart error carrying 413.
fn multipart_error(e: &MultipartError, fallback: AppError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        log::warn!("Upload rejected, body exceeds limit: {}", e);
        return AppError {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "File too large".to_string(),
        };
    }
    fallback
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        log::error!("Malformed multipart body: {}", e);
        multipart_error(&e, AppError::bad_request("No file part"))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            log::error!("Failed to read uploaded file: {}", e);
            let fallback = AppError::bad_request(format!("Failed to read uploaded file: {}", e));
            multipart_error(&e, fallback)
        })?;
        return Ok(Some(UploadedFile { file_name, bytes }));
    }
    Ok(None)
}

fn has_csv_extension(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".csv")
}

/// Write the upload to a temporary file that is removed when dropped
fn spool_upload(config: &ServiceConfig, bytes: &[u8]) -> Result<NamedTempFile, ServiceError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("card-upload-").suffix(".csv");
    let mut file = match &config.upload_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

/// POST /api/upload - multipart CSV upload, creates a new list
async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    log::info!("Upload request received");

    let mut multipart = multipart.map_err(|e| {
        log::error!("No file part in the request: {}", e);
        AppError::bad_request("No file part")
    })?;

    let Some(upload) = read_file_field(&mut multipart).await? else {
        log::error!("No file part in the request");
        return Err(AppError::bad_request("No file part"));
    };
    log::info!("File received: {}", upload.file_name);

    if upload.file_name.is_empty() {
        log::error!("No selected file");
        return Err(AppError::bad_request("No selected file"));
    }
    if !has_csv_extension(&upload.file_name) {
        log::error!("Invalid file type: {}", upload.file_name);
        return Err(AppError::bad_request("Invalid file type"));
    }

    let spooled = spool_upload(&state.config, &upload.bytes)?;
    log::info!("File saved to {}", spooled.path().display());

    let outcome = extract_card_requests_from_path(spooled.path())?;
    log::info!("Processed {} cards from CSV", outcome.requests.len());

    let cards = state.scryfall.resolve_cards(&outcome.requests).await;
    let failed = cards.iter().filter(|card| card.is_placeholder()).count();
    log::info!(
        "Fetched data for {} cards ({} lookups failed)",
        cards.len(),
        failed
    );

    let (list_id, list_name) = database::new_list_identity();
    {
        let mut conn = state.lock_db()?;
        database::create_card_list(&mut conn, &list_id, &list_name, &cards)
            .map_err(|e| AppError::database(&e, "Error saving to database"))?;
    }
    log::info!("Committed card list {} to database", list_id);

    let temp_path = spooled.path().to_path_buf();
    match spooled.close() {
        Ok(()) => log::info!("Temporary file {} removed", temp_path.display()),
        Err(e) => log::warn!("Failed to remove temporary file {}: {}", temp_path.display(), e),
    }

    Ok(Json(UploadResponse {
        id: list_id,
        name: list_name,
        cards,
    }))
}

/// GET /api/card-list/{id}
async fn get_card_list_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CardList>, AppError> {
    let conn = state.lock_db()?;

    match database::get_card_list(&conn, &id) {
        Ok(Some(list)) => Ok(Json(list)),
        Ok(None) => Err(AppError::not_found("Card list not found")),
        Err(e) => Err(AppError::database(&e, "An error occurred")),
    }
}

/// PATCH /api/card-list/{id} - body `{"name": "..."}`
async fn rename_card_list_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = match payload {
        Ok(Json(request)) => request.name,
        Err(e) => {
            log::warn!("Unreadable rename body for {}: {}", id, e);
            None
        }
    };

    let conn = state.lock_db()?;

    let exists = database::card_list_exists(&conn, &id)
        .map_err(|e| AppError::database(&e, "An error occurred"))?;
    if !exists {
        return Err(AppError::not_found("Card list not found"));
    }

    let Some(name) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) else {
        return Err(AppError::bad_request("Name not provided"));
    };

    database::rename_card_list(&conn, &id, &name)
        .map_err(|e| AppError::database(&e, "An error occurred"))?;

    Ok(Json(MessageResponse {
        message: "Card list name updated successfully",
    }))
}

/// Base URL for share links: configured public URL or the request's Host
fn public_base_url(config: &ServiceConfig, headers: &HeaderMap) -> Option<String> {
    if let Some(ref url) = config.public_url {
        return Some(url.trim_end_matches('/').to_string());
    }
    headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{}", host))
}

fn share_url(base: &str, list_id: &str) -> String {
    format!("{}/card-list/{}", base, urlencoding::encode(list_id))
}

/// GET /api/card-list/{id}/share - link to the printable page
async fn share_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ShareResponse>, AppError> {
    {
        let conn = state.lock_db()?;
        let exists = database::card_list_exists(&conn, &id)
            .map_err(|e| AppError::database(&e, "An error occurred"))?;
        if !exists {
            return Err(AppError::not_found("Card list not found"));
        }
    }

    let base = public_base_url(&state.config, &headers)
        .ok_or_else(|| AppError::bad_request("Missing Host header"))?;

    Ok(Json(ShareResponse {
        url: share_url(&base, &id),
    }))
}

/// GET /card-list/{id} - printable HTML page
async fn card_list_page_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let list = match state.lock_db() {
        Ok(conn) => database::get_card_list(&conn, &id),
        Err(e) => return e.into_response(),
    };

    match list {
        Ok(Some(list)) => {
            let base = public_base_url(&state.config, &headers).unwrap_or_default();
            Html(render_card_list_page(&list, &share_url(&base, &list.id))).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, Html(render_not_found_page())).into_response(),
        Err(e) => {
            log::error!("Error rendering card list {}: {}", id, e);
            let status = AppError::database(&e, "Error loading card list").status;
            (status, "An error occurred").into_response()
        }
    }
}

/// GET /api/health - overall and database health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.lock() {
        Ok(conn) => match database::ping(&conn) {
            Ok(()) => "healthy",
            Err(e) => {
                log::error!("Database health check failed: {}", e);
                "unhealthy"
            }
        },
        Err(_) => {
            log::error!("Database health check failed: mutex poisoned");
            "unhealthy"
        }
    };

    Json(HealthResponse {
        status: database,
        database,
    })
}

/// Build the web server router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/upload", post(upload_handler))
        .route(
            "/api/card-list/{id}",
            get(get_card_list_handler).patch(rename_card_list_handler),
        )
        .route("/api/card-list/{id}/share", get(share_handler))
        .route("/api/health", get(health_handler))
        .route("/card-list/{id}", get(card_list_page_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

/// Start the web server and run until Ctrl-C
pub async fn serve(state: AppState) -> Result<(), ServiceError> {
    let addr = state.config.bind_addr;
    let app = create_router(state);

    log::info!("Card list API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
#[path = "web_tests.rs"]
mod tests;
