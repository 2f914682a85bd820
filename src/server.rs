//! Embedded HTTP server exposing the word list.
//!
//! Routes live under `/api/words` and map one-to-one onto `WordCommand`s.
//! Store calls are synchronous, so each request runs its command on the
//! blocking pool. A configured static directory is served for every other
//! path.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::commands::{dispatch, CommandError, CommandOutput, ErrorKind, WordCommand};
use crate::config::ServerConfig;
use crate::words::WordStorage;

/// File name offered for backup downloads
const BACKUP_FILE_NAME: &str = "words_backup.json";

type ApiResult = Result<(StatusCode, Json<CommandOutput>), CommandError>;

/// Server handle for managing the server lifecycle.
pub struct WordServer {
    /// Address the server is listening on.
    pub addr: SocketAddr,
    /// Shutdown signal sender.
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl WordServer {
    /// Get the base URL for this server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the server gracefully and wait for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            log::warn!("Word server task ended abnormally: {}", e);
        }
    }
}

impl IntoResponse for CommandError {
    fn into_response(self) -> Response {
        let status = match self.kind {
            ErrorKind::InputError => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            log::error!("Request failed: {}", self.message);
        } else {
            log::debug!("Request rejected ({}): {}", status, self.message);
        }
        (status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Run a command on the blocking pool
async fn run(storage: Arc<WordStorage>, command: WordCommand) -> Result<CommandOutput, CommandError> {
    tokio::task::spawn_blocking(move || dispatch(&storage, command))
        .await
        .map_err(|e| CommandError {
            kind: ErrorKind::StorageError,
            message: format!("Storage task failed: {}", e),
        })?
}

/// Parse a request body. Bodies are read as bytes so malformed JSON gets the
/// same `{ "error": ... }` shape as every other input error.
fn parse_body(body: &Bytes) -> Result<Value, CommandError> {
    serde_json::from_slice(body).map_err(|e| CommandError::input(format!("Malformed JSON body: {}", e)))
}

async fn list_words(State(storage): State<Arc<WordStorage>>) -> ApiResult {
    let output = run(storage, WordCommand::List).await?;
    Ok((StatusCode::OK, Json(output)))
}

async fn add_word(State(storage): State<Arc<WordStorage>>, body: Bytes) -> ApiResult {
    let output = run(storage, WordCommand::Add(parse_body(&body)?)).await?;
    Ok((StatusCode::CREATED, Json(output)))
}

async fn update_word(
    State(storage): State<Arc<WordStorage>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let patch = parse_body(&body)?;
    let output = run(storage, WordCommand::Update { id, patch }).await?;
    Ok((StatusCode::OK, Json(output)))
}

async fn delete_word(State(storage): State<Arc<WordStorage>>, Path(id): Path<String>) -> ApiResult {
    let output = run(storage, WordCommand::Delete { id }).await?;
    Ok((StatusCode::OK, Json(output)))
}

async fn bulk_add(State(storage): State<Arc<WordStorage>>, body: Bytes) -> ApiResult {
    let output = run(storage, WordCommand::BulkAdd(parse_body(&body)?)).await?;
    Ok((StatusCode::CREATED, Json(output)))
}

async fn import_words(State(storage): State<Arc<WordStorage>>, body: Bytes) -> ApiResult {
    let output = run(storage, WordCommand::Import(parse_body(&body)?)).await?;
    Ok((StatusCode::OK, Json(output)))
}

fn export_body(output: CommandOutput) -> Result<String, CommandError> {
    match output {
        CommandOutput::Export(json) => Ok(json),
        other => Err(CommandError {
            kind: ErrorKind::StorageError,
            message: format!("Unexpected response to export: {:?}", other),
        }),
    }
}

/// Full list as a JSON attachment for backups
async fn export_words(State(storage): State<Arc<WordStorage>>) -> Result<Response, CommandError> {
    let json = export_body(run(storage, WordCommand::Export).await?)?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", BACKUP_FILE_NAME),
        )
        .body(Body::from(json))
        .map_err(|e| CommandError {
            kind: ErrorKind::StorageError,
            message: format!("Failed to build response: {}", e),
        })
}

/// Build the application router
pub fn router(storage: Arc<WordStorage>, config: &ServerConfig) -> Router {
    let app = Router::new()
        .route("/api/words", get(list_words).post(add_word))
        .route("/api/words/bulk", post(bulk_add))
        .route("/api/words/import", post(import_words))
        .route("/api/words/export", get(export_words))
        .route("/api/words/{id}", put(update_word).delete(delete_word))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes()))
        .layer(CorsLayer::permissive())
        .with_state(storage);

    match &config.static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    }
}

/// Start the word server.
///
/// Returns a WordServer handle that can be used to get the address and stop the server.
pub async fn start_server(
    storage: Arc<WordStorage>,
    config: &ServerConfig,
) -> Result<WordServer, Box<dyn std::error::Error + Send + Sync>> {
    let app = router(storage, config);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;

    log::info!("Word server started on http://{}", addr);
    if let Some(dir) = &config.static_dir {
        log::info!("Serving static files from {:?}", dir);
    }

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    // Spawn server task
    let task = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                log::info!("Word server shutting down");
            })
            .await;
        if let Err(e) = result {
            log::error!("Word server error: {}", e);
        }
    });

    Ok(WordServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<WordStorage>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(WordStorage::new(temp_dir.path().join("words.json")));
        let app = router(Arc::clone(&storage), &ServerConfig::default());
        (app, storage, temp_dir)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_list_empty() {
        let (app, _storage, _temp) = test_app();
        let (status, body) = send(&app, Method::GET, "/api/words", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let (app, _storage, _temp) = test_app();

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/words",
            Some(json!({ "polish": "Update Me", "english": "Update Me" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["category"], "General");
        assert_eq!(created["tags"], json!([]));
        assert_eq!(created["active"], true);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/words/{}", id),
            Some(json!({ "active": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["active"], false);
        assert_eq!(updated["polish"], "Update Me");

        let (status, body) = send(&app, Method::DELETE, &format!("/api/words/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (status, body) = send(&app, Method::DELETE, &format!("/api/words/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], format!("Word not found: {}", id));
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let (app, storage, _temp) = test_app();
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/words/missing",
            Some(json!({ "active": false })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(storage.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk() {
        let (app, _storage, _temp) = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/words/bulk",
            Some(json!([
                { "polish": "Bulk1", "english": "Bulk1" },
                { "polish": "Bulk2", "english": "Bulk2" }
            ])),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "count": 2 }));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/words/bulk",
            Some(json!({ "polish": "Bulk3" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Input must be an array" }));
    }

    #[tokio::test]
    async fn test_import_defaults_to_merge() {
        let (app, _storage, _temp) = test_app();
        send(&app, Method::POST, "/api/words", Some(json!({ "polish": "a", "english": "b" }))).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/words/import",
            Some(json!({ "words": [{ "polish": "c", "english": "d" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "count": 2 }));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/words/import",
            Some(json!({ "words": [], "mode": "overwrite" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/words/import",
            Some(json!({ "words": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid data format");
    }

    #[tokio::test]
    async fn test_malformed_json_is_input_error() {
        let (app, _storage, _temp) = test_app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/words")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_is_attachment() {
        let (app, _storage, _temp) = test_app();
        send(&app, Method::POST, "/api/words", Some(json!({ "polish": "a", "english": "b" }))).await;

        let request = Request::builder()
            .uri("/api/words/export")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"words_backup.json\""
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let words: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(words.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_export_body_rejects_other_output() {
        let err = export_body(CommandOutput::Added { count: 1 }).unwrap_err();
        assert_eq!(err.kind, ErrorKind::StorageError);
        assert_eq!(export_body(CommandOutput::Export("[]".to_string())).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_import_keeps_records_verbatim() {
        let (app, _storage, _temp) = test_app();
        let records = json!([{ "id": 7, "english": "seven", "polishType": null }]);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/words/import",
            Some(json!({ "words": records.clone(), "mode": "overwrite" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "count": 1 }));

        let (_, listed) = send(&app, Method::GET, "/api/words", None).await;
        assert_eq!(listed, records);
    }

    #[tokio::test]
    async fn test_storage_error_is_500() {
        let (app, storage, _temp) = test_app();
        std::fs::write(storage.data_file(), "[oops").unwrap();
        let (status, body) = send(&app, Method::GET, "/api/words", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("JSON error"));
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(WordStorage::new(temp_dir.path().join("words.json")));
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };

        let server = start_server(storage, &config).await.unwrap();
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
        assert_ne!(server.addr.port(), 0);
        server.shutdown().await;
    }
}
