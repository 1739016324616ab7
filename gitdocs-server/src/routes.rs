//! Routes and handlers mapping the document store onto HTTP.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gitdocs::{DocStore, Error, WriteRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;

pub fn router(store: DocStore) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/latest", get(latest))
        .route("/docs", post(write))
        .route("/docs/{version}", get(get_root))
        .route("/docs/{version}/{*path}", get(get_object))
        .route("/files/{version}", get(list_root))
        .route("/files/{version}/{*path}", get(list_files))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
struct VersionResponse {
    version: String,
}

async fn latest(State(store): State<DocStore>) -> Result<Json<VersionResponse>, ApiError> {
    let version = blocking(move || store.latest()).await?;
    Ok(Json(VersionResponse { version }))
}

async fn get_root(
    State(store): State<DocStore>,
    Path(version): Path<String>,
) -> Result<Json<Value>, ApiError> {
    object_response(store, version, String::new()).await
}

async fn get_object(
    State(store): State<DocStore>,
    Path((version, path)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    object_response(store, version, path).await
}

async fn object_response(
    store: DocStore,
    version: String,
    path: String,
) -> Result<Json<Value>, ApiError> {
    let found = {
        let path = path.clone();
        blocking(move || store.get_object(&version, &path)).await?
    };
    match found {
        Some(value) => Ok(Json(value)),
        None => Err(ApiError::not_found(path)),
    }
}

async fn list_root(
    State(store): State<DocStore>,
    Path(version): Path<String>,
) -> Result<Json<BTreeMap<String, Value>>, ApiError> {
    let files = blocking(move || store.get_files(&version, "")).await?;
    Ok(Json(files))
}

async fn list_files(
    State(store): State<DocStore>,
    Path((version, path)): Path<(String, String)>,
) -> Result<Json<BTreeMap<String, Value>>, ApiError> {
    let files = blocking(move || store.get_files(&version, &path)).await?;
    Ok(Json(files))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WriteBody {
    parent_version: String,
    update_branch: Option<String>,
    path: String,
    files: BTreeMap<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteResponse {
    commit_hash: String,
}

async fn write(
    State(store): State<DocStore>,
    Json(body): Json<WriteBody>,
) -> Result<Json<WriteResponse>, ApiError> {
    let request = WriteRequest {
        parent: body.parent_version,
        update_branch: body.update_branch,
        path: body.path,
        files: body.files,
    };
    let commit_hash = blocking(move || store.write(&request)).await?;
    tracing::info!(commit = %commit_hash, "write accepted");
    Ok(Json(WriteResponse { commit_hash }))
}

/// Run a store operation on the blocking pool; store operations fetch and
/// touch the checkout, which must stay off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> gitdocs::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(join) => Err(ApiError::internal(join.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(path: String) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            message: if path.is_empty() {
                "not found".to_string()
            } else {
                format!("not found: {path}")
            },
        }
    }

    fn internal(message: String) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::VersionNotFound(_) | Error::UpdateBranchNotFound(_) => StatusCode::NOT_FOUND,
            Error::MergeConflict(_) | Error::PathConflict(_) => StatusCode::CONFLICT,
            Error::MalformedDocument { .. } | Error::InvalidPath(_) | Error::InvalidRefName(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::RemoteUnavailable(_) | Error::PushVerificationFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        }
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
