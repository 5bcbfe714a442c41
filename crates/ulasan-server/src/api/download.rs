use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde::Deserialize;
use ulasan_scraper::{download_file_name, validate_file_id, ObjectStore};

use super::{map_scraper_error, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct DownloadQuery {
    file: Option<String>,
    source: Option<String>,
}

pub(super) async fn download_file(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let request_id = req_id.0;
    let file = query.file.unwrap_or_default();
    if file.is_empty() {
        return Err(ApiError::new(request_id, "validation_error", "file is required"));
    }

    match query.source.as_deref() {
        None | Some("local") => serve_local(&state, request_id, &file).await,
        Some("appwrite") => redirect_to_store(&state, request_id, &file).await,
        Some(other) => Err(ApiError::new(
            request_id,
            "validation_error",
            format!("source must be local or appwrite, got \"{other}\""),
        )),
    }
}

async fn serve_local(
    state: &AppState,
    request_id: String,
    file: &str,
) -> Result<Response, ApiError> {
    let Some(name) = download_file_name(file) else {
        return Err(ApiError::new(request_id, "validation_error", "invalid file name"));
    };
    let path = state.config.data_dir.join(&name);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::new(
                request_id,
                "not_found",
                format!("file {name} not found"),
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "failed to read download");
            return Err(ApiError::new(request_id, "internal_error", "failed to read file"));
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Redirect to the store's download URL once the file is known to exist.
async fn redirect_to_store(
    state: &AppState,
    request_id: String,
    file_id: &str,
) -> Result<Response, ApiError> {
    if !matches!(state.store.as_ref(), ObjectStore::Appwrite(_)) {
        return Err(ApiError::new(
            request_id,
            "bad_request",
            "appwrite storage is not configured",
        ));
    }
    validate_file_id(file_id).map_err(|e| map_scraper_error(request_id.clone(), &e))?;
    let info = state
        .store
        .file_info(file_id)
        .await
        .map_err(|e| map_scraper_error(request_id, &e))?;
    tracing::debug!(file_id, name = %info.name, size = info.size_bytes, "redirecting download");
    Ok(Redirect::temporary(&state.store.download_url(file_id)).into_response())
}
