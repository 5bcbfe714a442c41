use axum::{
    extract::{Query, State},
    Extension, Json,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use ulasan_scraper::{read_rows_from_path, write_rows, JobMeta};
use ulasan_sentiment::{run_batch, PipelineOptions, PipelineStats, Row, DEFAULT_TEXT_FIELD};

use super::{map_scraper_error, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

const MIN_JOB_ID_LEN: usize = 5;

/// Chars left unescaped in a URI component.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Deserialize)]
pub(super) struct PreprocessQuery {
    #[serde(alias = "jobId")]
    job_id: Option<String>,
    #[serde(alias = "textCol")]
    text_col: Option<String>,
    #[serde(alias = "useStopwords")]
    use_stopwords: Option<String>,
    dedup: Option<String>,
    #[serde(alias = "dropEmpty")]
    drop_empty: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PreprocessData {
    job_id: String,
    stats: PipelineStats,
    download: String,
    file_id: String,
    file_url: String,
    preview: Vec<Row>,
}

/// `"0"` or `"1"`, defaulting to on.
fn parse_flag(name: &str, value: Option<&str>) -> Result<bool, String> {
    match value {
        None | Some("1") => Ok(true),
        Some("0") => Ok(false),
        Some(other) => Err(format!("{name} must be 0 or 1, got \"{other}\"")),
    }
}

fn download_route(file_name: &str) -> String {
    format!(
        "/api/v1/download?file={}",
        utf8_percent_encode(file_name, URI_COMPONENT)
    )
}

impl PreprocessQuery {
    fn into_parts(self, preview_limit: usize) -> Result<(String, PipelineOptions), String> {
        let job_id = self.job_id.unwrap_or_default();
        if job_id.chars().count() < MIN_JOB_ID_LEN {
            return Err(format!("job_id must be at least {MIN_JOB_ID_LEN} characters"));
        }
        let text_field = match self.text_col {
            Some(col) if !col.trim().is_empty() => col,
            _ => DEFAULT_TEXT_FIELD.to_string(),
        };
        let options = PipelineOptions {
            text_field,
            use_stopwords: parse_flag("use_stopwords", self.use_stopwords.as_deref())?,
            dedup: parse_flag("dedup", self.dedup.as_deref())?,
            drop_empty: parse_flag("drop_empty", self.drop_empty.as_deref())?,
            preview_limit,
        };
        Ok((job_id, options))
    }
}

pub(super) async fn preprocess_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PreprocessQuery>,
) -> Result<Json<ApiResponse<PreprocessData>>, ApiError> {
    let request_id = req_id.0;
    let (job_id, options) = query
        .into_parts(state.config.preview_limit)
        .map_err(|message| ApiError::new(request_id.clone(), "validation_error", message))?;

    let meta = state
        .jobs
        .load(&job_id)
        .await
        .map_err(|e| map_scraper_error(request_id.clone(), &e))?;
    let rows = read_rows_from_path(&meta.csv_path)
        .await
        .map_err(|e| map_scraper_error(request_id.clone(), &e))?;

    tracing::info!(
        job_id = %job_id,
        rows = rows.len(),
        text_field = %options.text_field,
        use_stopwords = options.use_stopwords,
        dedup = options.dedup,
        drop_empty = options.drop_empty,
        "preprocessing job"
    );

    let lexicon = state.lexicon.clone();
    let output = tokio::task::spawn_blocking(move || run_batch(rows, &lexicon, &options))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "pipeline task failed");
            ApiError::new(request_id.clone(), "internal_error", "preprocessing failed")
        })?;

    let bytes = write_rows(&output.rows).map_err(|e| map_scraper_error(request_id.clone(), &e))?;
    let out_path = state
        .jobs
        .processed_path(&job_id)
        .map_err(|e| map_scraper_error(request_id.clone(), &e))?;
    tokio::fs::write(&out_path, &bytes).await.map_err(|e| {
        tracing::error!(error = %e, path = %out_path.display(), "failed to write processed csv");
        ApiError::new(request_id.clone(), "internal_error", "failed to write output")
    })?;

    let out_name = format!("{job_id}-processed.csv");
    let stored = state
        .store
        .upload(bytes, &out_name)
        .await
        .map_err(|e| map_scraper_error(request_id.clone(), &e))?;

    cleanup_inputs(&state, &meta).await;

    Ok(Json(ApiResponse::new(
        request_id,
        PreprocessData {
            job_id,
            stats: output.stats,
            download: download_route(&out_name),
            file_id: stored.file_id,
            file_url: stored.url,
            preview: output.preview,
        },
    )))
}

/// Best-effort removal of the scraped CSV, its stored upload and its
/// metadata.
async fn cleanup_inputs(state: &AppState, meta: &JobMeta) {
    if let Err(e) = tokio::fs::remove_file(&meta.csv_path).await {
        tracing::warn!(error = %e, path = %meta.csv_path.display(), "failed to delete input csv");
    }
    if let Err(e) = state.store.delete(&meta.file_id).await {
        tracing::warn!(error = %e, file_id = %meta.file_id, "failed to delete raw upload");
    }
    if let Err(e) = state.jobs.remove(&meta.job_id).await {
        tracing::warn!(error = %e, job_id = %meta.job_id, "failed to delete job metadata");
    }
}

#[cfg(test)]
#[path = "preprocess_test.rs"]
mod tests;
