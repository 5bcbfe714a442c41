use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use ulasan_sentiment::{analyze_texts, predict, AnalysisStats, Prediction};

use super::{ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

const ANALYZE_PREVIEW_LIMIT: usize = 10;
const MAX_ANALYZE_TEXTS: usize = 5000;

fn default_preprocess() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(super) struct PredictRequest {
    text: String,
    #[serde(default = "default_preprocess")]
    preprocess: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct PredictInput {
    original: String,
    processed: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PredictData {
    input: PredictInput,
    prediction: Prediction,
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    results: Vec<Prediction>,
    stats: AnalysisStats,
    preview: Vec<Prediction>,
}

fn json_rejection(request_id: String, rejection: &JsonRejection) -> ApiError {
    ApiError::new(request_id, "validation_error", rejection.body_text())
}

pub(super) async fn predict_text(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PredictData>>, ApiError> {
    let Json(body) = body.map_err(|e| json_rejection(req_id.0.clone(), &e))?;

    let out = predict(&body.text, &state.lexicon, body.preprocess);
    tracing::debug!(score = out.prediction.score, "text scored");

    Ok(Json(ApiResponse::new(
        req_id.0,
        PredictData {
            input: PredictInput {
                original: out.original,
                processed: out.processed,
            },
            prediction: out.prediction,
        },
    )))
}

pub(super) async fn analyze_batch(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let Json(body) = body.map_err(|e| json_rejection(req_id.0.clone(), &e))?;

    if body.texts.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "texts must not be empty",
        ));
    }
    if body.texts.len() > MAX_ANALYZE_TEXTS {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("at most {MAX_ANALYZE_TEXTS} texts per request"),
        ));
    }

    let lexicon = state.lexicon.clone();
    let analysis = tokio::task::spawn_blocking(move || analyze_texts(&body.texts, &lexicon))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "analyze task failed");
            ApiError::new(req_id.0.clone(), "internal_error", "analysis failed")
        })?;

    let preview = analysis
        .results
        .iter()
        .take(ANALYZE_PREVIEW_LIMIT)
        .cloned()
        .collect();

    Ok(Json(ApiResponse::new(
        req_id.0,
        AnalyzeData {
            results: analysis.results,
            stats: analysis.stats,
            preview,
        },
    )))
}
