mod download;
mod predict;
mod preprocess;
mod scrape;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use ulasan_core::AppConfig;
use ulasan_scraper::{Harvester, JobStore, ObjectStore, ScraperError, Scraper};
use ulasan_sentiment::Lexicon;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

/// Shared, read-only handles built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub lexicon: Arc<Lexicon>,
    pub store: Arc<ObjectStore>,
    pub jobs: JobStore,
    pub scraper: Arc<Scraper>,
}

impl AppState {
    /// Wire the storage backend, job store and harvester from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the storage HTTP client cannot be
    /// built.
    pub fn from_config(config: AppConfig, lexicon: Lexicon) -> Result<Self, ScraperError> {
        let store = ObjectStore::from_backend(&config.storage, config.storage_timeout_secs)?;
        let jobs = JobStore::new(&config.data_dir);
        let scraper = Scraper::new(
            Harvester::new(config.harvest_bin.clone(), &config.data_dir),
            store.clone(),
            jobs.clone(),
            config.preview_limit,
        );
        Ok(Self {
            config: Arc::new(config),
            lexicon: Arc::new(lexicon),
            store: Arc::new(store),
            jobs,
            scraper: Arc::new(scraper),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    storage: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_scraper_error(request_id: String, error: &ScraperError) -> ApiError {
    match error {
        ScraperError::Validation(_)
        | ScraperError::InvalidJobId(_)
        | ScraperError::InvalidFileId(_)
        | ScraperError::InvalidToken => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        ScraperError::JobNotFound(_) | ScraperError::FileNotFound(_) => {
            ApiError::new(request_id, "not_found", error.to_string())
        }
        ScraperError::Csv(_) => ApiError::new(request_id, "bad_request", error.to_string()),
        _ => {
            tracing::error!(error = %error, "request failed");
            ApiError::new(request_id, "internal_error", error.to_string())
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/scrape", post(scrape::start_scrape))
        .route("/api/v1/preprocess", get(preprocess::preprocess_job))
        .route("/api/v1/download", get(download::download_file))
        .route("/api/v1/predict", post(predict::predict_text))
        .route("/api/v1/sentiment/analyze", post(predict::analyze_batch))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse::new(
        req_id.0,
        HealthData {
            status: "ok",
            storage: state.store.backend_name(),
        },
    ))
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests {
    use super::test_support::{body_json, get, test_app};
    use super::*;
    use crate::middleware::AuthState;
    use tower::ServiceExt;

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_unknown_code_maps_to_internal() {
        let response = ApiError::new("req-1", "internal_error", "boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn scraper_errors_map_to_api_codes() {
        let not_found = map_scraper_error("r".into(), &ScraperError::JobNotFound("x".into()));
        assert_eq!(not_found.error.code, "not_found");
        let invalid = map_scraper_error("r".into(), &ScraperError::InvalidJobId("../".into()));
        assert_eq!(invalid.error.code, "validation_error");
        let status = map_scraper_error(
            "r".into(),
            &ScraperError::StorageStatus {
                status: 500,
                url: "u".into(),
                body: String::new(),
            },
        );
        assert_eq!(status.error.code, "internal_error");
    }

    #[tokio::test]
    async fn health_reports_storage_backend() {
        let (app, _tmp) = test_app(AuthState::disabled());
        let response = app.oneshot(get("/api/v1/health")).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["storage"], "local");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn request_id_header_is_echoed() {
        let (app, _tmp) = test_app(AuthState::disabled());
        let request = axum::http::Request::builder()
            .uri("/api/v1/health")
            .header("x-request-id", "req-abc")
            .body(axum::body::Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.headers()["x-request-id"], "req-abc");
        let json = body_json(response).await;
        assert_eq!(json["meta"]["request_id"], "req-abc");
    }

    #[tokio::test]
    async fn protected_routes_require_bearer_token_when_enabled() {
        let auth = AuthState::from_keys("secret-key", false).expect("auth");
        let (app, _tmp) = test_app(auth);

        let response = app
            .clone()
            .oneshot(get("/api/v1/download?file=x.csv"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let health = app.oneshot(get("/api/v1/health")).await.expect("response");
        assert_eq!(health.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn valid_bearer_token_passes() {
        let auth = AuthState::from_keys("secret-key", false).expect("auth");
        let (app, _tmp) = test_app(auth);
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/v1/predict")
            .header("authorization", "Bearer secret-key")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"text":"bagus"}"#))
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rate_limit_rejects_after_budget() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let state = test_support::state_in(tmp.path());
        let app = build_app(
            state,
            AuthState::disabled(),
            RateLimitState::new(1, Duration::from_secs(60)),
        );
        let first = app
            .clone()
            .oneshot(get("/api/v1/download?file=missing.csv"))
            .await
            .expect("response");
        assert_eq!(first.status(), StatusCode::NOT_FOUND);
        let second = app
            .oneshot(get("/api/v1/download?file=missing.csv"))
            .await
            .expect("response");
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
