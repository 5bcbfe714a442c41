//! Router fixtures for handler tests.

use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use ulasan_core::{AppConfig, Environment, StorageBackend};
use ulasan_sentiment::Lexicon;

use super::{build_app, default_rate_limit_state, AppState};
use crate::middleware::AuthState;

pub(crate) fn config_in(root: &Path) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        log_level: "debug".to_string(),
        data_dir: root.join("tweets-data"),
        lexicon_path: None,
        harvest_bin: root.join("no-harvester").to_string_lossy().into_owned(),
        preview_limit: 50,
        storage: StorageBackend::Local {
            root: root.join("storage"),
        },
        storage_timeout_secs: 5,
    }
}

pub(crate) fn state_in(root: &Path) -> AppState {
    let lexicon = Lexicon::from(ulasan_core::builtin_lexicon().expect("built-in lexicon"));
    AppState::from_config(config_in(root), lexicon).expect("state")
}

/// App over a fresh temp directory; keep the `TempDir` alive for the test.
pub(crate) fn test_app(auth: AuthState) -> (Router, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = build_app(state_in(tmp.path()), auth, default_rate_limit_state());
    (app, tmp)
}

pub(crate) fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub(crate) fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub(crate) async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes")
        .to_vec()
}

pub(crate) async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json parse")
}
