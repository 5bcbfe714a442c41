//! `ObjectStore::Appwrite` against a `wiremock` stand-in for the Appwrite
//! Storage REST API.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use ulasan_core::{AppwriteConfig, StorageBackend};
use ulasan_scraper::{ObjectStore, ScraperError};

fn store_for(server: &MockServer) -> ObjectStore {
    ObjectStore::from_backend(
        &StorageBackend::Appwrite(AppwriteConfig {
            endpoint: format!("{}/v1", server.uri()),
            project_id: "proj-1".to_string(),
            api_key: "secret-key".to_string(),
            bucket_id: "reviews".to_string(),
        }),
        5,
    )
    .expect("build store")
}

#[tokio::test]
async fn upload_posts_multipart_with_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/storage/buckets/reviews/files"))
        .and(header("X-Appwrite-Project", "proj-1"))
        .and(header("X-Appwrite-Key", "secret-key"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "$id": "abc123",
            "name": "job-data.csv",
            "sizeOriginal": 21,
            "mimeType": "text/csv"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stored = store_for(&server)
        .upload(b"id,full_text\n1,bagus\n".to_vec(), "job-data.csv")
        .await
        .expect("upload");

    assert_eq!(stored.file_id, "abc123");
    assert_eq!(
        stored.url,
        format!(
            "{}/v1/storage/buckets/reviews/files/abc123/download?project=proj-1",
            server.uri()
        )
    );

    let requests: Vec<Request> = server.received_requests().await.expect("recorded");
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"fileId\""), "multipart body: {body}");
    assert!(body.contains("filename=\"job-data.csv\""), "multipart body: {body}");
    assert!(body.contains("1,bagus"), "multipart body: {body}");
}

#[tokio::test]
async fn upload_error_status_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/storage/buckets/reviews/files"))
        .respond_with(ResponseTemplate::new(401).set_body_string("missing scope"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .upload(b"x".to_vec(), "x.csv")
        .await
        .expect_err("401");

    match err {
        ScraperError::StorageStatus { status, body, .. } => {
            assert_eq!(status, 401);
            assert_eq!(body, "missing scope");
        }
        other => panic!("expected StorageStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn file_info_maps_appwrite_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/storage/buckets/reviews/files/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "$id": "abc123",
            "name": "job-data.csv",
            "sizeOriginal": 2048,
            "mimeType": "text/csv"
        })))
        .mount(&server)
        .await;

    let info = store_for(&server).file_info("abc123").await.expect("info");
    assert_eq!(info.file_id, "abc123");
    assert_eq!(info.name, "job-data.csv");
    assert_eq!(info.size_bytes, 2048);
    assert_eq!(info.mime_type, "text/csv");
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/storage/buckets/reviews/files/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = store_for(&server).delete("gone").await.expect_err("404");
    assert!(matches!(err, ScraperError::FileNotFound(id) if id == "gone"));
}

#[tokio::test]
async fn delete_succeeds_on_204() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/storage/buckets/reviews/files/abc123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server).delete("abc123").await.expect("delete");
}

#[tokio::test]
async fn corrupt_upload_response_is_json_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/storage/buckets/reviews/files"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .upload(b"x".to_vec(), "x.csv")
        .await
        .expect_err("bad json");
    assert!(matches!(err, ScraperError::Json { .. }), "got: {err:?}");
}
