//! End-to-end API tests with stubbed providers

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use document_portal::config::{ChunkingConfig, PortalConfig, StorageConfig};
use document_portal::error::Result;
use document_portal::providers::{EmbeddingProvider, LlmProvider};
use document_portal::server::{build_router, state::AppState};

const BOUNDARY: &str = "portal-test-boundary";

/// Embedder that derives a small deterministic vector from the text
struct StubEmbedder;

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let sum: u32 = text.bytes().map(u32::from).sum();
        Ok(vec![
            (sum % 97) as f32 / 97.0 + 0.1,
            (text.len() % 89) as f32 / 89.0 + 0.1,
            1.0,
        ])
    }

    fn dimensions(&self) -> usize {
        3
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// LLM that answers by prompt kind: analysis and comparison prompts get
/// valid structured output, everything else gets a fixed answer
struct StubLlm;

#[async_trait]
impl LlmProvider for StubLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.contains("sentiment_tone") {
            return Ok(r#"{"summary": ["A test document."], "title": "Test Doc", "author": "Not Available", "date_created": "Not Available", "last_modified_date": "Not Available", "publisher": "Not Available", "language": "English", "page_count": "1", "sentiment_tone": "Neutral"}"#.to_string());
        }
        if prompt.contains("JSON array") {
            return Ok(
                r#"[{"Page": "1", "Changes": "Pricing section updated"}, {"Page": "2", "Changes": "NO CHANGE"}]"#
                    .to_string(),
            );
        }
        Ok("The warranty lasts two years [1].".to_string())
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

fn base_config(base: &std::path::Path) -> PortalConfig {
    PortalConfig {
        storage: StorageConfig {
            upload_base: base.join("data"),
            index_base: base.join("index"),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn app_with(config: PortalConfig) -> axum::Router {
    let state = AppState::with_providers(config.clone(), Arc::new(StubEmbedder), Arc::new(StubLlm))
        .expect("state");
    build_router(state, &config)
}

fn test_app(base: &std::path::Path) -> axum::Router {
    app_with(base_config(base))
}

/// Build a multipart body from (field, filename, data) file parts and
/// (name, value) form fields
fn multipart_body(files: &[(&str, &str, &[u8])], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

const DOC_TEXT: &[u8] =
    b"The warranty period for all products is two years from the date of purchase. \
      Claims must be filed in writing and include the original receipt.";

#[tokio::test]
async fn health_reports_service() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "document-portal");
}

#[tokio::test]
async fn index_then_query_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let body = multipart_body(&[("files", "warranty.txt", DOC_TEXT)], &[("k", "3")]);
    let response = app
        .clone()
        .oneshot(multipart_request("/chat/index", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let indexed = json_body(response).await;
    assert_eq!(indexed["k"], 3);
    assert_eq!(indexed["documents"].as_array().unwrap().len(), 1);
    assert!(indexed["chunks_added"].as_u64().unwrap() > 0);
    let session_id = indexed["session_id"].as_str().unwrap().to_string();
    assert!(session_id.starts_with("session_"));

    let response = app
        .oneshot(form_request(
            "/chat/query",
            &format!("question=What+is+the+warranty+period%3F&session_id={session_id}&k=3"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let answer = json_body(response).await;
    assert_eq!(answer["answer"], "The warranty lasts two years [1].");
    assert_eq!(answer["session_id"], session_id.as_str());
    assert!(!answer["sources"].as_array().unwrap().is_empty());
    assert_eq!(answer["sources"][0]["filename"], "warranty.txt");
}

#[tokio::test]
async fn query_without_index_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let response = app
        .oneshot(form_request(
            "/chat/query",
            "question=anything&session_id=session_20250101_000000_deadbeef",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("Index not found"));
}

#[tokio::test]
async fn index_rejects_unsupported_files() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let body = multipart_body(&[("files", "binary.exe", b"MZ")], &[]);
    let response = app
        .oneshot(multipart_request("/chat/index", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn index_requires_files() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let body = multipart_body(&[], &[("k", "5")]);
    let response = app
        .oneshot(multipart_request("/chat/index", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analyze_returns_flattened_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let body = multipart_body(&[("file", "report.txt", DOC_TEXT)], &[]);
    let response = app
        .oneshot(multipart_request("/analyze", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let metadata = json_body(response).await;
    assert_eq!(metadata["title"], "Test Doc");
    assert_eq!(metadata["summary"][0], "A test document.");
    assert_eq!(metadata["sentiment_tone"], "Neutral");
    assert!(metadata["session_id"].as_str().unwrap().starts_with("session_"));
}

#[tokio::test]
async fn compare_reports_page_rows() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let body = multipart_body(
        &[
            ("reference", "v1.txt", DOC_TEXT),
            ("actual", "v2.txt", b"The warranty period is now three years from purchase date for all products."),
        ],
        &[],
    );
    let response = app
        .oneshot(multipart_request("/compare", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let result = json_body(response).await;
    let rows = result["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Page"], "1");
    assert_eq!(rows[1]["Changes"], "NO CHANGE");
}

#[tokio::test]
async fn compare_requires_both_documents() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let body = multipart_body(&[("reference", "v1.txt", DOC_TEXT)], &[]);
    let response = app
        .oneshot(multipart_request("/compare", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let detail = json_body(response).await;
    assert!(detail["detail"].as_str().unwrap().contains("actual"));
}

#[tokio::test]
async fn query_rejects_zero_k() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let response = app
        .oneshot(form_request(
            "/chat/query",
            "question=anything&session_id=session_20250101_000000_deadbeef&k=0",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("k must be positive"));
}

#[tokio::test]
async fn configured_chunking_governs_requests_without_options() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(dir.path());
    config.chunking = ChunkingConfig {
        chunk_size: 60,
        chunk_overlap: 10,
        min_chunk_size: 5,
    };
    let app = app_with(config);

    // No chunking or k fields: the configured values apply
    let body = multipart_body(&[("files", "warranty.txt", DOC_TEXT)], &[]);
    let response = app
        .oneshot(multipart_request("/chat/index", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let indexed = json_body(response).await;
    assert!(
        indexed["chunks_added"].as_u64().unwrap() >= 2,
        "a 60-char chunk size must split this document"
    );
    assert_eq!(indexed["k"], 5, "k falls back to the configured top_k");
}

#[tokio::test]
async fn deleting_a_session_removes_its_index() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let body = multipart_body(&[("files", "warranty.txt", DOC_TEXT)], &[]);
    let response = app
        .clone()
        .oneshot(multipart_request("/chat/index", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session_id = json_body(response).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    let listed = app
        .clone()
        .oneshot(Request::get("/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let sessions = json_body(listed).await;
    assert!(sessions["sessions"]
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s == session_id.as_str()));

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let deleted = json_body(response).await;
    assert_eq!(deleted["uploads_removed"], true);
    assert_eq!(deleted["index_removed"], true);

    // The index is gone; queries now miss
    let response = app
        .clone()
        .oneshot(form_request(
            "/chat/query",
            &format!("question=anything&session_id={session_id}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting again has nothing to remove
    let response = app
        .oneshot(
            Request::delete(format!("/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
