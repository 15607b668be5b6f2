//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use chrono::Utc;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use codeshare_core::config::{AppConfig, DatabaseConfig};
use codeshare_database::migration::run_migrations;
use codeshare_database::{DatabasePool, ShareRepository, SqliteShareRepository};
use codeshare_service::{ExpiryPolicy, ManualClock, ShareService};
use codeshare_storage::{ContentStore, LocalStorageProvider};

const BOUNDARY: &str = "codeshare-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Share records, for looking up ids and creation times
    pub repo: Arc<SqliteShareRepository>,
    /// Clock driving expiry
    pub clock: Arc<ManualClock>,
    /// Content root
    pub storage_root: PathBuf,
    /// Application config
    pub config: AppConfig,
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application with default limits
    pub async fn new() -> Self {
        Self::with_max_upload(AppConfig::default().storage.max_upload_size_bytes).await
    }

    /// Create a new test application with a custom upload ceiling
    pub async fn with_max_upload(max_upload_size_bytes: u64) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage_root = dir.path().join("share");

        let mut config = AppConfig::default();
        config.database = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..DatabaseConfig::default()
        };
        config.storage.root = storage_root.to_string_lossy().to_string();
        config.storage.spool_dir = dir.path().join("spool").to_string_lossy().to_string();
        config.storage.max_upload_size_bytes = max_upload_size_bytes;

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let repo = Arc::new(SqliteShareRepository::new(db.pool().clone()));
        let provider = Arc::new(LocalStorageProvider::new(&storage_root));
        let content = Arc::new(ContentStore::new(provider.clone(), &config.storage.root));
        let clock = Arc::new(ManualClock::new(Utc::now()));

        let share_service = Arc::new(ShareService::new(
            repo.clone(),
            content,
            ExpiryPolicy::new(clock.clone()),
            config.storage.max_upload_size_bytes,
            config.share.code_generation_attempts,
        ));

        let state = codeshare_api::AppState {
            config: Arc::new(config.clone()),
            db,
            storage: provider,
            share_service,
        };
        let router = codeshare_api::build_app(state, &config.server.cors);

        Self {
            router,
            repo,
            clock,
            storage_root,
            config,
            _dir: dir,
        }
    }

    /// Make a request and parse the JSON body
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await.into_json()
    }

    /// POST a multipart form to /api/upload
    pub async fn upload(&self, parts: &[Part<'_>]) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .expect("Failed to build request");
        self.send(req).await.into_json()
    }

    /// Upload a file and return its access code
    pub async fn upload_file(&self, name: &str, data: &[u8]) -> String {
        let response = self.upload(&[Part::File(name, data)]).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["data"]["code"]
            .as_str()
            .expect("No code in upload response")
            .to_string()
    }

    /// Resolve a code and return the download link
    pub async fn resolve_link(&self, code: &str) -> String {
        let response = self.request("GET", &format!("/api/share/{code}")).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["data"]
            .as_str()
            .expect("No download link")
            .to_string()
    }

    /// GET a path and keep the raw body
    pub async fn get_raw(&self, path: &str) -> RawResponse {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> RawResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        RawResponse {
            status,
            headers,
            body,
        }
    }
}

/// One multipart form part
pub enum Part<'a> {
    /// A text field
    Text(&'a str, &'a str),
    /// A file field with its file name and bytes
    File(&'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Response with the body left as bytes
#[derive(Debug)]
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body bytes
    pub body: Bytes,
}

impl RawResponse {
    fn into_json(self) -> TestResponse {
        TestResponse {
            status: self.status,
            body: serde_json::from_slice(&self.body).unwrap_or(Value::Null),
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Value of a query parameter in a link, still percent-encoded
pub fn query_param<'a>(link: &'a str, name: &str) -> &'a str {
    let query = link.split_once('?').map(|(_, q)| q).unwrap_or_default();
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .unwrap_or_default()
}

/// Creation instant of the share behind a code
pub async fn created_at(app: &TestApp, code: &str) -> chrono::DateTime<Utc> {
    app.repo
        .find_by_code(code)
        .await
        .expect("Lookup failed")
        .expect("Share missing")
        .created_at
}
