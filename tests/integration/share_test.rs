//! Integration tests for upload, resolve, and detail.

mod helpers;

use chrono::Duration;
use http::StatusCode;

use codeshare_database::ShareRepository;

use helpers::{Part, TestApp, created_at};

#[tokio::test]
async fn test_text_share_round_trip() {
    let app = TestApp::new().await;

    let response = app
        .upload(&[Part::Text("text", "hello"), Part::Text("expireTime", "0")])
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["code"], 1);
    assert!(response.body["data"]["fileUrl"].is_null());

    let code = response.body["data"]["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let resolved = app.request("GET", &format!("/api/share/{code}")).await;
    assert_eq!(resolved.status, StatusCode::OK);
    assert_eq!(resolved.body["code"], 1);
    assert!(resolved.body["data"].is_null());

    let detail = app.request("GET", &format!("/api/share/detail/{code}")).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["data"]["text"], "hello");
    assert!(detail.body["data"]["fileName"].is_null());

    // Never expires.
    app.clock.advance(Duration::days(365));
    let later = app.request("GET", &format!("/api/share/{code}")).await;
    assert_eq!(later.status, StatusCode::OK);
}

#[tokio::test]
async fn test_file_reupload_returns_same_share() {
    let app = TestApp::new().await;

    let first = app.upload(&[Part::File("a.txt", b"identical")]).await;
    let second = app
        .upload(&[Part::File("b.txt", b"identical"), Part::Text("expireTime", "3")])
        .await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.body["data"]["code"], second.body["data"]["code"]);
    assert_eq!(first.body["data"]["fileUrl"], second.body["data"]["fileUrl"]);
    assert_eq!(std::fs::read_dir(&app.storage_root).unwrap().count(), 1);
}

#[tokio::test]
async fn test_custom_code_is_returned_verbatim() {
    let app = TestApp::new().await;
    let response = app
        .upload(&[Part::File("report.pdf", b"%PDF"), Part::Text("code", "999999")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["code"], "999999");

    let detail = app.request("GET", "/api/share/detail/999999").await;
    assert_eq!(detail.body["data"]["fileName"], "report.pdf");
}

#[tokio::test]
async fn test_share_expires_after_one_minute() {
    let app = TestApp::new().await;
    let response = app
        .upload(&[
            Part::File("minute.txt", b"short lived"),
            Part::Text("expireTime", "1"),
            Part::Text("expireUnit", "1"),
        ])
        .await;
    let code = response.body["data"]["code"].as_str().unwrap().to_string();
    let created = created_at(&app, &code).await;

    app.clock.set(created + Duration::seconds(30));
    let link = app.resolve_link(&code).await;
    assert_eq!(app.get_raw(&link).await.status, StatusCode::OK);

    app.clock.set(created + Duration::seconds(90));
    let resolved = app.request("GET", &format!("/api/share/{code}")).await;
    assert_eq!(resolved.status, StatusCode::GONE);
    assert_eq!(resolved.body["code"], 0);
    assert_eq!(resolved.body["error"], "EXPIRED");

    assert_eq!(app.get_raw(&link).await.status, StatusCode::GONE);
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let app = TestApp::new().await;
    for path in ["/api/share/000000", "/api/share/detail/000000"] {
        let response = app.request("GET", path).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["code"], 0);
        assert_eq!(response.body["error"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_oversize_upload_rejected_before_storage() {
    let app = TestApp::with_max_upload(1024).await;
    let data = vec![7u8; 1025];

    let response = app.upload(&[Part::File("big.bin", &data)]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
    assert!(!app.storage_root.exists());

    let at_limit = app.upload(&[Part::File("ok.bin", &data[..1024])]).await;
    assert_eq!(at_limit.status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_forms_are_rejected() {
    let app = TestApp::new().await;

    let empty = app.upload(&[Part::Text("expireTime", "5")]).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["msg"], "A file or text is required");

    let negative = app
        .upload(&[Part::Text("text", "x"), Part::Text("expireTime", "-1")])
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let garbled = app
        .upload(&[Part::Text("text", "x"), Part::Text("expireUnit", "days")])
        .await;
    assert_eq!(garbled.status, StatusCode::BAD_REQUEST);
    assert_eq!(garbled.body["msg"], "expireUnit must be an integer");

    let slashed = app
        .upload(&[Part::Text("text", "x"), Part::Text("code", "a/b")])
        .await;
    assert_eq!(slashed.status, StatusCode::BAD_REQUEST);
    assert_eq!(slashed.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_resolve_marks_share_accessed() {
    let app = TestApp::new().await;
    let code = app.upload_file("seen.txt", b"seen").await;

    app.request("GET", &format!("/api/share/detail/{code}")).await;
    let share = app.repo.find_by_code(&code).await.unwrap().unwrap();
    assert_eq!(share.status as i32, 0);

    app.resolve_link(&code).await;
    let share = app.repo.find_by_code(&code).await.unwrap().unwrap();
    assert_eq!(share.status as i32, 1);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    app.upload_file("warmup.txt", b"creates the content root").await;

    let response = app.request("GET", "/api/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], true);
}
