//! Integration tests for key-checked downloads.

mod helpers;

use http::{StatusCode, header};

use codeshare_database::ShareRepository;
use codeshare_service::CodeGenerator;
use helpers::{Part, TestApp, query_param};

#[tokio::test]
async fn test_download_streams_original_bytes() {
    let app = TestApp::new().await;
    let code = app.upload_file("report.txt", b"quarterly numbers").await;

    let link = app.resolve_link(&code).await;
    assert!(link.starts_with("/share/download?key="));

    let response = app.get_raw(&link).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], b"quarterly numbers");
    assert_eq!(response.headers[header::CONTENT_TYPE], "text/plain");

    let disposition = response.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"report.txt\""));
}

#[tokio::test]
async fn test_key_from_another_code_is_rejected() {
    let app = TestApp::new().await;
    let code_a = app.upload_file("a.bin", b"first file").await;
    let code_b = app.upload_file("b.bin", b"second file").await;

    let link_a = app.resolve_link(&code_a).await;
    let key_a = query_param(&link_a, "key");

    let response = app
        .request("GET", &format!("/share/download?key={key_a}&code={code_b}"))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "KEY_MISMATCH");

    let link_b = app.resolve_link(&code_b).await;
    assert_eq!(app.get_raw(&link_b).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_query_params() {
    let app = TestApp::new().await;
    for path in [
        "/share/download",
        "/share/download?code=123456",
        "/share/download?key=&code=123456",
    ] {
        let response = app.request("GET", path).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(response.body["code"], 0);
    }
}

#[tokio::test]
async fn test_text_share_has_nothing_to_download() {
    let app = TestApp::new().await;
    let response = app.upload(&[Part::Text("text", "just words")]).await;
    let code = response.body["data"]["code"].as_str().unwrap().to_string();

    let share = app.repo.find_by_code(&code).await.unwrap().unwrap();
    let key = CodeGenerator::new().derive_key(&share.id, &share.code);

    let response = app
        .request("GET", &format!("/share/download?key={key}&code={code}"))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_code_download_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .request("GET", "/share/download?key=YWJj&code=000000")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
