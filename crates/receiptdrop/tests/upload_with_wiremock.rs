//! End-to-end uploads against a mock HTTP server

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use receiptdrop::{
    Error, ProcessingMethod, RetryOn, Submission, Submitter, UploadRequest, Uploader,
    UploaderConfig,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Short timings so retries finish quickly on a real clock.
fn fast_config(server: &MockServer) -> UploaderConfig {
    UploaderConfig::builder()
        .base_url(server.uri())
        .attempt_timeout(Duration::from_millis(500))
        .base_delay(Duration::from_millis(10))
        .max_delay(Duration::from_millis(50))
        .build()
}

#[tokio::test]
async fn test_upload_success() {
    common::init_tracing();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("cookie", "session=abc123"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"receipt.jpg\""))
        .and(body_string_contains("name=\"processing_method\""))
        .and(body_string_contains("combined"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"success": true, "receipt_id": "R42", "db_integration": true,
                "transaction_id": 991, "client_id": "C-7", "storage_type": "local"}"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = UploaderConfig::builder()
        .base_url(mock_server.uri())
        .session_cookie("session=abc123")
        .build();
    let submitter = Submitter::new(config).expect("Failed to build submitter");

    let submission = submitter
        .submit(&common::receipt_image())
        .await
        .expect("Upload failed");

    match submission {
        Submission::Accepted { receipt, location } => {
            assert_eq!(location, "/receipt/R42");
            assert_eq!(receipt.db_integration, Some(true));
            assert_eq!(receipt.transaction_id, Some(991));
            assert_eq!(receipt.client_id, Some(serde_json::json!("C-7")));
        }
        other => panic!("Expected accepted submission, got {other:?}"),
    }

    mock_server.verify().await;
}

#[tokio::test]
async fn test_retries_after_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database locked"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"success": true, "receipt_id": "R2"}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let uploader = Uploader::new(fast_config(&mock_server)).unwrap();
    let outcome = uploader
        .upload(&common::receipt_image(), 1)
        .await
        .expect("retry should succeed");

    assert_eq!(outcome.receipt_id(), Some("R2"));
    mock_server.verify().await;
}

#[tokio::test]
async fn test_slow_server_times_out_every_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"success": true, "receipt_id": "late"}"#)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let config = UploaderConfig::builder()
        .base_url(mock_server.uri())
        .attempt_timeout(Duration::from_millis(100))
        .base_delay(Duration::from_millis(10))
        .max_delay(Duration::from_millis(10))
        .build();
    let uploader = Uploader::new(config).unwrap();

    let started = std::time::Instant::now();
    let err = uploader
        .upload(&common::receipt_image(), 1)
        .await
        .unwrap_err();

    assert_matches!(err, Error::Timeout(_));
    assert!(started.elapsed() < Duration::from_secs(5));
    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
}

#[tokio::test]
async fn test_unauthorized_fails_fast_in_transient_mode() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error": "login required"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = UploaderConfig::builder()
        .base_url(mock_server.uri())
        .retry_on(RetryOn::Transient)
        .build();
    let uploader = Uploader::new(config).unwrap();

    let err = uploader
        .upload(&common::receipt_image(), 3)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    mock_server.verify().await;
}

#[tokio::test]
async fn test_rejected_file_never_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let uploader = Uploader::new(fast_config(&mock_server)).unwrap();
    let request = UploadRequest::image(b"just text".to_vec(), "notes.txt");

    let err = uploader.upload(&request, 2).await.unwrap_err();

    assert_matches!(err, Error::UnsupportedMediaType(ref t) if t == "application/octet-stream");
    mock_server.verify().await;
}

#[tokio::test]
async fn test_upload_from_file_with_processing_method() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("filename=\"scan.png\""))
        .and(body_string_contains("image/png"))
        .and(body_string_contains("tesseract"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"success": true, "receipt_id": "R3"}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("scan.png");
    std::fs::write(&file, b"fake-png-bytes").unwrap();

    let request = UploadRequest::from_path(&file)
        .await
        .unwrap()
        .with_processing_method(ProcessingMethod::Tesseract);
    let uploader = Uploader::new(fast_config(&mock_server)).unwrap();

    let outcome = uploader.upload(&request, 0).await.unwrap();
    assert_eq!(outcome.receipt_id(), Some("R3"));
    mock_server.verify().await;
}
