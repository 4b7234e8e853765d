//! Upload pipeline integration tests

mod common;

use axum_test::multipart::{MultipartForm, Part};
use common::{stored_file_count, test_app, test_app_with, FakeTranscoder, TEST_PASSWORD};
use http::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tempfile::tempdir;

fn image_part(name: &str) -> Part {
    Part::bytes(b"not-a-real-jpeg-but-bytes".to_vec())
        .file_name(name.to_string())
        .mime_type("image/jpeg")
}

fn video_part(name: &str) -> Part {
    Part::bytes(b"fake-mp4-container-bytes".to_vec())
        .file_name(name.to_string())
        .mime_type("video/mp4")
}

#[tokio::test]
async fn test_upload_batch_creates_one_record_per_file() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_part("files", image_part("one.jpg"))
        .add_part("files", image_part("two.jpg"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status_ok();

    let body: Value = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["files"].as_array().unwrap().len(), 2);
    assert_eq!(body["storage_type"], "local");

    // A subsequent list call includes one record per uploaded file with
    // matching size and content type.
    let list: Value = app.server.get("/api/files").await.json();
    let files = list["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    for file in files {
        assert_eq!(file["content_type"], "image/jpeg");
        assert_eq!(
            file["file_size"].as_i64().unwrap(),
            b"not-a-real-jpeg-but-bytes".len() as i64
        );
        assert_eq!(file["storage_type"], "local");
    }

    assert_eq!(stored_file_count(&app.upload_dir), 2);
}

#[tokio::test]
async fn test_upload_generates_fresh_keys_not_client_names() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_part("files", image_part("../../../evil.jpg"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status_ok();

    let body: Value = res.json();
    let filename = body["files"][0]["filename"].as_str().unwrap();
    assert!(!filename.contains(".."));
    assert!(filename.ends_with(".jpg"));
    assert_ne!(filename, "evil.jpg");
    assert_eq!(body["files"][0]["original_filename"], "../../../evil.jpg");
}

#[tokio::test]
async fn test_wrong_password_writes_nothing() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let form = MultipartForm::new()
        .add_text("password", "wrong")
        .add_part("files", image_part("one.jpg"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status(StatusCode::UNAUTHORIZED);

    assert!(app.store.records().is_empty());
    assert_eq!(stored_file_count(&app.upload_dir), 0);
}

#[tokio::test]
async fn test_missing_password_writes_nothing() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let form = MultipartForm::new().add_part("files", image_part("one.jpg"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(stored_file_count(&app.upload_dir), 0);
}

#[tokio::test]
async fn test_unconfigured_password_is_server_error() {
    let dir = tempdir().unwrap();
    let app = test_app_with(
        dir.path(),
        None,
        Arc::new(FakeTranscoder { working: true }),
    )
    .await;

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_part("files", image_part("one.jpg"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = res.json();
    assert_eq!(body["code"], "SERVER_MISCONFIGURED");
    assert_eq!(stored_file_count(&app.upload_dir), 0);
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let form = MultipartForm::new().add_text("password", TEST_PASSWORD);

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disallowed_type_never_reaches_storage() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let exe = Part::bytes(b"MZ....".to_vec())
        .file_name("tool.exe")
        .mime_type("application/x-msdownload");
    // Allowed extension but mismatched (spoofable) content type must also be
    // rejected before any write.
    let spoofed = Part::bytes(b"bytes".to_vec())
        .file_name("innocent.jpg")
        .mime_type("video/mp4");

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_part("files", exe)
        .add_part("files", spoofed);

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status_ok();

    let body: Value = res.json();
    assert_eq!(body["files"].as_array().unwrap().len(), 0);
    assert_eq!(body["failures"].as_array().unwrap().len(), 2);

    assert!(app.store.records().is_empty());
    assert_eq!(stored_file_count(&app.upload_dir), 0);
}

#[tokio::test]
async fn test_oversize_file_rejected_before_persisting() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    // Test config caps uploads at 1 MiB.
    let big = Part::bytes(vec![0u8; 1024 * 1024 + 1])
        .file_name("big.jpg")
        .mime_type("image/jpeg");

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_part("files", big)
        .add_part("files", image_part("small.jpg"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status_ok();

    let body: Value = res.json();
    // The oversize file fails, the rest of the batch proceeds.
    assert_eq!(body["files"].as_array().unwrap().len(), 1);
    assert_eq!(body["failures"][0]["code"], "FILE_TOO_LARGE");
    assert_eq!(stored_file_count(&app.upload_dir), 1);
}

#[tokio::test]
async fn test_video_upload_derives_thumbnail_and_dimensions_together() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_part("files", video_part("clip.mp4"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status_ok();

    let body: Value = res.json();
    let file = &body["files"][0];
    assert_eq!(file["kind"], "video");

    let thumbnail = file["thumbnail"].as_str().unwrap();
    assert!(thumbnail.contains("thumbnails/"));
    assert_eq!(file["dimensions"]["width"], 1920);
    assert_eq!(file["dimensions"]["height"], 1080);

    // Primary artifact plus thumbnail on disk.
    assert_eq!(stored_file_count(&app.upload_dir), 2);
}

#[tokio::test]
async fn test_failed_derivation_omits_both_fields_and_upload_succeeds() {
    let dir = tempdir().unwrap();
    let app = test_app_with(
        dir.path(),
        Some(TEST_PASSWORD),
        Arc::new(FakeTranscoder { working: false }),
    )
    .await;

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_part("files", video_part("clip.mp4"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status_ok();

    let body: Value = res.json();
    let file = &body["files"][0];
    assert!(file["thumbnail"].is_null());
    assert!(file["dimensions"].is_null());

    // Primary artifact only; no stray thumbnail.
    assert_eq!(stored_file_count(&app.upload_dir), 1);
}

#[tokio::test]
async fn test_shared_metadata_applies_to_every_file() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_text(
            "metadata",
            r#"{"location": "Lofoten", "photographer": "Ida", "tags": ["norway"]}"#,
        )
        .add_part("files", image_part("one.jpg"))
        .add_part("files", image_part("two.jpg"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status_ok();

    let body: Value = res.json();
    for file in body["files"].as_array().unwrap() {
        assert_eq!(file["location"], "Lofoten");
        assert_eq!(file["photographer"], "Ida");
        assert_eq!(file["tags"][0], "norway");
    }
}

#[tokio::test]
async fn test_positional_metadata_is_applied_in_order() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_text("metadata", r#"[{"name": "First"}, {"name": "Second"}]"#)
        .add_part("files", image_part("one.jpg"))
        .add_part("files", image_part("two.jpg"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status_ok();

    let body: Value = res.json();
    assert_eq!(body["files"][0]["name"], "First");
    assert_eq!(body["files"][1]["name"], "Second");
}

#[tokio::test]
async fn test_metadata_length_mismatch_rejects_batch() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_text("metadata", r#"[{"name": "Only one"}]"#)
        .add_part("files", image_part("one.jpg"))
        .add_part("files", image_part("two.jpg"));

    let res = app.server.post("/api/upload").multipart(form).await;
    res.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(stored_file_count(&app.upload_dir), 0);
}

#[tokio::test]
async fn test_batch_shares_one_upload_timestamp() {
    let dir = tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let form = MultipartForm::new()
        .add_text("password", TEST_PASSWORD)
        .add_part("files", image_part("one.jpg"))
        .add_part("files", image_part("two.jpg"));

    app.server.post("/api/upload").multipart(form).await;

    let records = app.store.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].uploaded_at, records[1].uploaded_at);
}
