//! Integration tests for the avatar upload endpoint.

use std::sync::Arc;

use http::StatusCode;
use serde_json::json;

use crate::helpers::{FailingUpdates, Part, TestApp};

#[tokio::test]
async fn test_upload_returns_public_url() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    let response = app.upload_file("u123", "me.png", b"\x89PNG fake").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "avatar": "/uploads/avatars/u123.png" }));
    assert_eq!(
        std::fs::read(app.avatar_dir().join("u123.png")).unwrap(),
        b"\x89PNG fake"
    );

    let user = app.find_user("u123").await.unwrap();
    assert_eq!(user.avatar.as_deref(), Some("/uploads/avatars/u123.png"));
}

#[tokio::test]
async fn test_profile_reflects_new_avatar() {
    let app = TestApp::new().await;
    app.create_user("u123").await;
    let token = app.token_for("u123");

    let before = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.body["avatar"], serde_json::Value::Null);

    app.upload_file("u123", "me.jpg", b"jpeg").await;

    let after = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(after.body["avatar"], "/uploads/avatars/u123.jpg");
}

#[tokio::test]
async fn test_no_file_part_is_bad_request() {
    let app = TestApp::new().await;
    app.create_user("u123").await;
    let token = app.token_for("u123");

    let response = app
        .upload(
            Some(&token),
            &[Part::Text {
                field: "caption",
                value: "hello",
            }],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "message": "No se subió ningún archivo" })
    );
    assert!(app.stored_files().is_empty());
    assert!(app.find_user("u123").await.unwrap().avatar.is_none());
}

#[tokio::test]
async fn test_part_without_filename_is_not_a_file() {
    let app = TestApp::new().await;
    app.create_user("u123").await;
    let token = app.token_for("u123");

    let response = app
        .upload(
            Some(&token),
            &[Part::File {
                field: "avatar",
                filename: "",
                content_type: "image/png",
                data: b"png",
            }],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "No se subió ningún archivo");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    let response = app
        .upload(
            None,
            &[Part::File {
                field: "avatar",
                filename: "me.png",
                content_type: "image/png",
                data: b"png",
            }],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body["message"].is_string());
    assert!(!app.avatar_dir().exists());
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    let response = app
        .upload(
            Some("not-a-jwt"),
            &[Part::File {
                field: "avatar",
                filename: "me.png",
                content_type: "image/png",
                data: b"png",
            }],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_unknown_user_writes_nothing() {
    let app = TestApp::new().await;

    let response = app.upload_file("ghost", "me.png", b"png").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_reupload_overwrites_previous_file() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    app.upload_file("u123", "first.png", b"first").await;
    let response = app.upload_file("u123", "second.png", b"second").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["avatar"], "/uploads/avatars/u123.png");
    assert_eq!(app.stored_files(), vec!["u123.png".to_string()]);
    assert_eq!(
        std::fs::read(app.avatar_dir().join("u123.png")).unwrap(),
        b"second"
    );
}

#[tokio::test]
async fn test_new_extension_leaves_old_file() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    app.upload_file("u123", "me.png", b"png").await;
    let response = app.upload_file("u123", "me.jpg", b"jpg").await;

    assert_eq!(response.body["avatar"], "/uploads/avatars/u123.jpg");
    assert_eq!(
        app.stored_files(),
        vec!["u123.jpg".to_string(), "u123.png".to_string()]
    );
    let user = app.find_user("u123").await.unwrap();
    assert_eq!(user.avatar.as_deref(), Some("/uploads/avatars/u123.jpg"));
}

#[tokio::test]
async fn test_filenames_are_unique_per_user() {
    let app = TestApp::new().await;
    app.create_user("u1").await;
    app.create_user("u2").await;

    let first = app.upload_file("u1", "photo.png", b"one").await;
    let second = app.upload_file("u2", "photo.png", b"two").await;

    assert_eq!(first.body["avatar"], "/uploads/avatars/u1.png");
    assert_eq!(second.body["avatar"], "/uploads/avatars/u2.png");
    assert_eq!(
        std::fs::read(app.avatar_dir().join("u1.png")).unwrap(),
        b"one"
    );
}

#[tokio::test]
async fn test_only_last_extension_is_kept() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    let response = app.upload_file("u123", "backup.tar.gz", b"gz").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["avatar"], "/uploads/avatars/u123.gz");
}

#[tokio::test]
async fn test_filename_without_extension() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    let response = app.upload_file("u123", "avatar", b"raw").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["avatar"], "/uploads/avatars/u123");
    assert!(app.avatar_dir().join("u123").is_file());
}

#[tokio::test]
async fn test_persistence_failure_keeps_file() {
    let repo = Arc::new(FailingUpdates::default());
    let app = TestApp::build(repo, |_| {}).await;
    app.create_user("u123").await;

    let response = app.upload_file("u123", "me.png", b"png").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body["message"].is_string());
    assert_eq!(app.stored_files(), vec!["u123.png".to_string()]);
    assert!(app.find_user("u123").await.unwrap().avatar.is_none());
}

#[tokio::test]
async fn test_storage_failure_keeps_previous_avatar() {
    let app = TestApp::new().await;
    app.create_user("u123").await;
    let first = app.upload_file("u123", "me.png", b"original").await;
    assert_eq!(first.status, StatusCode::OK);

    // Replace the avatar directory with a plain file so nothing can be written.
    std::fs::remove_dir_all(app.avatar_dir()).unwrap();
    std::fs::write(app.avatar_dir(), b"not a directory").unwrap();

    let response = app.upload_file("u123", "me.jpg", b"replacement").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body["message"].is_string());
    assert_eq!(
        app.find_user("u123").await.unwrap().avatar.as_deref(),
        Some("/uploads/avatars/u123.png")
    );
    assert_eq!(std::fs::read(app.avatar_dir()).unwrap(), b"not a directory");
}

#[tokio::test]
async fn test_second_file_part_is_rejected() {
    let app = TestApp::new().await;
    app.create_user("u123").await;
    let token = app.token_for("u123");

    let response = app
        .upload(
            Some(&token),
            &[
                Part::File {
                    field: "avatar",
                    filename: "a.png",
                    content_type: "image/png",
                    data: b"a",
                },
                Part::File {
                    field: "avatar",
                    filename: "b.png",
                    content_type: "image/png",
                    data: b"b",
                },
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_text_parts_are_ignored() {
    let app = TestApp::new().await;
    app.create_user("u123").await;
    let token = app.token_for("u123");

    let response = app
        .upload(
            Some(&token),
            &[
                Part::Text {
                    field: "caption",
                    value: "me at the beach",
                },
                Part::File {
                    field: "avatar",
                    filename: "beach.webp",
                    content_type: "image/webp",
                    data: b"webp",
                },
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["avatar"], "/uploads/avatars/u123.webp");
}

#[tokio::test]
async fn test_oversized_file_keeps_previous_avatar() {
    let app = TestApp::with_config(|c| c.storage.avatars.max_bytes = Some(4)).await;
    app.create_user("u123").await;

    app.upload_file("u123", "me.png", b"tiny").await;
    let response = app.upload_file("u123", "me.png", b"far too large").await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.stored_files(), vec!["u123.png".to_string()]);
    assert_eq!(
        std::fs::read(app.avatar_dir().join("u123.png")).unwrap(),
        b"tiny"
    );
}

#[tokio::test]
async fn test_request_body_limit() {
    let app = TestApp::with_config(|c| c.server.max_body_bytes = 256).await;
    app.create_user("u123").await;

    let response = app.upload_file("u123", "me.png", &[7u8; 4096]).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_disallowed_type_is_rejected() {
    let app =
        TestApp::with_config(|c| c.storage.avatars.allowed_types = vec!["image/*".into()]).await;
    app.create_user("u123").await;
    let token = app.token_for("u123");

    let response = app
        .upload(
            Some(&token),
            &[Part::File {
                field: "avatar",
                filename: "notes.txt",
                content_type: "text/plain",
                data: b"hello",
            }],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(app.stored_files().is_empty());

    let ok = app.upload_file("u123", "me.png", b"png").await;
    assert_eq!(ok.status, StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_uploads_last_writer_wins() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    let (a, b) = tokio::join!(
        app.upload_file("u123", "a.png", b"AAAAAAAA"),
        app.upload_file("u123", "b.png", b"BBBBBBBB"),
    );

    assert_eq!(a.status, StatusCode::OK);
    assert_eq!(b.status, StatusCode::OK);
    assert_eq!(app.stored_files(), vec!["u123.png".to_string()]);

    let content = std::fs::read(app.avatar_dir().join("u123.png")).unwrap();
    assert!(content == b"AAAAAAAA" || content == b"BBBBBBBB");

    let user = app.find_user("u123").await.unwrap();
    assert_eq!(user.avatar.as_deref(), Some("/uploads/avatars/u123.png"));
}
