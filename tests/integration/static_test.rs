//! Integration tests for the public avatar URL namespace.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_uploaded_avatar_is_served_at_its_url() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    let upload = app.upload_file("u123", "me.png", b"\x89PNG body").await;
    let url = upload.body["avatar"].as_str().unwrap().to_string();

    let response = app.get(&url, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"\x89PNG body");
    assert_eq!(response.headers["content-type"], "image/png");
}

#[tokio::test]
async fn test_served_bytes_follow_overwrite() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    app.upload_file("u123", "me.png", b"old").await;
    app.upload_file("u123", "me.png", b"new").await;

    let response = app.get("/uploads/avatars/u123.png", None).await;
    assert_eq!(response.bytes, b"new");
}

#[tokio::test]
async fn test_missing_avatar_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/uploads/avatars/nobody.png", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_custom_public_prefix() {
    let app = TestApp::with_config(|c| c.storage.avatars.public_prefix = "/static/faces/".into())
        .await;
    app.create_user("u7").await;

    let upload = app.upload_file("u7", "me.gif", b"GIF89a").await;
    assert_eq!(upload.body["avatar"], "/static/faces/u7.gif");

    let response = app.get("/static/faces/u7.gif", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"GIF89a");

    let old = app.get("/uploads/avatars/u7.gif", None).await;
    assert_eq!(old.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reserved_characters_in_extension_still_resolve() {
    let app = TestApp::new().await;
    app.create_user("u123").await;

    for (filename, stored) in [
        ("me.p%41", "u123.p%41"),
        ("me.p?g", "u123.p?g"),
        ("me.p#g", "u123.p#g"),
    ] {
        let data = format!("bytes of {filename}");
        let upload = app.upload_file("u123", filename, data.as_bytes()).await;
        assert_eq!(upload.status, StatusCode::OK);
        assert!(app.stored_files().contains(&stored.to_string()));

        let url = upload.body["avatar"].as_str().unwrap().to_string();
        assert_eq!(
            app.find_user("u123").await.unwrap().avatar.as_deref(),
            Some(url.as_str())
        );

        let response = app.get(&url, None).await;
        assert_eq!(response.status, StatusCode::OK, "fetching {url}");
        assert_eq!(response.bytes, data.as_bytes());
    }
}

#[tokio::test]
async fn test_encoded_dot_segments_are_hidden() {
    let app = TestApp::new().await;
    std::fs::create_dir_all(app.avatar_dir()).unwrap();
    std::fs::write(app.avatar_dir().join(".u1.png.abc.part"), b"partial").unwrap();

    for path in [
        "/uploads/avatars/.u1.png.abc.part",
        "/uploads/avatars/%2Eu1.png.abc.part",
        "/uploads/avatars/%2eu1.png.abc.part",
    ] {
        let response = app.get(path, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "fetching {path}");
        assert_ne!(response.bytes, b"partial");
    }
}
