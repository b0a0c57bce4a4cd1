//! Integration tests for the development reverse proxy.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, Uri};
use tokio::net::TcpListener;

use bookstore_api::proxy::build_dev_proxy_router;
use bookstore_api::{DevProxy, ProxyRule};

use crate::helpers::{self, BOUNDARY, Part, TestApp};

/// Serve `router` on an ephemeral local port and return its origin.
async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn proxy_to(origin: &str) -> Router {
    let rules = ["/api", "/uploads"]
        .iter()
        .map(|prefix| ProxyRule::new(prefix, origin).unwrap())
        .collect();
    build_dev_proxy_router(Arc::new(DevProxy::new(rules, None, 1024 * 1024).unwrap()))
}

#[tokio::test]
async fn test_path_and_query_are_forwarded_unchanged() {
    let echo = Router::new().fallback(|uri: Uri| async move { uri.to_string() });
    let proxy = proxy_to(&spawn_backend(echo).await);

    let req = Request::builder()
        .uri("/api/books?page=2&sort=title")
        .body(Body::empty())
        .unwrap();
    let response = helpers::send(&proxy, req).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"/api/books?page=2&sort=title");
}

#[tokio::test]
async fn test_upload_and_fetch_through_proxy() {
    let app = TestApp::new().await;
    app.create_user("u123").await;
    let token = app.token_for("u123");
    let proxy = proxy_to(&spawn_backend(app.router.clone()).await);

    let body = helpers::multipart_body(&[Part::File {
        field: "avatar",
        filename: "me.png",
        content_type: "image/png",
        data: b"proxied png",
    }]);
    let req = Request::builder()
        .method("POST")
        .uri("/api/users/avatar")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    let upload = helpers::send(&proxy, req).await;

    assert_eq!(upload.status, StatusCode::OK);
    assert_eq!(upload.body["avatar"], "/uploads/avatars/u123.png");

    let req = Request::builder()
        .uri("/uploads/avatars/u123.png")
        .body(Body::empty())
        .unwrap();
    let fetched = helpers::send(&proxy, req).await;

    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.bytes, b"proxied png");
}

#[tokio::test]
async fn test_backend_errors_are_relayed() {
    let app = TestApp::new().await;
    let proxy = proxy_to(&spawn_backend(app.router.clone()).await);

    let req = Request::builder()
        .method("POST")
        .uri("/api/users/avatar")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(helpers::multipart_body(&[])))
        .unwrap();
    let response = helpers::send(&proxy, req).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn test_other_paths_are_not_forwarded() {
    let echo = Router::new().fallback(|| async { "backend" });
    let proxy = proxy_to(&spawn_backend(echo).await);

    let req = Request::builder()
        .uri("/uploadsx/avatars/u1.png")
        .body(Body::empty())
        .unwrap();
    let response = helpers::send(&proxy, req).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_through_proxy() {
    let app = TestApp::new().await;
    let proxy = proxy_to(&spawn_backend(app.router.clone()).await);

    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = helpers::send(&proxy, req).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}
