//! Shared test helpers for integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use bookstore_api::AppState;
use bookstore_auth::JwtEncoder;
use bookstore_core::config::AppConfig;
use bookstore_core::error::AppError;
use bookstore_core::result::AppResult;
use bookstore_core::traits::Repository;
use bookstore_core::types::UserId;
use bookstore_database::{DynUserRepository, MemoryUserRepository};
use bookstore_entity::user::{CreateUser, User, UserRole};

/// Multipart boundary used by every test request.
pub const BOUNDARY: &str = "bookstore-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    /// User store behind the router
    pub user_repo: DynUserRepository,
    /// Signs bearer tokens for test users
    encoder: JwtEncoder,
    /// Keeps the storage root alive for the test's duration
    _root: TempDir,
}

impl TestApp {
    /// Create a test application with default settings
    pub async fn new() -> Self {
        Self::build(Arc::new(MemoryUserRepository::new()), |_| {}).await
    }

    /// Create a test application with adjusted configuration
    pub async fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Self {
        Self::build(Arc::new(MemoryUserRepository::new()), customize).await
    }

    /// Create a test application on top of a specific user store
    pub async fn build(
        user_repo: DynUserRepository,
        customize: impl FnOnce(&mut AppConfig),
    ) -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.storage.avatars.root_dir = root
            .path()
            .join("uploads/avatars")
            .to_string_lossy()
            .into_owned();
        customize(&mut config);

        let state = AppState::new(config.clone(), Arc::clone(&user_repo));
        let router = bookstore_api::build_app(state);

        Self {
            router,
            encoder: JwtEncoder::new(&config.auth),
            config,
            user_repo,
            _root: root,
        }
    }

    /// Directory avatars are written to
    pub fn avatar_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.storage.avatars.root_dir)
    }

    /// Names of the files currently in the avatar directory, sorted
    pub fn stored_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.avatar_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| {
                e.expect("Failed to read entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    /// Create a customer with the given id
    pub async fn create_user(&self, id: &str) -> User {
        self.user_repo
            .create(&User::new(CreateUser {
                id: Some(UserId::parse(id).expect("Invalid user id")),
                name: format!("Reader {id}"),
                email: format!("{id}@test.com"),
                role: UserRole::Customer,
            }))
            .await
            .expect("Failed to create test user")
    }

    /// Current stored record for a user
    pub async fn find_user(&self, id: &str) -> Option<User> {
        self.user_repo
            .find_by_id(&UserId::parse(id).expect("Invalid user id"))
            .await
            .expect("Failed to query user")
    }

    /// Signed access token for a user id
    pub fn token_for(&self, id: &str) -> String {
        self.encoder
            .generate_access_token(
                &UserId::parse(id).expect("Invalid user id"),
                UserRole::Customer,
                id,
            )
            .expect("Failed to sign token")
            .access_token
    }

    /// POST a multipart body to the avatar endpoint
    pub async fn upload(&self, token: Option<&str>, parts: &[Part<'_>]) -> TestResponse {
        let mut req = Request::builder()
            .method("POST")
            .uri("/api/users/avatar")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(multipart_body(parts)))
            .expect("Failed to build request");

        send(&self.router, req).await
    }

    /// Upload a single file as `id`
    pub async fn upload_file(&self, id: &str, filename: &str, data: &[u8]) -> TestResponse {
        let token = self.token_for(id);
        self.upload(
            Some(&token),
            &[Part::File {
                field: "avatar",
                filename,
                content_type: "image/png",
                data,
            }],
        )
        .await
    }

    /// GET a path, optionally authenticated
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut req = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        let req = req.body(Body::empty()).expect("Failed to build request");

        send(&self.router, req).await
    }
}

/// Send a request through a router and collect the response
pub async fn send(router: &Router, req: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
        bytes,
    }
}

/// One part of a multipart body
pub enum Part<'a> {
    /// A file part
    File {
        /// Form field name
        field: &'a str,
        /// Client-supplied filename
        filename: &'a str,
        /// Declared content type
        content_type: &'a str,
        /// Raw bytes
        data: &'a [u8],
    },
    /// A plain form field
    Text {
        /// Form field name
        field: &'a str,
        /// Value
        value: &'a str,
    },
}

/// Encode parts as a `multipart/form-data` body using [`BOUNDARY`]
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                field,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { field, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
    /// Raw body bytes
    pub bytes: Vec<u8>,
}

/// User store whose writes always fail, as if the database dropped the
/// connection mid-request.
#[derive(Debug, Default)]
pub struct FailingUpdates(pub MemoryUserRepository);

#[async_trait]
impl Repository<User, UserId> for FailingUpdates {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        self.0.find_by_id(id).await
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        self.0.create(user).await
    }

    async fn update(&self, _user: &User) -> AppResult<User> {
        Err(AppError::database("connection reset by peer"))
    }
}
