//! Development reverse proxy.
//!
//! Stands in for the frontend dev server: paths under the configured
//! prefixes (by default `/api` and `/uploads`) are forwarded to the backend
//! origin with path and query untouched, everything else is answered from
//! the built frontend assets.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::uri::{Authority, PathAndQuery, Scheme, Uri};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use bookstore_core::config::AppConfig;
use bookstore_core::error::{AppError, ErrorKind};
use bookstore_core::result::AppResult;

use crate::app::serve_until_shutdown;
use crate::error::ApiError;

/// Headers that describe a single hop and must not be forwarded.
static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// One forwarding rule: a path prefix and the origin it is sent to.
#[derive(Debug, Clone)]
pub struct ProxyRule {
    prefix: String,
    scheme: Scheme,
    authority: Authority,
}

impl ProxyRule {
    /// Build a rule. `target` must be a bare origin such as
    /// `http://127.0.0.1:5000`.
    pub fn new(prefix: &str, target: &str) -> AppResult<Self> {
        let uri: Uri = target.parse().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid proxy target '{target}'"),
                e,
            )
        })?;
        let parts = uri.into_parts();

        let scheme = parts.scheme.ok_or_else(|| {
            AppError::configuration(format!("Proxy target '{target}' has no scheme"))
        })?;
        let authority = parts.authority.ok_or_else(|| {
            AppError::configuration(format!("Proxy target '{target}' has no host"))
        })?;
        if parts
            .path_and_query
            .as_ref()
            .is_some_and(|pq| pq.as_str() != "/")
        {
            return Err(AppError::configuration(format!(
                "Proxy target '{target}' must be an origin without a path"
            )));
        }

        Ok(Self {
            prefix: format!("/{}", prefix.trim_matches('/')),
            scheme,
            authority,
        })
    }

    /// Normalized prefix, always with a leading slash and no trailing one.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `path` falls under this rule's prefix on a segment boundary.
    pub fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return true;
        }
        path == self.prefix
            || path
                .strip_prefix(self.prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Point `uri` at the target origin, keeping path and query.
    pub fn rewrite(&self, uri: &Uri) -> AppResult<Uri> {
        let path_and_query = uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to rewrite URI", e))
    }
}

/// Forwards matching requests to the backend and serves the frontend for
/// everything else.
#[derive(Debug, Clone)]
pub struct DevProxy {
    rules: Vec<ProxyRule>,
    client: reqwest::Client,
    frontend_dir: Option<PathBuf>,
    max_body_bytes: usize,
}

impl DevProxy {
    /// Create a proxy from explicit rules.
    pub fn new(
        rules: Vec<ProxyRule>,
        frontend_dir: Option<PathBuf>,
        max_body_bytes: usize,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build proxy client", e)
            })?;

        Ok(Self {
            rules,
            client,
            frontend_dir,
            max_body_bytes,
        })
    }

    /// Create a proxy from the `[dev_proxy]` section.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let rules = config
            .dev_proxy
            .prefixes
            .iter()
            .map(|prefix| ProxyRule::new(prefix, &config.dev_proxy.target))
            .collect::<AppResult<Vec<_>>>()?;

        Self::new(
            rules,
            config.dev_proxy.frontend_dir.as_ref().map(PathBuf::from),
            usize::try_from(config.server.max_body_bytes).unwrap_or(usize::MAX),
        )
    }

    /// The longest-prefix rule matching `path`.
    pub fn route(&self, path: &str) -> Option<&ProxyRule> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .max_by_key(|rule| rule.prefix.len())
    }

    /// Send `request` to the rule's origin and relay the answer.
    pub async fn forward(&self, rule: &ProxyRule, request: Request) -> AppResult<Response> {
        let (parts, body) = request.into_parts();
        let upstream_uri = rule.rewrite(&parts.uri)?;

        let body = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(body_error)?;

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);

        let upstream = self
            .client
            .request(parts.method, upstream_uri.to_string())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Upstream {upstream_uri} is unreachable"),
                    e,
                )
            })?;

        let status = upstream.status();
        let mut response_headers = upstream.headers().clone();
        strip_hop_by_hop(&mut response_headers);
        response_headers.remove(header::CONTENT_LENGTH);

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

async fn proxy_handler(State(proxy): State<Arc<DevProxy>>, request: Request) -> Response {
    let path = request.uri().path().to_string();

    if let Some(rule) = proxy.route(&path) {
        tracing::debug!(path = %path, prefix = %rule.prefix(), "Forwarding to backend");
        return match proxy.forward(rule, request).await {
            Ok(response) => response,
            Err(e) => ApiError(e).into_response(),
        };
    }

    match &proxy.frontend_dir {
        Some(dir) => serve_frontend(dir, request).await,
        None => ApiError(AppError::not_found(format!("No route for {path}"))).into_response(),
    }
}

/// Serve built assets, falling back to `index.html` for client-side routes.
async fn serve_frontend(dir: &Path, request: Request) -> Response {
    let service = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
    match service.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Router answering every path through the proxy.
pub fn build_dev_proxy_router(proxy: Arc<DevProxy>) -> Router {
    Router::new()
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(proxy)
}

/// Run the development proxy until a shutdown signal arrives.
pub async fn run_dev_proxy(config: AppConfig) -> AppResult<()> {
    config.validate()?;

    let proxy = Arc::new(DevProxy::from_config(&config)?);
    let addr = config.dev_proxy.bind_address();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;

    tracing::info!(
        "Dev proxy listening on {}, forwarding {:?} to {}",
        addr,
        config.dev_proxy.prefixes,
        config.dev_proxy.target
    );

    serve_until_shutdown(
        listener,
        build_dev_proxy_router(proxy),
        Duration::from_secs(config.server.shutdown_grace_seconds),
    )
    .await
}

/// Only an exceeded length limit is the client's payload being too large;
/// any other buffering failure means the request body itself was broken.
fn body_error(err: axum::Error) -> AppError {
    let too_large = std::error::Error::source(&err)
        .is_some_and(|source| source.is::<LengthLimitError>());
    if too_large {
        AppError::with_source(
            ErrorKind::PayloadTooLarge,
            "Request body exceeds the forwarding limit",
            err,
        )
    } else {
        AppError::with_source(
            ErrorKind::Validation,
            "Request body could not be read for forwarding",
            err,
        )
    }
}
