//! Development reverse proxy configuration.

use serde::{Deserialize, Serialize};

/// Settings for the frontend-origin proxy used during local development.
///
/// Requests whose path begins with one of `prefixes` are forwarded to
/// `target` unchanged apart from scheme, host and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevProxyConfig {
    /// Bind address of the frontend origin.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port of the frontend origin.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Backend origin, e.g. `http://127.0.0.1:5000`.
    #[serde(default = "default_target")]
    pub target: String,
    /// Path prefixes forwarded to the backend.
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
    /// Built frontend assets served for every other path.
    #[serde(default)]
    pub frontend_dir: Option<String>,
}

impl Default for DevProxyConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            target: default_target(),
            prefixes: default_prefixes(),
            frontend_dir: None,
        }
    }
}

impl DevProxyConfig {
    /// `host:port` string suitable for binding a listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5173
}

fn default_target() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_prefixes() -> Vec<String> {
    vec!["/api".to_string(), "/uploads".to_string()]
}
