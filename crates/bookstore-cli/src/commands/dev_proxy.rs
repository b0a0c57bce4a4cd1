//! Start the development reverse proxy.

use clap::Args;

use bookstore_core::error::AppError;

/// Arguments for the dev-proxy command
#[derive(Debug, Args)]
pub struct DevProxyArgs {
    /// Override the proxy port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the backend origin, e.g. `http://127.0.0.1:5000`
    #[arg(long)]
    pub target: Option<String>,

    /// Serve built frontend assets from this directory
    #[arg(long)]
    pub frontend_dir: Option<String>,
}

/// Execute the dev-proxy command
pub async fn execute(args: &DevProxyArgs, config_path: Option<&str>) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = args.port {
        config.dev_proxy.port = port;
    }
    if let Some(ref target) = args.target {
        config.dev_proxy.target = target.clone();
    }
    if let Some(ref dir) = args.frontend_dir {
        config.dev_proxy.frontend_dir = Some(dir.clone());
    }

    println!("Starting dev proxy...");
    println!("  Listen: {}", config.dev_proxy.bind_address());
    println!("  Target: {}", config.dev_proxy.target);
    println!("  Prefixes: {}", config.dev_proxy.prefixes.join(", "));

    bookstore_api::run_dev_proxy(config).await
}
