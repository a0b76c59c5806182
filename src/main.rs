mod codec;
mod config;
mod handlers;
mod rpc;
mod sap;
mod service;
mod tools;
mod types;
mod view;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use axum::routing::post;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::PlatformConfig;
use handlers::{mcp_handler, AppState};
use service::TimeOffService;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(long, env = "SERVER_PORT", default_value_t = 3000)]
    port: u16,
    /// Path to the TLS certificate file
    #[arg(long)]
    tls_cert: Option<PathBuf>,
    /// Path to the TLS key file
    #[arg(long)]
    tls_key: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn app(state: Arc<AppState>) -> Router {
    // Routes for both /mcp and /mcp/
    Router::new()
        .route("/mcp", post(mcp_handler))
        .route("/mcp/", post(mcp_handler))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_log_level(&args.log_level))
        .with_target(false)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = PlatformConfig::from_env().context("Failed to load SuccessFactors configuration")?;
    info!("Using SuccessFactors endpoint {}", config.base_url);

    let service = TimeOffService::new(Arc::new(config)).context("Failed to create time off service")?;
    let app = app(Arc::new(AppState { service }));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    match (args.tls_cert, args.tls_key) {
        (Some(cert_path), Some(key_path)) => {
            info!("MCP server listening on https://{addr}");
            let tls = RustlsConfig::from_pem_file(cert_path, key_path)
                .await
                .context("Failed to load TLS certificate/key")?;
            axum_server::bind_rustls(addr, tls)
                .serve(app.into_make_service())
                .await
                .context("Failed to start HTTPS server")?;
        }
        (None, None) => {
            info!("MCP server listening on http://{addr}");
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind to address {addr}"))?;
            axum::serve(listener, app)
                .await
                .context("Failed to start HTTP server")?;
        }
        _ => {
            anyhow::bail!("Both --tls-cert and --tls-key must be provided together to enable TLS.");
        }
    }

    Ok(())
}
