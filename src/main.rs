//! PDF Ops Server - Entry point
//!
//! Stateless HTTP endpoints for PDF conversion and page operations.

use pdf_ops_server::{run_server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_ops_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    tracing::info!("Starting PDF Ops Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        scratch_dir = %config.scratch_dir.display(),
        max_jobs = config.max_concurrent_jobs,
        "Configuration loaded"
    );

    run_server(config).await
}
