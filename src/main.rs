//! mtls-cache-server
//!
//! A binary cache endpoint for tests that exercise client certificate
//! authentication.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client (cert signed by CA)
//!     ──────────────┐
//!                   ▼
//!          ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//!          │  net::listener  │───▶│    net::tls     │───▶│    net::peer    │
//!          │  bind / accept  │    │ mutual handshake│    │ subject capture │
//!          └─────────────────┘    └─────────────────┘    └────────┬────────┘
//!                                                                 │
//!                                                                 ▼
//!          ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//!     ◀────│  http::response │◀───│     routing     │◀───│   http::guard   │
//!          │ fixed, buffered │    │ exact / suffix  │    │  403 / accept   │
//!          └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```

use clap::Parser;

use mtls_cache_server::config::Args;
use mtls_cache_server::lifecycle::{self, signals};
use mtls_cache_server::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Usage errors exit here with status 2, before anything else runs.
    let args = Args::parse();

    logging::init()?;

    let config = args
        .into_config()
        .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?;

    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        cert = %config.tls.cert_path.display(),
        ca_cert = %config.tls.ca_cert_path.display(),
        "Configuration loaded"
    );

    let handle = lifecycle::start(config)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Startup failed"))?;

    signals::shutdown_signal().await;
    handle.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
