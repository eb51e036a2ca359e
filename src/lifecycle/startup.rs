//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the TLS context from the configured PEM files
//! - Bind the listener and spawn the accept loop
//! - Hand back a `ServerHandle` owning the server's lifetime
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and nothing is spawned
//! - Listener binds last (traffic only when TLS is ready)

use std::net::SocketAddr;

use tokio::task::JoinHandle;

use crate::config::validation::join_errors;
use crate::config::{validate_config, ServerConfig, ValidationError};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::{build_server_config, Listener, ListenerError, TlsError};

/// Startup failures. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// A running server.
///
/// Dropping the handle without calling [`ServerHandle::shutdown`] also stops
/// accepting, but nothing waits for the drain.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, let in-flight responses finish, then return.
    pub async fn shutdown(self) {
        tracing::info!(address = %self.local_addr, "Shutting down");
        self.shutdown.trigger();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Server task failed");
        }
    }
}

/// Start the server: TLS setup, bind, and spawn the accept loop.
pub async fn start(config: ServerConfig) -> Result<ServerHandle, StartupError> {
    validate_config(&config).map_err(StartupError::Config)?;

    let tls = build_server_config(&config.tls)?;
    let listener = Listener::bind(&config.listener).await?;
    let local_addr = listener.local_addr();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(tls, config.timeouts.clone());
    let task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tracing::info!(port = local_addr.port(), address = %local_addr, "Server running on port");

    Ok(ServerHandle {
        local_addr,
        shutdown,
        task,
    })
}
