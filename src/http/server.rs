//! HTTP server setup and the per-connection serve loop.
//!
//! # Responsibilities
//! - Create the Axum Router (client certificate guard + fixed dispatcher)
//! - Accept connections and run the mutual TLS handshake
//! - Capture the peer certificate into a per-connection context
//! - Serve HTTP/1.1 over the TLS stream with hyper
//! - Drain in-flight connections on shutdown

use axum::{
    extract::Request,
    http::Uri,
    middleware,
    response::Response,
    Extension, Router,
};
use hyper::server::conn::http1;
use hyper_util::{
    rt::{TokioIo, TokioTimer},
    service::TowerToHyperService,
};
use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsAcceptor;

use crate::config::TimeoutConfig;
use crate::http::guard::client_certificate_guard;
use crate::http::response;
use crate::lifecycle::ShutdownSignal;
use crate::net::{ConnectionContext, ConnectionTracker, Listener};
use crate::routing::{self, Route};

/// The fixture's HTTPS server.
#[derive(Clone)]
pub struct HttpServer {
    router: Router,
    acceptor: TlsAcceptor,
    timeouts: TimeoutConfig,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Create a new server around a TLS context that requires client certificates.
    pub fn new(tls: Arc<rustls::ServerConfig>, timeouts: TimeoutConfig) -> Self {
        Self {
            router: Self::build_router(),
            acceptor: TlsAcceptor::from(tls),
            timeouts,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Build the Axum router. The guard sees every request before dispatch.
    fn build_router() -> Router {
        Router::new()
            .fallback(dispatch)
            .layer(middleware::from_fn(client_certificate_guard))
    }

    /// Accept connections until shutdown is triggered, then drain.
    pub async fn run(self, listener: Listener, mut signal: ShutdownSignal) {
        loop {
            tokio::select! {
                biased;
                _ = signal.recv() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        self.spawn_connection(stream, remote_addr, signal.clone());
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                },
            }
        }

        drop(listener);
        tracing::info!(
            active_connections = self.tracker.active_count(),
            "Stopped accepting connections"
        );

        let grace = self.timeouts.shutdown_grace();
        if tokio::time::timeout(grace, self.tracker.wait_idle()).await.is_err() {
            tracing::warn!(
                active_connections = self.tracker.active_count(),
                grace_secs = grace.as_secs(),
                "Connections still open after shutdown grace period"
            );
        }
        tracing::info!("HTTP server stopped");
    }

    fn spawn_connection(&self, stream: TcpStream, remote_addr: SocketAddr, mut signal: ShutdownSignal) {
        let guard = self.tracker.track();
        let acceptor = self.acceptor.clone();
        let router = self.router.clone();
        let timeouts = self.timeouts.clone();

        tokio::spawn(async move {
            let id = guard.id();

            // No response is in flight yet, so shutdown abandons the handshake.
            let handshake = tokio::time::timeout(timeouts.handshake(), acceptor.accept(stream));
            let tls_stream = tokio::select! {
                result = handshake => match result {
                    Ok(Ok(tls_stream)) => tls_stream,
                    Ok(Err(e)) => {
                        tracing::debug!(connection_id = %id, peer_addr = %remote_addr, error = %e, "TLS handshake failed");
                        return;
                    }
                    Err(_) => {
                        tracing::debug!(connection_id = %id, peer_addr = %remote_addr, "TLS handshake timed out");
                        return;
                    }
                },
                _ = signal.recv() => {
                    tracing::debug!(connection_id = %id, peer_addr = %remote_addr, "Shutdown during TLS handshake");
                    return;
                }
            };

            let context = Arc::new(ConnectionContext::new(id, remote_addr, tls_stream.get_ref().1));
            let service = TowerToHyperService::new(router.layer(Extension(context)));

            let mut builder = http1::Builder::new();
            builder
                .timer(TokioTimer::new())
                .header_read_timeout(timeouts.header_read());
            let conn = builder.serve_connection(TokioIo::new(tls_stream), service);
            tokio::pin!(conn);

            let mut draining = false;
            let result = loop {
                tokio::select! {
                    res = conn.as_mut() => break res,
                    _ = signal.recv(), if !draining => {
                        draining = true;
                        conn.as_mut().graceful_shutdown();
                    }
                }
            };

            if let Err(e) = result {
                tracing::debug!(connection_id = %id, error = %e, "Connection ended with error");
            }
            drop(guard);
        });
    }
}

/// Request target as sent by the client, query string included.
///
/// Absolute-form targets keep their scheme and authority, so
/// `https://host/nix-cache-info` is not the descriptor path.
pub fn request_target(uri: &Uri) -> Cow<'_, str> {
    match uri.path_and_query() {
        Some(pq) if uri.scheme().is_none() => Cow::Borrowed(pq.as_str()),
        _ => Cow::Owned(uri.to_string()),
    }
}

/// Apply the fixed routing policy.
async fn dispatch(request: Request) -> Response {
    let target = request_target(request.uri());
    let route = routing::resolve(request.method(), &target);

    tracing::debug!(
        method = %request.method(),
        path = %target,
        route = route.name(),
        "Dispatching request"
    );

    match route {
        Route::CacheInfo => response::cache_info(&response::store_dir_from_env()),
        Route::Narinfo | Route::NotFound => response::not_found(),
    }
}
