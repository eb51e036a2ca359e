//! Client certificate guard.
//!
//! Runs before routing on every request. The handshake has already checked
//! the chain; this rejects verified connections whose certificate cannot be
//! read or carries no subject.

use std::sync::Arc;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::http::response;
use crate::http::server::request_target;
use crate::net::{ConnectionContext, PeerCertificate, Rejection};

pub async fn client_certificate_guard(request: Request, next: Next) -> Response {
    let Some(context) = request.extensions().get::<Arc<ConnectionContext>>().cloned() else {
        tracing::error!("Request arrived without connection context");
        return response::forbidden(&Rejection::Missing.to_string());
    };

    match context.authorize() {
        Ok(subject) => {
            tracing::info!(connection_id = %context.id, subject = %subject, "Client connected");
            tracing::info!(
                connection_id = %context.id,
                path = %request_target(request.uri()),
                "Path requested"
            );
            next.run(request).await
        }
        Err(rejection) => {
            match &context.peer {
                PeerCertificate::Unreadable(e) => tracing::warn!(
                    connection_id = %context.id,
                    error = %e,
                    "Error getting client certificate"
                ),
                _ => tracing::warn!(
                    connection_id = %context.id,
                    reason = %rejection,
                    "Client certificate rejected"
                ),
            }
            response::forbidden(&rejection.to_string())
        }
    }
}
