//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS-verified connection
//!     → server.rs (hyper HTTP/1.1 over the TLS stream, Axum router)
//!     → guard.rs (403 unless the peer certificate has a subject)
//!     → [routing layer picks the response policy]
//!     → response.rs (fixed, fully buffered, Connection: close)
//!     → Send to client
//! ```

pub mod guard;
pub mod response;
pub mod server;

pub use server::HttpServer;
