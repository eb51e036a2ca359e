//! Mutual-TLS binary cache fixture.
//!
//! Serves a fixed `/nix-cache-info` descriptor and answers every `.narinfo`
//! lookup with 404, but only to clients presenting a certificate signed by
//! the configured CA.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::{start, ServerHandle, Shutdown, StartupError};
