//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, accept)
//!     → tls.rs (mutual TLS handshake, client chain verified against the CA)
//!     → peer.rs (extract the verified peer subject into a ConnectionContext)
//!     → connection.rs (id, lifecycle tracking)
//!     → Hand off to HTTP layer
//!
//! Connection States:
//!     Accepting → Handshaking → Verifying → {Rejected, Accepted} → Closed
//! ```
//!
//! # Design Decisions
//! - Clients without a CA-signed certificate fail inside the handshake and
//!   never reach the HTTP layer
//! - Peer certificate inspection sits behind the `PeerIdentity` trait
//! - Each connection tracked for graceful shutdown

pub mod connection;
pub mod listener;
pub mod peer;
pub mod tls;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Listener, ListenerError};
pub use peer::{ConnectionContext, PeerCertError, PeerCertificate, PeerIdentity, Rejection, Subject};
pub use tls::{build_server_config, TlsError};
