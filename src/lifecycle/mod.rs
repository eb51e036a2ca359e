//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Build TLS context → Bind listener → Spawn accept loop
//!     → ServerHandle
//!
//! Shutdown (shutdown.rs):
//!     ServerHandle::shutdown() → Stop accepting → Drain connections → Return
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → main calls ServerHandle::shutdown()
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then TLS, then listener
//! - Shutdown is an explicit call; signals are translated only in main
//! - Shutdown has a grace period: open connections are abandoned after it

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{start, ServerHandle, StartupError};
