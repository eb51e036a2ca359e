//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (connection_id, subject, path)
//!     → logging.rs (fmt layer on stderr, EnvFilter)
//! ```

pub mod logging;
