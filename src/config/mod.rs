//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags (args.rs)            optional TOML file
//!     └──────────────┬───────────────┘
//!                    → loader.rs (parse & deserialize)
//!                    → CLI overrides applied
//!                    → validation.rs (semantic checks)
//!                    → ServerConfig (validated, immutable)
//!                    → read by TLS setup and the listener only
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server has started
//! - All fields have defaults except the three pieces of TLS material
//! - Validation separates syntactic (serde/clap) from semantic checks

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::Args;
pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, ServerConfig, TimeoutConfig, TlsConfig};
pub use validation::{validate_config, ValidationError};
