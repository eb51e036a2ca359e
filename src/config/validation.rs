//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and clap handle syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Ensure every piece of TLS material has been named
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Whether the files are readable PEM is left to TLS setup, which is fatal anyway

use std::fmt;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Render a list of errors on one line.
pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::new("listener.host", "must not be empty"));
    }

    let tls = &config.tls;
    for (field, path) in [
        ("tls.cert_path", &tls.cert_path),
        ("tls.key_path", &tls.key_path),
        ("tls.ca_cert_path", &tls.ca_cert_path),
    ] {
        if path.as_os_str().is_empty() {
            errors.push(ValidationError::new(field, "is required"));
        }
    }

    let timeouts = &config.timeouts;
    for (field, secs) in [
        ("timeouts.handshake_secs", timeouts.handshake_secs),
        ("timeouts.header_read_secs", timeouts.header_read_secs),
        ("timeouts.shutdown_grace_secs", timeouts.shutdown_grace_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
