//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the fixture.
//! All types derive Serde traits so a TOML file can stand in for CLI flags.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default HTTPS port, matching what binary-cache clients under test expect.
pub const DEFAULT_PORT: u16 = 8443;

/// Root configuration. Immutable once the server has started.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Certificate material for mutual TLS.
    pub tls: TlsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host name or address to bind. Loopback by default.
    pub host: String,

    /// TCP port. `0` asks the OS for an ephemeral port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// TLS material, all PEM encoded.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TlsConfig {
    /// Server certificate chain presented to clients.
    pub cert_path: PathBuf,

    /// Private key matching `cert_path`.
    pub key_path: PathBuf,

    /// CA root every client certificate must chain to.
    pub ca_cert_path: PathBuf,
}

/// Timeouts guarding a single connection and the shutdown drain.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound on the TLS handshake.
    pub handshake_secs: u64,

    /// Upper bound on receiving a complete request head.
    pub header_read_secs: u64,

    /// How long shutdown waits for in-flight connections.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            handshake_secs: 10,
            header_read_secs: 30,
            shutdown_grace_secs: 5,
        }
    }
}

impl TimeoutConfig {
    pub fn handshake(&self) -> Duration {
        Duration::from_secs(self.handshake_secs)
    }

    pub fn header_read(&self) -> Duration {
        Duration::from_secs(self.header_read_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
