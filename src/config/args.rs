//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::ServerConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "mtls-cache-server")]
#[command(about = "Binary cache fixture that only talks to clients holding a CA-signed certificate", long_about = None)]
pub struct Args {
    /// Port to listen on (default: 8443)
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind (default: localhost)
    #[arg(long)]
    pub host: Option<String>,

    /// Server certificate file
    #[arg(long, required_unless_present = "config")]
    pub cert: Option<PathBuf>,

    /// Server private key file
    #[arg(long, required_unless_present = "config")]
    pub key: Option<PathBuf>,

    /// CA certificate for client verification
    #[arg(long = "ca-cert", required_unless_present = "config")]
    pub ca_cert: Option<PathBuf>,

    /// Optional TOML file; flags given on the command line take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Merge the optional config file with command-line flags and validate.
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(cert) = self.cert {
            config.tls.cert_path = cert;
        }
        if let Some(key) = self.key {
            config.tls.key_path = key;
        }
        if let Some(ca_cert) = self.ca_cert {
            config.tls.ca_cert_path = ca_cert;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
