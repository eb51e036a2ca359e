//! TLS configuration and certificate loading.
//!
//! The server presents a fixed certificate chain and refuses any client that
//! does not present a certificate chaining to the configured CA. Clients are
//! authenticated structurally; there is no hostname check on their side.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};

use crate::config::TlsConfig;

/// Error type for TLS setup. Every variant is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no certificates found in {}", .0.display())]
    NoCertificates(PathBuf),

    #[error("no private key found in {}", .0.display())]
    NoPrivateKey(PathBuf),

    #[error("CA certificate in {} rejected: {source}", .path.display())]
    RootStore {
        path: PathBuf,
        #[source]
        source: rustls::Error,
    },

    #[error("failed to build client verifier: {0}")]
    Verifier(#[from] rustls::server::VerifierBuilderError),

    #[error("invalid TLS configuration: {0}")]
    Config(#[from] rustls::Error),
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Load every certificate from a PEM file. An empty file is an error.
pub fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

/// Load the first private key (PKCS#8, PKCS#1 or SEC1) from a PEM file.
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_path_buf()))
}

/// Build a root store from the CA file used to verify clients.
pub fn load_client_roots(path: &Path) -> Result<RootCertStore, TlsError> {
    let mut roots = RootCertStore::empty();
    for cert in load_certs(path)? {
        roots.add(cert).map_err(|source| TlsError::RootStore {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(roots)
}

/// The crypto provider used on both sides of every handshake.
pub fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Build the server-side TLS context requiring a verified client certificate.
pub fn build_server_config(tls: &TlsConfig) -> Result<Arc<ServerConfig>, TlsError> {
    let cert_chain = load_certs(&tls.cert_path)?;
    let key = load_private_key(&tls.key_path)?;
    let roots = load_client_roots(&tls.ca_cert_path)?;

    let provider = crypto_provider();
    let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
        .build()?;

    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_client_cert_verifier(verifier)
        .with_single_cert(cert_chain, key)?;

    tracing::debug!(
        cert = %tls.cert_path.display(),
        ca_cert = %tls.ca_cert_path.display(),
        "TLS context ready, client certificates required"
    );

    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_certs(Path::new("/nonexistent/server.pem")).unwrap_err();
        assert!(matches!(err, TlsError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/server.pem"));
    }

    #[test]
    fn file_without_pem_blocks_has_no_certificates() {
        let file = temp_file("not a certificate\n");
        let err = load_certs(file.path()).unwrap_err();
        assert!(matches!(err, TlsError::NoCertificates(_)));
    }

    #[test]
    fn file_without_key_has_no_private_key() {
        let file = temp_file("");
        let err = load_private_key(file.path()).unwrap_err();
        assert!(matches!(err, TlsError::NoPrivateKey(_)));
    }

    #[test]
    fn missing_ca_fails_server_config() {
        let config = TlsConfig {
            cert_path: "/nonexistent/server.pem".into(),
            key_path: "/nonexistent/server.key".into(),
            ca_cert_path: "/nonexistent/ca.pem".into(),
        };
        assert!(build_server_config(&config).is_err());
    }
}
