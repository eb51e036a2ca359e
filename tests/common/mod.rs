//! Shared utilities for integration testing.
//!
//! Generates a throwaway PKI per test (CA, server, clients), starts the
//! server on an ephemeral loopback port, and talks raw HTTP/1.1 over a
//! rustls client so headers can be checked byte for byte.

#![allow(dead_code)]

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mtls_cache_server::{ServerConfig, ServerHandle};
use rcgen::{
    string::BmpString, BasicConstraints, CertificateParams, DistinguishedName, DnType, DnValue,
    ExtendedKeyUsagePurpose, IsCa, Issuer, KeyPair, KeyUsagePurpose, SanType,
};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

/// A certificate and its key, PEM encoded.
pub struct Identity {
    pub cert_pem: String,
    pub key_pem: String,
}

/// Everything a test needs: server material on disk, client material in memory.
pub struct Pki {
    _dir: TempDir,
    pub ca_cert: PathBuf,
    pub server_cert: PathBuf,
    pub server_key: PathBuf,
    pub ca_pem: String,
    /// Signed by the CA, `CN=test-client, O=Fixture Tests`.
    pub client: Identity,
    /// Signed by the CA, empty subject.
    pub anonymous_client: Identity,
    /// Signed by the CA, `CN` encoded as a BMPString.
    pub bmp_client: Identity,
    /// Signed by an unrelated CA.
    pub rogue_client: Identity,
}

fn dn(entries: &[(DnType, &str)]) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    for (ty, value) in entries {
        dn.push(ty.clone(), *value);
    }
    dn
}

fn certificate_authority(name: &str) -> (String, Issuer<'static, KeyPair>) {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    params.distinguished_name = dn(&[(DnType::CommonName, name)]);

    let key = KeyPair::generate().unwrap();
    let cert = params.clone().self_signed(&key).unwrap();
    (cert.pem(), Issuer::new(params, key))
}

fn leaf(
    issuer: &Issuer<'static, KeyPair>,
    subject: DistinguishedName,
    sans: Vec<SanType>,
    usage: ExtendedKeyUsagePurpose,
) -> Identity {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name = subject;
    params.subject_alt_names = sans;
    params.extended_key_usages = vec![usage];

    let key = KeyPair::generate().unwrap();
    let cert = params.signed_by(&key, issuer).unwrap();
    Identity {
        cert_pem: cert.pem(),
        key_pem: key.serialize_pem(),
    }
}

impl Pki {
    pub fn generate() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let (ca_pem, ca) = certificate_authority("Fixture Test CA");
        let (_, rogue_ca) = certificate_authority("Rogue CA");

        let server = leaf(
            &ca,
            dn(&[(DnType::CommonName, "localhost")]),
            vec![
                SanType::DnsName("localhost".try_into().unwrap()),
                SanType::IpAddress(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            ],
            ExtendedKeyUsagePurpose::ServerAuth,
        );
        let client = leaf(
            &ca,
            dn(&[
                (DnType::CommonName, "test-client"),
                (DnType::OrganizationName, "Fixture Tests"),
            ]),
            Vec::new(),
            ExtendedKeyUsagePurpose::ClientAuth,
        );
        let anonymous_client = leaf(
            &ca,
            DistinguishedName::new(),
            Vec::new(),
            ExtendedKeyUsagePurpose::ClientAuth,
        );
        let mut bmp_subject = DistinguishedName::new();
        bmp_subject.push(
            DnType::CommonName,
            DnValue::BmpString(BmpString::try_from("test-client").unwrap()),
        );
        let bmp_client = leaf(
            &ca,
            bmp_subject,
            Vec::new(),
            ExtendedKeyUsagePurpose::ClientAuth,
        );
        let rogue_client = leaf(
            &rogue_ca,
            dn(&[(DnType::CommonName, "test-client")]),
            Vec::new(),
            ExtendedKeyUsagePurpose::ClientAuth,
        );

        let ca_cert = dir.path().join("ca.pem");
        let server_cert = dir.path().join("server.pem");
        let server_key = dir.path().join("server.key");
        std::fs::write(&ca_cert, &ca_pem).unwrap();
        std::fs::write(&server_cert, &server.cert_pem).unwrap();
        std::fs::write(&server_key, &server.key_pem).unwrap();

        Self {
            _dir: dir,
            ca_cert,
            server_cert,
            server_key,
            ca_pem,
            client,
            anonymous_client,
            bmp_client,
            rogue_client,
        }
    }

    /// Server configuration on an ephemeral loopback port.
    pub fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.listener.host = "127.0.0.1".to_string();
        config.listener.port = 0;
        config.tls.cert_path = self.server_cert.clone();
        config.tls.key_path = self.server_key.clone();
        config.tls.ca_cert_path = self.ca_cert.clone();
        config.timeouts.shutdown_grace_secs = 2;
        config
    }

    /// Client TLS config trusting the fixture CA, optionally presenting `identity`.
    pub fn client_config(&self, identity: Option<&Identity>) -> Arc<ClientConfig> {
        let mut roots = RootCertStore::empty();
        for cert in rustls_pemfile::certs(&mut self.ca_pem.as_bytes()) {
            roots.add(cert.unwrap()).unwrap();
        }

        let builder = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_root_certificates(roots);

        let config = match identity {
            Some(identity) => {
                let chain = rustls_pemfile::certs(&mut identity.cert_pem.as_bytes())
                    .collect::<Result<Vec<_>, _>>()
                    .unwrap();
                let key = rustls_pemfile::private_key(&mut identity.key_pem.as_bytes())
                    .unwrap()
                    .unwrap();
                builder.with_client_auth_cert(chain, key).unwrap()
            }
            None => builder.with_no_client_auth(),
        };
        Arc::new(config)
    }
}

/// Start a server for this PKI.
pub async fn start_server(pki: &Pki) -> ServerHandle {
    mtls_cache_server::start(pki.server_config()).await.unwrap()
}

/// Complete a TLS handshake with the server.
pub async fn connect(
    addr: SocketAddr,
    config: Arc<ClientConfig>,
) -> io::Result<TlsStream<TcpStream>> {
    let tcp = TcpStream::connect(addr).await?;
    let server_name = ServerName::try_from("localhost").unwrap();
    TlsConnector::from(config).connect(server_name, tcp).await
}

/// Send `raw` verbatim on an open connection.
pub async fn send(tls: &mut TlsStream<TcpStream>, raw: &str) -> io::Result<()> {
    tls.write_all(raw.as_bytes()).await?;
    tls.flush().await
}

/// Connect, send `raw` verbatim, and read until the server closes.
pub async fn exchange(
    addr: SocketAddr,
    config: Arc<ClientConfig>,
    raw: &str,
) -> io::Result<Vec<u8>> {
    let mut tls = connect(addr, config).await?;
    send(&mut tls, raw).await?;
    read_until_close(tls).await
}

/// Read everything the server sends until it closes the connection.
pub async fn read_until_close(mut tls: TlsStream<TcpStream>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    match tokio::time::timeout(Duration::from_secs(5), tls.read_to_end(&mut buf)).await {
        Ok(Ok(_)) => Ok(buf),
        // A peer that closes without close_notify still delivered its bytes.
        Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof && !buf.is_empty() => Ok(buf),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "server kept the connection open")),
    }
}

/// `GET <path>` with a valid-looking HTTP/1.1 head.
pub fn get(path: &str) -> String {
    format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nAccept: */*\r\n\r\n")
}

/// A parsed HTTP/1.1 response.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Bytes after the `Content-Length` body, e.g. a second response.
    pub trailing: Vec<u8>,
}

impl HttpResponse {
    pub fn parse(raw: &[u8]) -> Self {
        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response head terminator");
        let head = std::str::from_utf8(&raw[..split]).unwrap();
        let rest = &raw[split + 4..];

        let mut lines = head.split("\r\n");
        let status_line = lines.next().unwrap();
        assert!(status_line.starts_with("HTTP/1.1 "), "{status_line}");
        let status = status_line[9..12].parse().unwrap();

        let headers: Vec<(String, String)> = lines
            .map(|line| {
                let (name, value) = line.split_once(':').unwrap();
                (name.trim().to_ascii_lowercase(), value.trim().to_string())
            })
            .collect();

        let length: usize = headers
            .iter()
            .find(|(name, _)| name == "content-length")
            .map(|(_, value)| value.parse().unwrap())
            .expect("content-length header");
        assert!(rest.len() >= length, "body shorter than Content-Length");

        Self {
            status,
            headers,
            body: rest[..length].to_vec(),
            trailing: rest[length..].to_vec(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap()
    }
}

/// Send one request with the well-formed client certificate.
pub async fn request(handle: &ServerHandle, pki: &Pki, raw: &str) -> HttpResponse {
    let raw = exchange(handle.local_addr(), pki.client_config(Some(&pki.client)), raw)
        .await
        .unwrap();
    HttpResponse::parse(&raw)
}
