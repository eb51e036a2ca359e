//! Peer certificate inspection.
//!
//! The handshake has already verified the client chain by the time anything
//! here runs. What remains is pulling the subject out of the leaf certificate
//! and deciding whether it is usable.

use std::fmt;
use std::net::SocketAddr;

use rustls::ServerConnection;
use x509_parser::asn1_rs::Tag;
use x509_parser::objects::{oid2abbrev, oid_registry};
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::net::connection::ConnectionId;

/// Distinguished name of a peer, as ordered `(attribute, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject(Vec<(String, String)>);

impl Subject {
    pub fn new(attributes: Vec<(String, String)>) -> Self {
        Self(attributes)
    }

    /// Parse the subject of a DER encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, PeerCertError> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| PeerCertError::Parse(e.to_string()))?;

        let registry = oid_registry();
        let mut attributes = Vec::new();
        for attr in cert.subject().iter_attributes() {
            let oid = attr.attr_type();
            let name = oid2abbrev(oid, registry)
                .map(str::to_string)
                .unwrap_or_else(|_| oid.to_id_string());
            let value = match attr.as_str() {
                Ok(value) => value.to_string(),
                Err(_) => decode_string(attr.attr_value().tag(), attr.as_slice()),
            };
            attributes.push((name, value));
        }
        Ok(Self(attributes))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First value recorded for an attribute, e.g. `get("CN")`.
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, value)| value.as_str())
    }
}

/// Decode the string types `as_str` leaves out. Never fails: unknown
/// encodings are rendered lossily rather than dropping the attribute.
fn decode_string(tag: Tag, data: &[u8]) -> String {
    match tag {
        Tag::BmpString => {
            let units = data
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        Tag::UniversalString => data
            .chunks_exact(4)
            .map(|quad| {
                char::from_u32(u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]))
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
            })
            .collect(),
        // T.61 is read as Latin-1.
        Tag::TeletexString => data.iter().map(|&b| char::from(b)).collect(),
        _ => String::from_utf8_lossy(data).into_owned(),
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

/// Failure to read the negotiated peer certificate.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PeerCertError {
    #[error("malformed peer certificate: {0}")]
    Parse(String),
}

/// A TLS session that can report who is on the other end.
///
/// `Ok(None)` means no certificate was presented at all.
pub trait PeerIdentity {
    fn peer_subject(&self) -> Result<Option<Subject>, PeerCertError>;
}

impl PeerIdentity for ServerConnection {
    fn peer_subject(&self) -> Result<Option<Subject>, PeerCertError> {
        match self.peer_certificates().and_then(|chain| chain.first()) {
            Some(leaf) => Subject::from_der(leaf.as_ref()).map(Some),
            None => Ok(None),
        }
    }
}

/// What the handshake left us with, captured once per connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerCertificate {
    Unreadable(PeerCertError),
    Missing,
    Present(Subject),
}

impl PeerCertificate {
    pub fn inspect<P: PeerIdentity + ?Sized>(session: &P) -> Self {
        match session.peer_subject() {
            Ok(Some(subject)) => Self::Present(subject),
            Ok(None) => Self::Missing,
            Err(e) => Self::Unreadable(e),
        }
    }
}

/// Why a verified connection is still refused. The messages go to the client.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Invalid client certificate")]
    Unreadable,

    #[error("No client certificate provided")]
    Missing,

    #[error("Invalid client certificate: No subject")]
    NoSubject,
}

/// Per-connection state handed to the request handler.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub id: ConnectionId,
    pub remote_addr: SocketAddr,
    pub peer: PeerCertificate,
}

impl ConnectionContext {
    pub fn new<P: PeerIdentity + ?Sized>(
        id: ConnectionId,
        remote_addr: SocketAddr,
        session: &P,
    ) -> Self {
        Self {
            id,
            remote_addr,
            peer: PeerCertificate::inspect(session),
        }
    }

    /// The peer subject, or the reason it cannot be accepted.
    pub fn authorize(&self) -> Result<&Subject, Rejection> {
        match &self.peer {
            PeerCertificate::Unreadable(_) => Err(Rejection::Unreadable),
            PeerCertificate::Missing => Err(Rejection::Missing),
            PeerCertificate::Present(subject) if subject.is_empty() => Err(Rejection::NoSubject),
            PeerCertificate::Present(subject) => Ok(subject),
        }
    }
}
