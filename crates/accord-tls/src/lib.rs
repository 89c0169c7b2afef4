#![forbid(unsafe_code)]
#![doc = "TLS negotiation and policy layer for accord."]

pub mod alert;
pub mod cert;
pub mod config;
pub mod context;
pub mod handshake;
pub mod keylog;
pub mod pipeline;
pub mod verify;

pub use accord_types::{ConfigError, TlsError};

pub use config::suites::CipherSuite;
pub use config::{CertificateVerification, TlsConfiguration, TrustRoots};
pub use context::SessionContext;
pub use handshake::negotiate::EngineVerdict;
pub use handshake::{HandshakeNegotiator, HandshakeOutcome};
pub use keylog::KeyLogDispatcher;
pub use pipeline::{NegotiatedParameters, Pipeline, TlsEvent};

use std::fmt;

/// TLS protocol version, ordered oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TlsVersion {
    Tls10,
    Tls11,
    Tls12,
    Tls13,
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TlsVersion::Tls10 => "TLSv1.0",
            TlsVersion::Tls11 => "TLSv1.1",
            TlsVersion::Tls12 => "TLSv1.2",
            TlsVersion::Tls13 => "TLSv1.3",
        };
        f.write_str(s)
    }
}

/// The role of a TLS endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TlsRole {
    Client,
    Server,
}

/// TLS signature scheme identifier (RFC 8446 section 4.2.3 code points).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureAlgorithm(pub u16);

impl SignatureAlgorithm {
    pub const RSA_PKCS1_SHA256: Self = Self(0x0401);
    pub const RSA_PKCS1_SHA384: Self = Self(0x0501);
    pub const RSA_PSS_RSAE_SHA256: Self = Self(0x0804);
    pub const RSA_PSS_RSAE_SHA384: Self = Self(0x0805);
    pub const ECDSA_SECP256R1_SHA256: Self = Self(0x0403);
    pub const ECDSA_SECP384R1_SHA384: Self = Self(0x0503);
    pub const ED25519: Self = Self(0x0807);
}
