//! TLS endpoint configuration.
//!
//! A `TlsConfiguration` is a value type: cloning produces an
//! independent copy, and a session context takes an immutable snapshot
//! at creation. Equality and hashing are best-effort — structural over
//! every comparable field, identity-token based for the opaque
//! callback fields (see `callback`).

pub mod alpn;
pub mod callback;
pub mod suites;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use accord_types::ConfigError;

use crate::cert::{Certificate, CertificateSource, PrivateKeySource};
use crate::{SignatureAlgorithm, TlsRole, TlsVersion};
use callback::{KeyLogCallback, SniCallback};
use suites::CipherSuite;

/// How thoroughly the peer's certificate is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateVerification {
    /// No verification at all.
    None,
    /// Chain verification only; the presented identity is not matched
    /// against the expected hostname.
    NoHostnameVerification,
    /// Chain verification plus hostname matching.
    FullVerification,
}

/// Where trust anchors come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrustRoots {
    /// The platform's default trust store, resolved by the engine.
    SystemDefault,
    /// An explicit set of anchor certificates.
    Certificates(Vec<Certificate>),
    /// A file of anchors, resolved at session-context creation.
    /// Compared by path, not content.
    File(PathBuf),
}

/// Renegotiation policy (TLS ≤ 1.2 only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenegotiationSupport {
    None,
    Once,
    Always,
}

pub(crate) const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// TLS configuration for one endpoint role.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TlsConfiguration {
    /// The role this configuration is built for.
    pub role: TlsRole,
    /// Minimum supported TLS version.
    pub minimum_version: TlsVersion,
    /// Maximum supported TLS version.
    pub maximum_version: TlsVersion,
    /// Enabled cipher suites in preference order. Single source of
    /// truth for the suite selection; the symbolic string is derived.
    cipher_suites: Vec<CipherSuite>,
    /// Peer certificate verification mode.
    pub certificate_verification: CertificateVerification,
    /// Primary trust anchors.
    pub trust_roots: TrustRoots,
    /// Additional anchors, unioned with `trust_roots` at verification.
    pub additional_trust_roots: Vec<TrustRoots>,
    /// This endpoint's certificate chain, leaf first.
    pub certificate_chain: Vec<CertificateSource>,
    /// Private key matching the chain's leaf.
    pub private_key: Option<PrivateKeySource>,
    /// ALPN candidates in preference order.
    pub application_protocols: Vec<String>,
    /// Signature algorithms accepted when verifying peer signatures.
    /// `None` means engine defaults.
    pub verify_signature_algorithms: Option<Vec<SignatureAlgorithm>>,
    /// Signature algorithms used when signing locally.
    pub signing_signature_algorithms: Option<Vec<SignatureAlgorithm>>,
    /// Renegotiation policy.
    pub renegotiation_support: RenegotiationSupport,
    /// Bound on graceful-close waiting. Never bounds the handshake.
    pub shutdown_timeout: Duration,
    /// Key-material logging sink. Identity-compared.
    pub key_log_callback: Option<KeyLogCallback>,
    /// Server-name configuration selection. Identity-compared.
    pub sni_callback: Option<SniCallback>,
}

impl TlsConfiguration {
    /// A client configuration with safe defaults: full certificate
    /// verification against the system trust store, no identity.
    pub fn client() -> Self {
        Self {
            role: TlsRole::Client,
            minimum_version: TlsVersion::Tls12,
            maximum_version: TlsVersion::Tls13,
            cipher_suites: suites::derive_list("DEFAULT").unwrap_or_default(),
            certificate_verification: CertificateVerification::FullVerification,
            trust_roots: TrustRoots::SystemDefault,
            additional_trust_roots: Vec::new(),
            certificate_chain: Vec::new(),
            private_key: None,
            application_protocols: Vec::new(),
            verify_signature_algorithms: None,
            signing_signature_algorithms: None,
            renegotiation_support: RenegotiationSupport::None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            key_log_callback: None,
            sni_callback: None,
        }
    }

    /// A server configuration holding the endpoint's identity.
    ///
    /// Servers do not verify client certificates by default. The
    /// chain/key pairing is checked at session-context creation, not
    /// here.
    pub fn server(
        certificate_chain: Vec<CertificateSource>,
        private_key: PrivateKeySource,
    ) -> Self {
        Self {
            role: TlsRole::Server,
            certificate_verification: CertificateVerification::None,
            certificate_chain,
            private_key: Some(private_key),
            ..Self::client()
        }
    }

    /// The effective ordered, duplicate-free suite list.
    pub fn cipher_suites(&self) -> &[CipherSuite] {
        &self.cipher_suites
    }

    /// Replace the suite selection with an explicit list.
    ///
    /// Unknown identifiers are rejected; duplicates are dropped,
    /// keeping first occurrences.
    pub fn set_cipher_suites(&mut self, list: &[CipherSuite]) -> Result<(), ConfigError> {
        for &suite in list {
            if suites::info(suite).is_none() {
                return Err(ConfigError::UnknownCipherSuite(format!("{:#06x}", suite.0)));
            }
        }
        self.cipher_suites = suites::dedup(list);
        Ok(())
    }

    /// Replace the suite selection from a symbolic string (canonical
    /// names and/or legacy filter tokens, colon-separated).
    pub fn set_cipher_suite_string(&mut self, selection: &str) -> Result<(), ConfigError> {
        self.cipher_suites = suites::derive_list(selection)?;
        Ok(())
    }

    /// The symbolic string derived from the current suite list.
    pub fn cipher_suite_string(&self) -> String {
        // The list only ever holds master-list suites, so derivation
        // cannot fail.
        suites::derive_string(&self.cipher_suites).unwrap_or_default()
    }

    /// Append an ALPN candidate, keeping preference order.
    pub fn add_application_protocol(&mut self, name: &str) -> Result<(), ConfigError> {
        alpn::validate_protocol(name)?;
        self.application_protocols.push(name.to_string());
        Ok(())
    }

    /// The ALPN wire encoding of the configured protocols.
    pub fn encoded_application_protocols(&self) -> Result<Vec<u8>, ConfigError> {
        alpn::encode(&self.application_protocols)
    }

    /// Whether this server configuration demands a client certificate.
    ///
    /// A server with any verification mode other than `None` requests
    /// one and treats its absence as a mutual-authentication failure.
    pub fn requires_client_certificate(&self) -> bool {
        self.role == TlsRole::Server
            && self.certificate_verification != CertificateVerification::None
    }
}

impl fmt::Debug for TlsConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfiguration")
            .field("role", &self.role)
            .field("minimum_version", &self.minimum_version)
            .field("maximum_version", &self.maximum_version)
            .field("cipher_suites", &self.cipher_suite_string())
            .field("certificate_verification", &self.certificate_verification)
            .field("application_protocols", &self.application_protocols)
            .field("key_log_callback", &self.key_log_callback)
            .field("sni_callback", &self.sni_callback)
            .finish_non_exhaustive()
    }
}
