//! Validated session context.
//!
//! `SessionContext::new` is the single validation point between a
//! mutable `TlsConfiguration` and a handshake attempt: it snapshots
//! the configuration, resolves trust-root files from disk, and checks
//! every fail-fast invariant. No network I/O happens here. A context
//! is owned by exactly one handshake attempt.

use std::fs;
use std::path::{Path, PathBuf};

use accord_types::ConfigError;

use crate::cert::{Certificate, CertificateSource, KeyType};
use crate::config::alpn;
use crate::config::{TlsConfiguration, TrustRoots};
use crate::TlsRole;

/// Trust anchors with file-based roots resolved to bytes.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTrustRoots {
    /// Explicitly configured anchor certificates.
    pub certificates: Vec<Certificate>,
    /// Raw bytes of file-based anchors, for the engine to parse.
    pub files: Vec<(PathBuf, Vec<u8>)>,
    /// Whether the platform default store participates.
    pub use_system: bool,
}

/// Read-only projection of a configuration for one handshake attempt.
#[derive(Debug, Clone)]
pub struct SessionContext {
    config: TlsConfiguration,
    roots: ResolvedTrustRoots,
    alpn_wire: Vec<u8>,
}

fn read_trust_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::TrustFileNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => Err(ConfigError::TrustFileUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

fn resolve_roots(
    primary: &TrustRoots,
    additional: &[TrustRoots],
) -> Result<ResolvedTrustRoots, ConfigError> {
    let mut resolved = ResolvedTrustRoots::default();
    for roots in std::iter::once(primary).chain(additional.iter()) {
        match roots {
            TrustRoots::SystemDefault => resolved.use_system = true,
            TrustRoots::Certificates(certs) => {
                resolved.certificates.extend(certs.iter().cloned());
            }
            TrustRoots::File(path) => {
                let bytes = read_trust_file(path)?;
                resolved.files.push((path.clone(), bytes));
            }
        }
    }
    Ok(resolved)
}

fn check_identity(config: &TlsConfiguration) -> Result<(), ConfigError> {
    let has_chain = !config.certificate_chain.is_empty();
    let has_key = config.private_key.is_some();
    match (has_chain, has_key) {
        (true, true) | (false, false) => {
            if config.role == TlsRole::Server && !has_chain {
                Err(ConfigError::MissingServerIdentity)
            } else {
                Ok(())
            }
        }
        (true, false) => Err(ConfigError::CertificateWithoutKey),
        (false, true) => Err(ConfigError::KeyWithoutCertificate),
    }
}

impl SessionContext {
    /// Validate `config` and build the context for one attempt.
    pub fn new(config: &TlsConfiguration) -> Result<Self, ConfigError> {
        if config.minimum_version > config.maximum_version {
            return Err(ConfigError::InvalidVersionRange {
                min: config.minimum_version.to_string(),
                max: config.maximum_version.to_string(),
            });
        }
        for name in &config.application_protocols {
            alpn::validate_protocol(name)?;
        }
        check_identity(config)?;
        let roots = resolve_roots(&config.trust_roots, &config.additional_trust_roots)?;
        let alpn_wire = config.encoded_application_protocols()?;
        Ok(Self {
            config: config.clone(),
            roots,
            alpn_wire,
        })
    }

    /// The immutable configuration snapshot.
    pub fn config(&self) -> &TlsConfiguration {
        &self.config
    }

    /// The resolved trust-anchor union (trustRoots ∪ additionalTrustRoots).
    pub fn trust_roots(&self) -> &ResolvedTrustRoots {
        &self.roots
    }

    /// ALPN wire encoding of the configured protocols.
    pub fn alpn_wire(&self) -> &[u8] {
        &self.alpn_wire
    }

    pub fn role(&self) -> TlsRole {
        self.config.role
    }

    /// The leaf certificate of this endpoint's chain, when it was
    /// configured as an in-memory object. File-based chains are opaque
    /// to this layer and parsed by the engine.
    pub fn leaf_certificate(&self) -> Option<&Certificate> {
        match self.config.certificate_chain.first() {
            Some(CertificateSource::Certificate(cert)) => Some(cert),
            _ => None,
        }
    }

    /// Key type of the configured leaf, when known at this layer.
    pub fn leaf_key_type(&self) -> Option<KeyType> {
        self.leaf_certificate().map(|c| c.key_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::testutil::self_signed;
    use crate::cert::{PrivateKey, PrivateKeySource};
    use crate::TlsVersion;

    fn server_config() -> TlsConfiguration {
        let cert = self_signed("server.example.com", KeyType::Rsa);
        TlsConfiguration::server(
            vec![CertificateSource::Certificate(cert)],
            PrivateKeySource::Key(PrivateKey::new(KeyType::Rsa, vec![7; 32])),
        )
    }

    fn unique_temp_path(stem: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("accord-{stem}-{nanos}.pem"))
    }

    #[test]
    fn test_client_context_defaults() {
        let ctx = SessionContext::new(&TlsConfiguration::client()).unwrap();
        assert_eq!(ctx.role(), TlsRole::Client);
        assert!(ctx.trust_roots().use_system);
        assert!(ctx.trust_roots().certificates.is_empty());
        assert!(ctx.alpn_wire().is_empty());
        assert!(ctx.leaf_certificate().is_none());
    }

    #[test]
    fn test_invalid_version_range_rejected() {
        let mut config = TlsConfiguration::client();
        config.minimum_version = TlsVersion::Tls13;
        config.maximum_version = TlsVersion::Tls12;
        let err = SessionContext::new(&config).unwrap_err();
        assert!(format!("{err}").contains("TLSv1.3"));
    }

    #[test]
    fn test_missing_trust_file() {
        let mut config = TlsConfiguration::client();
        config.trust_roots = TrustRoots::File(PathBuf::from("/definitely/not/here/ca.pem"));
        let err = SessionContext::new(&config).unwrap_err();
        assert!(matches!(err, ConfigError::TrustFileNotFound { .. }));
        assert!(format!("{err}").contains("no such filesystem object"));
    }

    #[test]
    fn test_trust_file_resolved_to_bytes() {
        let path = unique_temp_path("roots");
        fs::write(&path, b"-----BEGIN CERTIFICATE-----").unwrap();
        let mut config = TlsConfiguration::client();
        config.trust_roots = TrustRoots::File(path.clone());
        let ctx = SessionContext::new(&config).unwrap();
        assert_eq!(ctx.trust_roots().files.len(), 1);
        assert_eq!(ctx.trust_roots().files[0].0, path);
        assert!(!ctx.trust_roots().use_system);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_additional_roots_unioned() {
        let anchor = self_signed("Extra CA", KeyType::Ecdsa);
        let mut config = TlsConfiguration::client();
        config.additional_trust_roots = vec![TrustRoots::Certificates(vec![anchor.clone()])];
        let ctx = SessionContext::new(&config).unwrap();
        // System default from trust_roots plus the explicit extra.
        assert!(ctx.trust_roots().use_system);
        assert_eq!(ctx.trust_roots().certificates, vec![anchor]);
    }

    #[test]
    fn test_key_without_certificate_rejected() {
        let mut config = TlsConfiguration::client();
        config.private_key = Some(PrivateKeySource::Key(PrivateKey::new(
            KeyType::Rsa,
            vec![1; 16],
        )));
        let err = SessionContext::new(&config).unwrap_err();
        assert!(matches!(err, ConfigError::KeyWithoutCertificate));
    }

    #[test]
    fn test_certificate_without_key_rejected() {
        let mut config = server_config();
        config.private_key = None;
        let err = SessionContext::new(&config).unwrap_err();
        assert!(matches!(err, ConfigError::CertificateWithoutKey));
    }

    #[test]
    fn test_server_without_identity_rejected() {
        let mut config = server_config();
        config.certificate_chain.clear();
        config.private_key = None;
        let err = SessionContext::new(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingServerIdentity));
    }

    #[test]
    fn test_server_context_exposes_leaf() {
        let ctx = SessionContext::new(&server_config()).unwrap();
        assert_eq!(ctx.leaf_key_type(), Some(KeyType::Rsa));
        assert_eq!(
            ctx.leaf_certificate().unwrap().subject,
            "server.example.com"
        );
    }

    #[test]
    fn test_alpn_wire_precomputed() {
        let mut config = TlsConfiguration::client();
        config.add_application_protocol("h2").unwrap();
        config.add_application_protocol("http/1.1").unwrap();
        let ctx = SessionContext::new(&config).unwrap();
        assert_eq!(ctx.alpn_wire()[0], 2);
        assert_eq!(&ctx.alpn_wire()[1..3], b"h2");
    }

    #[test]
    fn test_context_is_snapshot() {
        let mut config = TlsConfiguration::client();
        let ctx = SessionContext::new(&config).unwrap();
        config.add_application_protocol("h2").unwrap();
        // Later mutation of the configuration never reaches the context.
        assert!(ctx.config().application_protocols.is_empty());
    }
}
