//! Endpoint identity material.
//!
//! Certificates arrive here already parsed by the record-layer engine;
//! this layer only needs the fields that negotiation policy reads
//! (names for trust/hostname checks, the key type for cipher-suite
//! filtering) plus the raw DER for structural comparison.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use zeroize::Zeroize;

/// The public-key algorithm of a certificate, as negotiation sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Rsa,
    Ecdsa,
    Ed25519,
}

/// A parsed certificate as presented by the record-layer engine.
///
/// Equality and hashing are over the DER bytes: two `Certificate`
/// values are the same certificate iff their encodings match.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// Subject common name.
    pub subject: String,
    /// Issuer common name.
    pub issuer: String,
    /// SAN dNSName entries. When non-empty these take precedence over
    /// the subject CN for hostname verification.
    pub dns_names: Vec<String>,
    /// Public-key algorithm of the certified key.
    pub key_type: KeyType,
    /// Raw DER encoding.
    pub der: Vec<u8>,
}

impl Certificate {
    /// Whether the certificate is self-signed (subject equals issuer).
    pub fn is_self_signed(&self) -> bool {
        self.subject == self.issuer
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl Hash for Certificate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.der.hash(state);
    }
}

/// Where a certificate comes from: an in-memory object or a file path
/// resolved at session-context creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CertificateSource {
    Certificate(Certificate),
    File(PathBuf),
}

/// Private key material. Zeroized on drop.
#[derive(Clone)]
pub struct PrivateKey {
    pub key_type: KeyType,
    bytes: Vec<u8>,
}

impl PrivateKey {
    pub fn new(key_type: KeyType, bytes: Vec<u8>) -> Self {
        Self { key_type, bytes }
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("key_type", &self.key_type)
            .field("bytes", &format!("[{} bytes]", self.bytes.len()))
            .finish()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.key_type == other.key_type && self.bytes == other.bytes
    }
}

impl Eq for PrivateKey {}

impl Hash for PrivateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_type.hash(state);
        self.bytes.hash(state);
    }
}

/// Where a private key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrivateKeySource {
    Key(PrivateKey),
    File(PathBuf),
}


#[cfg(test)]
mod tests {
    use super::testutil::self_signed;
    use super::*;

    #[test]
    fn test_certificate_equality_is_der_equality() {
        let a = self_signed("example.com", KeyType::Rsa);
        let b = self_signed("example.com", KeyType::Rsa);
        let c = self_signed("other.com", KeyType::Rsa);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_self_signed_detection() {
        let root = self_signed("Root CA", KeyType::Ecdsa);
        assert!(root.is_self_signed());
        let leaf = testutil::issued("leaf.example.com", &root, KeyType::Ecdsa);
        assert!(!leaf.is_self_signed());
    }

    #[test]
    fn test_private_key_debug_redacts_bytes() {
        let key = PrivateKey::new(KeyType::Ed25519, vec![0x42; 32]);
        let dbg = format!("{key:?}");
        assert!(dbg.contains("[32 bytes]"));
        assert!(!dbg.contains("66")); // 0x42 never printed
    }

    #[test]
    fn test_private_key_equality() {
        let a = PrivateKey::new(KeyType::Rsa, vec![1, 2, 3]);
        let b = PrivateKey::new(KeyType::Rsa, vec![1, 2, 3]);
        let c = PrivateKey::new(KeyType::Rsa, vec![1, 2, 4]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
