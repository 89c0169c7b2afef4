//! Cipher-suite identifiers and the symbolic-string translation.
//!
//! The ordered, duplicate-free suite list is the single source of
//! truth; the colon-separated symbolic string is a derived view.
//! Deriving list → string → list reproduces the original list, and a
//! legacy filter token expands against the fixed master list in
//! master-list (priority) order.

use accord_types::ConfigError;

use crate::cert::KeyType;
use crate::TlsVersion;

/// TLS cipher suite identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSuite(pub u16);

impl CipherSuite {
    // TLS 1.3 cipher suites
    pub const TLS_AES_256_GCM_SHA384: Self = Self(0x1302);
    pub const TLS_AES_128_GCM_SHA256: Self = Self(0x1301);
    pub const TLS_CHACHA20_POLY1305_SHA256: Self = Self(0x1303);

    // TLS 1.2 ECDHE suites
    pub const TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384: Self = Self(0xC02C);
    pub const TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384: Self = Self(0xC030);
    pub const TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256: Self = Self(0xC02B);
    pub const TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256: Self = Self(0xC02F);
    pub const TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256: Self = Self(0xCCA9);
    pub const TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256: Self = Self(0xCCA8);

    // Legacy RSA key-transport suites
    pub const TLS_RSA_WITH_AES_256_CBC_SHA: Self = Self(0x0035);
    pub const TLS_RSA_WITH_AES_128_CBC_SHA: Self = Self(0x002F);
}

/// Which certificate key type a suite's authentication requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteAuth {
    /// TLS 1.3 suites: authentication is decoupled from the suite.
    Any,
    /// RSA-authenticated suites.
    Rsa,
    /// ECDSA-family suites (an Ed25519 certificate also satisfies
    /// these in TLS 1.2).
    Ecdsa,
}

impl SuiteAuth {
    /// Whether a certificate of `key_type` can authenticate a suite
    /// with this requirement.
    pub fn accepts(self, key_type: KeyType) -> bool {
        match self {
            SuiteAuth::Any => true,
            SuiteAuth::Rsa => key_type == KeyType::Rsa,
            SuiteAuth::Ecdsa => matches!(key_type, KeyType::Ecdsa | KeyType::Ed25519),
        }
    }
}

/// One master-list entry.
#[derive(Debug, Clone, Copy)]
pub struct SuiteInfo {
    pub suite: CipherSuite,
    pub name: &'static str,
    pub auth: SuiteAuth,
    pub min_version: TlsVersion,
}

/// The fixed, priority-ordered master suite list.
pub const MASTER_LIST: &[SuiteInfo] = &[
    SuiteInfo {
        suite: CipherSuite::TLS_AES_256_GCM_SHA384,
        name: "TLS_AES_256_GCM_SHA384",
        auth: SuiteAuth::Any,
        min_version: TlsVersion::Tls13,
    },
    SuiteInfo {
        suite: CipherSuite::TLS_AES_128_GCM_SHA256,
        name: "TLS_AES_128_GCM_SHA256",
        auth: SuiteAuth::Any,
        min_version: TlsVersion::Tls13,
    },
    SuiteInfo {
        suite: CipherSuite::TLS_CHACHA20_POLY1305_SHA256,
        name: "TLS_CHACHA20_POLY1305_SHA256",
        auth: SuiteAuth::Any,
        min_version: TlsVersion::Tls13,
    },
    SuiteInfo {
        suite: CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
        name: "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
        auth: SuiteAuth::Ecdsa,
        min_version: TlsVersion::Tls12,
    },
    SuiteInfo {
        suite: CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
        name: "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
        auth: SuiteAuth::Rsa,
        min_version: TlsVersion::Tls12,
    },
    SuiteInfo {
        suite: CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
        name: "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
        auth: SuiteAuth::Ecdsa,
        min_version: TlsVersion::Tls12,
    },
    SuiteInfo {
        suite: CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
        name: "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
        auth: SuiteAuth::Rsa,
        min_version: TlsVersion::Tls12,
    },
    SuiteInfo {
        suite: CipherSuite::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
        name: "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256",
        auth: SuiteAuth::Ecdsa,
        min_version: TlsVersion::Tls12,
    },
    SuiteInfo {
        suite: CipherSuite::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
        name: "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256",
        auth: SuiteAuth::Rsa,
        min_version: TlsVersion::Tls12,
    },
    SuiteInfo {
        suite: CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA,
        name: "TLS_RSA_WITH_AES_256_CBC_SHA",
        auth: SuiteAuth::Rsa,
        min_version: TlsVersion::Tls10,
    },
    SuiteInfo {
        suite: CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
        name: "TLS_RSA_WITH_AES_128_CBC_SHA",
        auth: SuiteAuth::Rsa,
        min_version: TlsVersion::Tls10,
    },
];

/// Look up the master-list entry for a suite.
pub fn info(suite: CipherSuite) -> Option<&'static SuiteInfo> {
    MASTER_LIST.iter().find(|i| i.suite == suite)
}

/// Canonical name of a suite, if it is in the master list.
pub fn canonical_name(suite: CipherSuite) -> Option<&'static str> {
    info(suite).map(|i| i.name)
}

/// Whether a legacy filter token selects a master-list entry.
fn matches_filter(entry: &SuiteInfo, token: &str) -> bool {
    match token {
        "ALL" | "DEFAULT" => true,
        "AES128" => entry.name.contains("AES_128"),
        "AES256" => entry.name.contains("AES_256"),
        "CHACHA20" => entry.name.contains("CHACHA20"),
        "ECDSA" => entry.auth == SuiteAuth::Ecdsa,
        "RSA" => entry.auth == SuiteAuth::Rsa,
        _ => false,
    }
}

fn is_filter_token(token: &str) -> bool {
    matches!(
        token,
        "ALL" | "DEFAULT" | "AES128" | "AES256" | "CHACHA20" | "ECDSA" | "RSA"
    )
}

/// Expand a symbolic selection string into an ordered, duplicate-free
/// suite list.
///
/// Each colon-separated token is either a canonical suite name (taken
/// verbatim, preserving token order) or a legacy filter token, which
/// expands to every matching master-list entry in master-list order.
pub fn derive_list(selection: &str) -> Result<Vec<CipherSuite>, ConfigError> {
    let mut out: Vec<CipherSuite> = Vec::new();
    for token in selection.split(':').filter(|t| !t.is_empty()) {
        if let Some(entry) = MASTER_LIST.iter().find(|i| i.name == token) {
            if !out.contains(&entry.suite) {
                out.push(entry.suite);
            }
        } else if is_filter_token(token) {
            for entry in MASTER_LIST.iter().filter(|e| matches_filter(e, token)) {
                if !out.contains(&entry.suite) {
                    out.push(entry.suite);
                }
            }
        } else {
            return Err(ConfigError::UnknownCipherSuite(token.to_string()));
        }
    }
    Ok(out)
}

/// Serialize an explicit suite list to its canonical symbolic string.
pub fn derive_string(suites: &[CipherSuite]) -> Result<String, ConfigError> {
    let mut names = Vec::with_capacity(suites.len());
    for &suite in suites {
        let name = canonical_name(suite)
            .ok_or_else(|| ConfigError::UnknownCipherSuite(format!("{:#06x}", suite.0)))?;
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names.join(":"))
}

/// Drop duplicates from a suite list, keeping first occurrences.
pub fn dedup(suites: &[CipherSuite]) -> Vec<CipherSuite> {
    let mut out = Vec::with_capacity(suites.len());
    for &s in suites {
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_list_names_unique() {
        for (i, a) in MASTER_LIST.iter().enumerate() {
            for b in &MASTER_LIST[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.suite, b.suite);
            }
        }
    }

    #[test]
    fn test_canonical_name_lookup() {
        assert_eq!(
            canonical_name(CipherSuite::TLS_AES_128_GCM_SHA256),
            Some("TLS_AES_128_GCM_SHA256")
        );
        assert_eq!(canonical_name(CipherSuite(0xFFFF)), None);
    }

    #[test]
    fn test_derive_list_canonical_names_preserve_order() {
        let list =
            derive_list("TLS_AES_128_GCM_SHA256:TLS_RSA_WITH_AES_256_CBC_SHA").unwrap();
        assert_eq!(
            list,
            vec![
                CipherSuite::TLS_AES_128_GCM_SHA256,
                CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA,
            ]
        );
    }

    #[test]
    fn test_filter_token_expands_in_master_order() {
        let list = derive_list("AES256").unwrap();
        assert_eq!(
            list,
            vec![
                CipherSuite::TLS_AES_256_GCM_SHA384,
                CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
                CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
                CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA,
            ]
        );
    }

    #[test]
    fn test_filter_all_is_master_list() {
        let list = derive_list("ALL").unwrap();
        let master: Vec<_> = MASTER_LIST.iter().map(|i| i.suite).collect();
        assert_eq!(list, master);
    }

    #[test]
    fn test_unknown_token_rejected() {
        let err = derive_list("TLS_TOTALLY_BOGUS").unwrap_err();
        assert!(format!("{err}").contains("TLS_TOTALLY_BOGUS"));
    }

    #[test]
    fn test_round_trip_list_string_list() {
        let original = vec![
            CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
            CipherSuite::TLS_AES_256_GCM_SHA384,
            CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
        ];
        let s = derive_string(&original).unwrap();
        assert_eq!(
            s,
            "TLS_RSA_WITH_AES_128_CBC_SHA:TLS_AES_256_GCM_SHA384:\
             TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256"
        );
        let derived = derive_list(&s).unwrap();
        assert_eq!(derived, original);
    }

    #[test]
    fn test_round_trip_drops_duplicates() {
        let with_dups = vec![
            CipherSuite::TLS_AES_128_GCM_SHA256,
            CipherSuite::TLS_AES_128_GCM_SHA256,
            CipherSuite::TLS_AES_256_GCM_SHA384,
        ];
        let s = derive_string(&with_dups).unwrap();
        assert_eq!(s, "TLS_AES_128_GCM_SHA256:TLS_AES_256_GCM_SHA384");
        assert_eq!(derive_list(&s).unwrap(), dedup(&with_dups));
    }

    #[test]
    fn test_filter_idempotent_through_round_trip() {
        // Expanding a filter, serializing, and re-deriving must
        // reproduce the same list the filter produced.
        let expanded = derive_list("ECDSA").unwrap();
        let s = derive_string(&expanded).unwrap();
        assert_eq!(derive_list(&s).unwrap(), expanded);
    }

    #[test]
    fn test_mixed_canonical_and_filter_tokens() {
        let list = derive_list("TLS_RSA_WITH_AES_256_CBC_SHA:CHACHA20").unwrap();
        assert_eq!(list[0], CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA);
        assert!(list.contains(&CipherSuite::TLS_CHACHA20_POLY1305_SHA256));
        assert!(list.contains(&CipherSuite::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256));
    }

    #[test]
    fn test_derive_string_unknown_suite() {
        let err = derive_string(&[CipherSuite(0xBEEF)]).unwrap_err();
        assert!(format!("{err}").contains("0xbeef"));
    }

    #[test]
    fn test_suite_auth_accepts() {
        use crate::cert::KeyType;
        assert!(SuiteAuth::Any.accepts(KeyType::Rsa));
        assert!(SuiteAuth::Any.accepts(KeyType::Ed25519));
        assert!(SuiteAuth::Rsa.accepts(KeyType::Rsa));
        assert!(!SuiteAuth::Rsa.accepts(KeyType::Ecdsa));
        assert!(SuiteAuth::Ecdsa.accepts(KeyType::Ecdsa));
        assert!(SuiteAuth::Ecdsa.accepts(KeyType::Ed25519));
        assert!(!SuiteAuth::Ecdsa.accepts(KeyType::Rsa));
    }
}
