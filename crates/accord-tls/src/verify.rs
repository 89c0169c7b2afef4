//! Peer trust and hostname policy.
//!
//! Chain acceptance is structural: the presented chain must reach an
//! anchor in the resolved root union. When the platform store is
//! selected, the record-layer engine owns that portion and reports its
//! verdict via `system_anchored`. Hostname matching follows RFC 6125:
//! SAN dNSName entries take precedence, subject CN is a fallback, and
//! wildcards are restricted to the leftmost label.

use accord_types::TlsError;

use crate::cert::Certificate;
use crate::config::CertificateVerification;
use crate::context::ResolvedTrustRoots;

/// Verify a presented peer chain under the given mode.
///
/// `expected_hostname` is only consulted in `FullVerification` mode.
/// `system_anchored` is the engine's verdict for the platform-store
/// portion of the root union; pass `false` when the engine has not
/// vouched for the chain.
pub fn verify_peer(
    mode: CertificateVerification,
    roots: &ResolvedTrustRoots,
    chain: &[Certificate],
    expected_hostname: Option<&str>,
    system_anchored: bool,
) -> Result<(), TlsError> {
    if mode == CertificateVerification::None {
        return Ok(());
    }
    if chain.is_empty() {
        return Err(TlsError::CertVerifyFailed(
            "empty certificate chain".to_string(),
        ));
    }
    verify_chain(roots, chain, system_anchored)?;
    if mode == CertificateVerification::FullVerification {
        if let Some(hostname) = expected_hostname {
            verify_hostname(&chain[0], hostname)?;
        }
    }
    Ok(())
}

/// Structural chain acceptance against the resolved root union.
pub fn verify_chain(
    roots: &ResolvedTrustRoots,
    chain: &[Certificate],
    system_anchored: bool,
) -> Result<(), TlsError> {
    // A presented certificate that is itself an anchor, or a top-of-
    // chain certificate issued by an anchor, both count.
    let explicit_match = chain.iter().any(|cert| roots.certificates.contains(cert))
        || chain.last().is_some_and(|top| {
            roots
                .certificates
                .iter()
                .any(|anchor| anchor.subject == top.issuer)
        });
    if explicit_match {
        return Ok(());
    }
    if roots.use_system && system_anchored {
        return Ok(());
    }
    Err(TlsError::CertVerifyFailed(format!(
        "certificate chain for '{}' does not reach a configured trust root",
        chain.first().map(|c| c.subject.as_str()).unwrap_or("")
    )))
}

/// Verify that `cert` is valid for `hostname`.
pub fn verify_hostname(cert: &Certificate, hostname: &str) -> Result<(), TlsError> {
    let hostname = hostname.trim();
    if hostname.is_empty() {
        return Err(TlsError::CertVerifyFailed("empty hostname".to_string()));
    }

    if !cert.dns_names.is_empty() {
        // SAN exists — only check SAN, never fall back to CN.
        if cert.dns_names.iter().any(|p| matches_dns(p, hostname)) {
            return Ok(());
        }
        return Err(TlsError::CertVerifyFailed(format!(
            "hostname '{hostname}' does not match any SAN dNSName"
        )));
    }

    if matches_dns(&cert.subject, hostname) {
        return Ok(());
    }
    Err(TlsError::CertVerifyFailed(format!(
        "hostname '{hostname}' does not match certificate subject"
    )))
}

/// Check a certificate DNS name pattern against a hostname.
///
/// Wildcards per RFC 6125 section 6.4.3: `*` only as the entire
/// leftmost label, at least two labels after it, matching exactly one
/// label.
fn matches_dns(pattern: &str, hostname: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let hostname = hostname.to_ascii_lowercase();

    if let Some(suffix) = pattern.strip_prefix("*.") {
        // No partial wildcards; `*.com`-style patterns rejected.
        if suffix.matches('.').count() < 1 {
            return false;
        }
        return match hostname.split_once('.') {
            // Wildcard covers exactly one label and never the bare domain.
            Some((first, rest)) => !first.is_empty() && rest == suffix,
            None => false,
        };
    }
    pattern == hostname
}
