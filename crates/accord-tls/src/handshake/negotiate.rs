//! Pure negotiation rules over two session contexts.
//!
//! Checks run in wire order: version range, cipher overlap, signature
//! algorithms, ALPN, peer trust, mutual authentication. The first
//! failing check wins and carries the alert the engine should send.
//! The one rule that cannot fail here is the TLS 1.3 mutual-auth case:
//! post-handshake confirmation means the handshake itself completes,
//! so a missing client certificate is returned as a deferred failure
//! for the negotiator to report after the completion event.

use accord_types::TlsError;

use crate::alert::{Alert, AlertDescription};
use crate::cert::{Certificate, CertificateSource, KeyType};
use crate::config::suites::{self, CipherSuite};
use crate::context::SessionContext;
use crate::pipeline::NegotiatedParameters;
use crate::{SignatureAlgorithm, TlsVersion};

/// The protocol version that moved client authentication after the
/// transport-level handshake (post-handshake confirmation).
pub const POST_HANDSHAKE_AUTH_VERSION: TlsVersion = TlsVersion::Tls13;

/// What the record-layer engine reports about the chains it parsed.
///
/// Policy checks explicit trust roots structurally; the platform
/// store belongs to the engine, which vouches for a chain here. The
/// default verdict vouches for nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineVerdict {
    /// The server's chain reaches a platform-store anchor.
    pub server_chain_system_anchored: bool,
    /// The client's chain reaches a platform-store anchor.
    pub client_chain_system_anchored: bool,
}

/// A classified pre-completion failure: the alert to send and the
/// error to forward upstream.
#[derive(Debug)]
pub struct NegotiationFailure {
    pub alert: AlertDescription,
    pub error: TlsError,
}

impl NegotiationFailure {
    fn alert_only(alert: AlertDescription) -> Self {
        Self {
            alert,
            error: TlsError::HandshakeFailed(alert.to_string()),
        }
    }

    fn verification(alert: AlertDescription, error: TlsError) -> Self {
        Self { alert, error }
    }

    /// The fatal alert the engine should send for this failure.
    pub fn to_alert(&self) -> Alert {
        Alert::fatal(self.alert)
    }
}

/// A successful negotiation, possibly carrying a failure that only
/// surfaces after the completion event.
#[derive(Debug)]
pub struct NegotiationResult {
    pub parameters: NegotiatedParameters,
    /// Set when post-handshake confirmation will reject the attempt
    /// (TLS 1.3 missing client certificate). The handshake completes
    /// first; the negotiator reports this afterwards.
    pub deferred_failure: Option<AlertDescription>,
}

fn version_overlap(
    client: &SessionContext,
    server: &SessionContext,
) -> Result<TlsVersion, NegotiationFailure> {
    let low = client
        .config()
        .minimum_version
        .max(server.config().minimum_version);
    let high = client
        .config()
        .maximum_version
        .min(server.config().maximum_version);
    if low > high {
        return Err(NegotiationFailure::alert_only(
            AlertDescription::ProtocolVersion,
        ));
    }
    Ok(high)
}

/// Whether a suite is usable at the negotiated version.
fn usable_at(suite: CipherSuite, version: TlsVersion) -> bool {
    match suites::info(suite) {
        Some(info) if info.min_version == TlsVersion::Tls13 => version >= TlsVersion::Tls13,
        Some(info) => version >= info.min_version && version < TlsVersion::Tls13,
        None => false,
    }
}

/// Whether a suite's authentication is satisfiable by both presented
/// certificate key types (unknown types leave it unconstrained).
fn auth_satisfiable(
    suite: CipherSuite,
    server_key: Option<KeyType>,
    client_key: Option<KeyType>,
) -> bool {
    let Some(info) = suites::info(suite) else {
        return false;
    };
    let fits = |key: Option<KeyType>| key.map_or(true, |k| info.auth.accepts(k));
    fits(server_key) && fits(client_key)
}

fn cipher_overlap(
    client: &SessionContext,
    server: &SessionContext,
    version: TlsVersion,
) -> Result<CipherSuite, NegotiationFailure> {
    let server_key = server.leaf_key_type();
    let client_key = client.leaf_key_type();
    // Server preference order, like a server picking from the offer.
    server
        .config()
        .cipher_suites()
        .iter()
        .copied()
        .find(|&suite| {
            client.config().cipher_suites().contains(&suite)
                && usable_at(suite, version)
                && auth_satisfiable(suite, server_key, client_key)
        })
        .ok_or_else(|| NegotiationFailure::alert_only(AlertDescription::HandshakeFailure))
}

/// `None` algorithm lists mean engine defaults, which overlap with
/// anything.
fn algorithms_overlap(
    signing: &Option<Vec<SignatureAlgorithm>>,
    verifying: &Option<Vec<SignatureAlgorithm>>,
) -> bool {
    match (signing, verifying) {
        (Some(sign), Some(verify)) => sign.iter().any(|alg| verify.contains(alg)),
        _ => true,
    }
}

fn signature_overlap(
    client: &SessionContext,
    server: &SessionContext,
) -> Result<(), NegotiationFailure> {
    // Server signs, client verifies.
    if !algorithms_overlap(
        &server.config().signing_signature_algorithms,
        &client.config().verify_signature_algorithms,
    ) {
        return Err(NegotiationFailure::alert_only(
            AlertDescription::HandshakeFailure,
        ));
    }
    // Client signs (mutual auth), server verifies.
    if !client.config().certificate_chain.is_empty()
        && !algorithms_overlap(
            &client.config().signing_signature_algorithms,
            &server.config().verify_signature_algorithms,
        )
    {
        return Err(NegotiationFailure::alert_only(
            AlertDescription::HandshakeFailure,
        ));
    }
    Ok(())
}

fn alpn_selection(
    client: &SessionContext,
    server: &SessionContext,
) -> Result<Option<String>, NegotiationFailure> {
    let offered = &client.config().application_protocols;
    let supported = &server.config().application_protocols;
    if offered.is_empty() || supported.is_empty() {
        return Ok(None);
    }
    supported
        .iter()
        .find(|p| offered.contains(p))
        .cloned()
        .map(Some)
        .ok_or_else(|| NegotiationFailure::alert_only(AlertDescription::NoApplicationProtocol))
}

/// The in-memory certificates of a configured chain. File-based
/// entries are parsed by the engine and invisible to policy.
fn structural_chain(ctx: &SessionContext) -> Vec<Certificate> {
    ctx.config()
        .certificate_chain
        .iter()
        .filter_map(|source| match source {
            CertificateSource::Certificate(cert) => Some(cert.clone()),
            CertificateSource::File(_) => None,
        })
        .collect()
}

fn verify_presented_chain(
    verifier: &SessionContext,
    presenter: &SessionContext,
    expected_hostname: Option<&str>,
    system_anchored: bool,
) -> Result<(), NegotiationFailure> {
    use crate::config::CertificateVerification;
    let mode = verifier.config().certificate_verification;
    if mode == CertificateVerification::None {
        return Ok(());
    }
    let chain = structural_chain(presenter);
    if chain.is_empty() && !presenter.config().certificate_chain.is_empty() {
        // File-based identity: the engine parses and verifies it.
        return Ok(());
    }
    crate::verify::verify_peer(
        mode,
        verifier.trust_roots(),
        &chain,
        expected_hostname,
        system_anchored,
    )
    .map_err(|error| NegotiationFailure::verification(AlertDescription::BadCertificate, error))
}

/// Decide the outcome of a handshake between two configurations.
///
/// `server_name` is the SNI value the client sends; it selects a
/// replacement server configuration through the server's SNI callback
/// and is the identity the client checks the server certificate
/// against. `engine` carries the platform-store verdicts; it only
/// matters for a side whose trust roots include the system default
/// set.
pub fn negotiate(
    client: &SessionContext,
    server: &SessionContext,
    server_name: Option<&str>,
    engine: EngineVerdict,
) -> Result<NegotiationResult, NegotiationFailure> {
    // SNI may swap in a per-name server configuration first.
    let reselected = match (server_name, &server.config().sni_callback) {
        (Some(name), Some(callback)) => match callback.select(name) {
            Some(replacement) => Some(SessionContext::new(&replacement).map_err(|e| {
                NegotiationFailure {
                    alert: AlertDescription::InternalError,
                    error: TlsError::Unexpected(e.to_string()),
                }
            })?),
            None => None,
        },
        _ => None,
    };
    let server = reselected.as_ref().unwrap_or(server);

    let version = version_overlap(client, server)?;
    let cipher_suite = cipher_overlap(client, server, version)?;
    signature_overlap(client, server)?;
    let alpn_protocol = alpn_selection(client, server)?;

    // Client verifies the server's identity.
    verify_presented_chain(
        client,
        server,
        server_name,
        engine.server_chain_system_anchored,
    )?;

    // Mutual authentication.
    let mut deferred_failure = None;
    if server.config().requires_client_certificate() {
        if client.config().certificate_chain.is_empty() {
            if version >= POST_HANDSHAKE_AUTH_VERSION {
                // Post-handshake confirmation: complete first, fail after.
                deferred_failure = Some(AlertDescription::CertificateRequired);
            } else {
                return Err(NegotiationFailure::alert_only(
                    AlertDescription::HandshakeFailure,
                ));
            }
        } else {
            // Server verifies the presented client certificate.
            verify_presented_chain(server, client, None, engine.client_chain_system_anchored)?;
        }
    }

    Ok(NegotiationResult {
        parameters: NegotiatedParameters {
            version,
            cipher_suite,
            alpn_protocol,
        },
        deferred_failure,
    })
}
