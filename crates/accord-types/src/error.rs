use std::path::PathBuf;

/// Configuration errors.
///
/// Raised synchronously while building a session context, before any
/// network activity. These never travel through a connection pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no such filesystem object: {}", path.display())]
    TrustFileNotFound { path: PathBuf },
    #[error("trust file unreadable: {}: {reason}", path.display())]
    TrustFileUnreadable { path: PathBuf, reason: String },
    #[error("private key configured without a certificate chain")]
    KeyWithoutCertificate,
    #[error("certificate chain configured without a private key")]
    CertificateWithoutKey,
    #[error("server configuration requires a certificate chain and private key")]
    MissingServerIdentity,
    #[error("unknown cipher suite: {0}")]
    UnknownCipherSuite(String),
    #[error("invalid application protocol {0:?}: names must be 1..=255 bytes")]
    InvalidApplicationProtocol(String),
    #[error("minimum version {min} exceeds maximum version {max}")]
    InvalidVersionRange { min: String, max: String },
}

/// TLS handshake and post-handshake errors.
///
/// Every failure the negotiator forwards into the pipeline is one of
/// these. The pre/post-completion split follows the alert that caused
/// the failure: pre-completion errors are never preceded by a
/// handshake-completed event, post-completion errors always are.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// The handshake failed before completion. Carries the underlying
    /// protocol alert description.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),
    /// Peer certificate verification failed before completion.
    #[error("certificate verification failed: {0}")]
    CertVerifyFailed(String),
    /// A failure detected only after the transport-level handshake
    /// finished (TLS 1.3 post-handshake confirmation, e.g. a missing
    /// client certificate).
    #[error("post-handshake failure: {0}")]
    PostHandshakeFailed(String),
    /// The transport closed while the handshake was still in progress.
    #[error("transport closed during handshake")]
    UncleanShutdown,
    /// An error that matched no known classification; surfaced
    /// verbatim, never suppressed.
    #[error("unexpected error: {0}")]
    Unexpected(String),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TlsError {
    /// Whether this error is reported after a completed handshake.
    pub fn is_post_handshake(&self) -> bool {
        matches!(self, TlsError::PostHandshakeFailed(_))
    }
}
