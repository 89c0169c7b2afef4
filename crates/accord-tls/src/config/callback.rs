//! Identity-tagged callback wrappers.
//!
//! Function values have no value equality, but configurations carrying
//! them must still support best-effort equality and hashing. Each
//! wrapper is minted with a process-unique token at construction;
//! clones share the token, fresh constructions never do. Equality and
//! hashing use only the token, so "same assignment ⇒ equal, distinct
//! assignment ⇒ unequal" holds even for textually identical closures.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::TlsConfiguration;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

fn mint_token() -> u64 {
    NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
}

/// Sink for NSS-format key log lines.
pub type KeyLogFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Server-name lookup: may return a replacement server configuration
/// for the offered name.
pub type SniFn = Arc<dyn Fn(&str) -> Option<Arc<TlsConfiguration>> + Send + Sync>;

/// A key-log callback with a synthetic identity.
#[derive(Clone)]
pub struct KeyLogCallback {
    f: KeyLogFn,
    token: u64,
}

impl KeyLogCallback {
    pub fn new(f: KeyLogFn) -> Self {
        Self {
            f,
            token: mint_token(),
        }
    }

    /// The identity token assigned at construction.
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn call(&self, line: &str) {
        (self.f)(line)
    }

    pub(crate) fn sink(&self) -> KeyLogFn {
        Arc::clone(&self.f)
    }
}

impl fmt::Debug for KeyLogCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyLogCallback(#{})", self.token)
    }
}

impl PartialEq for KeyLogCallback {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for KeyLogCallback {}

impl Hash for KeyLogCallback {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

/// An SNI configuration-selection callback with a synthetic identity.
#[derive(Clone)]
pub struct SniCallback {
    f: SniFn,
    token: u64,
}

impl SniCallback {
    pub fn new(f: SniFn) -> Self {
        Self {
            f,
            token: mint_token(),
        }
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    /// Look up a replacement configuration for an offered server name.
    pub fn select(&self, server_name: &str) -> Option<Arc<TlsConfiguration>> {
        (self.f)(server_name)
    }
}

impl fmt::Debug for SniCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SniCallback(#{})", self.token)
    }
}

impl PartialEq for SniCallback {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for SniCallback {}

impl Hash for SniCallback {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}
