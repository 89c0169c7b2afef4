//! Event and error surface toward the connection pipeline.
//!
//! The negotiator owns the ordering guarantees (completion at most
//! once, never both a completion and a pre-completion failure); this
//! module only defines the channel they travel through.

use std::time::Duration;

use accord_types::TlsError;

use crate::config::suites::CipherSuite;
use crate::TlsVersion;

/// Parameters settled by a completed handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedParameters {
    pub version: TlsVersion,
    pub cipher_suite: CipherSuite,
    /// ALPN protocol selected, when both sides offered one in common.
    pub alpn_protocol: Option<String>,
}

/// Events the negotiator delivers downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsEvent {
    /// The transport-level handshake completed. Fired at most once per
    /// attempt, always before any application data.
    HandshakeCompleted(NegotiatedParameters),
}

/// The downstream half of a connection pipeline, as the negotiator
/// sees it. Errors travel through the same channel as every other
/// inbound error of the pipeline.
pub trait Pipeline {
    fn fire_event(&mut self, event: TlsEvent);
    fn fire_error(&mut self, error: TlsError);
    /// Request transport closure after a terminal outcome. The
    /// graceful close-notify exchange waits at most `graceful_wait`
    /// before the transport is torn down.
    fn schedule_close(&mut self, graceful_wait: Duration);
}

/// A pipeline that records everything it receives. Used by tests and
/// diagnostics harnesses.
#[derive(Debug, Default)]
pub struct RecordingPipeline {
    pub events: Vec<TlsEvent>,
    pub errors: Vec<TlsError>,
    pub close_scheduled: bool,
    /// The graceful-close bound passed with the scheduled closure.
    pub close_wait: Option<Duration>,
    /// Interleaved delivery order, for ordering assertions.
    pub sequence: Vec<Delivery>,
}

/// What arrived, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Event,
    Error,
}

impl RecordingPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a handshake-completed event was delivered.
    pub fn completed(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, TlsEvent::HandshakeCompleted(_)))
    }
}

impl Pipeline for RecordingPipeline {
    fn fire_event(&mut self, event: TlsEvent) {
        self.sequence.push(Delivery::Event);
        self.events.push(event);
    }

    fn fire_error(&mut self, error: TlsError) {
        self.sequence.push(Delivery::Error);
        self.errors.push(error);
    }

    fn schedule_close(&mut self, graceful_wait: Duration) {
        self.close_scheduled = true;
        self.close_wait = Some(graceful_wait);
    }
}
