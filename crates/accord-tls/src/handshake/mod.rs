//! Handshake lifecycle and outcome classification.
//!
//! One `HandshakeNegotiator` exists per connection attempt and is
//! driven sequentially by the surrounding pipeline's run loop. It
//! turns record-layer outcomes into exactly one terminal
//! `HandshakeOutcome`, firing the handshake-completed event at most
//! once and never together with a pre-completion failure.

pub mod negotiate;


use std::time::Duration;

use accord_types::TlsError;
use tracing::{debug, warn};

use crate::alert::AlertDescription;
use crate::config::{TlsConfiguration, DEFAULT_SHUTDOWN_TIMEOUT};
use crate::pipeline::{Pipeline, TlsEvent};
use negotiate::{NegotiationFailure, NegotiationResult};

/// Lifecycle of one handshake attempt. Transitions are monotonic:
/// `NotStarted → InProgress → Succeeded → FailedPostCompletion` or
/// `NotStarted → InProgress → FailedPreCompletion`; no state ever
/// reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOutcome {
    NotStarted,
    InProgress,
    Succeeded,
    FailedPreCompletion,
    FailedPostCompletion,
}

impl HandshakeOutcome {
    /// Whether the attempt has reached a state that accepts no further
    /// errors.
    pub fn is_failed(self) -> bool {
        matches!(
            self,
            HandshakeOutcome::FailedPreCompletion | HandshakeOutcome::FailedPostCompletion
        )
    }
}

/// Drives one handshake attempt to a terminal outcome.
#[derive(Debug)]
pub struct HandshakeNegotiator {
    outcome: HandshakeOutcome,
    completion_fired: bool,
    shutdown_timeout: Duration,
}

impl HandshakeNegotiator {
    pub fn new() -> Self {
        Self {
            outcome: HandshakeOutcome::NotStarted,
            completion_fired: false,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// A negotiator carrying the configuration's graceful-close bound,
    /// passed along whenever closure is scheduled.
    pub fn for_config(config: &TlsConfiguration) -> Self {
        Self {
            shutdown_timeout: config.shutdown_timeout,
            ..Self::new()
        }
    }

    pub fn outcome(&self) -> HandshakeOutcome {
        self.outcome
    }

    /// Whether the transport-level handshake completed, regardless of
    /// any later post-completion failure.
    pub fn handshake_succeeded(&self) -> bool {
        self.completion_fired
    }

    /// The transport connected; the attempt is now in progress.
    pub fn connect(&mut self) {
        if self.outcome == HandshakeOutcome::NotStarted {
            debug!("handshake in progress");
            self.outcome = HandshakeOutcome::InProgress;
        }
    }

    /// Feed the engine's terminal verdict for this attempt.
    pub fn drive(
        &mut self,
        verdict: Result<NegotiationResult, NegotiationFailure>,
        pipeline: &mut dyn Pipeline,
    ) {
        match verdict {
            Ok(result) => self.complete(result, pipeline),
            Err(failure) => self.fail(failure, pipeline),
        }
    }

    /// The record-layer engine reports a completed handshake.
    ///
    /// Fires the completion event exactly once, then reports any
    /// deferred post-handshake failure as a distinct error.
    pub fn complete(&mut self, result: NegotiationResult, pipeline: &mut dyn Pipeline) {
        if self.outcome.is_failed() || self.completion_fired {
            return;
        }
        debug!(
            version = %result.parameters.version,
            alpn = ?result.parameters.alpn_protocol,
            "handshake completed"
        );
        self.outcome = HandshakeOutcome::Succeeded;
        self.completion_fired = true;
        pipeline.fire_event(TlsEvent::HandshakeCompleted(result.parameters));

        if let Some(alert) = result.deferred_failure {
            warn!(alert = %alert, "post-handshake confirmation failed");
            self.outcome = HandshakeOutcome::FailedPostCompletion;
            pipeline.fire_error(TlsError::PostHandshakeFailed(alert.to_string()));
            pipeline.schedule_close(self.shutdown_timeout);
        }
    }

    /// The engine reports a pre-completion failure.
    pub fn fail(&mut self, failure: NegotiationFailure, pipeline: &mut dyn Pipeline) {
        if self.outcome.is_failed() {
            return;
        }
        if self.completion_fired {
            // Completion already fired: this can only be reported as a
            // post-completion failure.
            self.post_failure(failure.alert, pipeline);
            return;
        }
        warn!(alert = %failure.alert, "handshake failed");
        self.outcome = HandshakeOutcome::FailedPreCompletion;
        pipeline.fire_error(failure.error);
        pipeline.schedule_close(self.shutdown_timeout);
    }

    /// A fatal alert arrived from the peer.
    pub fn handle_alert(&mut self, alert: AlertDescription, pipeline: &mut dyn Pipeline) {
        if self.outcome.is_failed() {
            return;
        }
        if self.completion_fired {
            self.post_failure(alert, pipeline);
        } else {
            self.fail(
                NegotiationFailure {
                    alert,
                    error: TlsError::HandshakeFailed(alert.to_string()),
                },
                pipeline,
            );
        }
    }

    /// The transport closed underneath the attempt. Forces a terminal
    /// outcome; a close after successful completion is not an error of
    /// this layer.
    pub fn transport_closed(&mut self, pipeline: &mut dyn Pipeline) {
        match self.outcome {
            HandshakeOutcome::NotStarted | HandshakeOutcome::InProgress => {
                warn!("transport closed during handshake");
                self.outcome = HandshakeOutcome::FailedPreCompletion;
                pipeline.fire_error(TlsError::UncleanShutdown);
                pipeline.schedule_close(self.shutdown_timeout);
            }
            _ => {}
        }
    }

    /// An error matching no known classification. Forwarded verbatim.
    pub fn handle_unexpected(&mut self, message: String, pipeline: &mut dyn Pipeline) {
        if self.outcome.is_failed() {
            return;
        }
        warn!(message = %message, "unexpected handshake error");
        self.outcome = if self.completion_fired {
            HandshakeOutcome::FailedPostCompletion
        } else {
            HandshakeOutcome::FailedPreCompletion
        };
        pipeline.fire_error(TlsError::Unexpected(message));
        pipeline.schedule_close(self.shutdown_timeout);
    }

    fn post_failure(&mut self, alert: AlertDescription, pipeline: &mut dyn Pipeline) {
        warn!(alert = %alert, "post-handshake failure");
        self.outcome = HandshakeOutcome::FailedPostCompletion;
        pipeline.fire_error(TlsError::PostHandshakeFailed(alert.to_string()));
        pipeline.schedule_close(self.shutdown_timeout);
    }
}

impl Default for HandshakeNegotiator {
    fn default() -> Self {
        Self::new()
    }
}
