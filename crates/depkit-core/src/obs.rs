//! Structured lifecycle events for hosted deployments.
//!
//! Every event carries an `event` field (`deployment.activated`,
//! `request.started`, ...) so log pipelines can filter on it.

use tracing::{debug, info, warn};

use crate::context::Context;

/// Span that scopes log lines to one request. Attach it with
/// [`tracing::Instrument`] so it follows the request across awaits.
pub fn request_span(context: &Context, seq: u64) -> tracing::Span {
    tracing::info_span!(
        "depkit.request",
        deployment = %context.deployment,
        version = %context.version,
        seq = seq,
    )
}

/// Emit `deployment.activated` once construction succeeded.
pub fn emit_activated(context: &Context, duration_ms: u64) {
    info!(
        event = "deployment.activated",
        deployment = %context.deployment,
        version = %context.version,
        input_type = %context.input_type,
        output_type = %context.output_type,
        duration_ms = duration_ms,
    );
}

/// Emit `deployment.activation_failed` with the fatal error.
pub fn emit_activation_failed(context: &Context, error: &dyn std::fmt::Display) {
    warn!(
        event = "deployment.activation_failed",
        deployment = %context.deployment,
        version = %context.version,
        error = %error,
    );
}

/// Emit `request.started`.
pub fn emit_request_started(seq: u64) {
    info!(event = "request.started", seq = seq);
}

/// Emit `request.finished` with the request duration.
pub fn emit_request_finished(seq: u64, duration_ms: u64) {
    info!(event = "request.finished", seq = seq, duration_ms = duration_ms);
}

/// Request failures are logged at warn: they never take the instance down.
pub fn emit_request_failed(
    seq: u64,
    duration_ms: u64,
    client_error: bool,
    error: &dyn std::fmt::Display,
) {
    warn!(
        event = "request.failed",
        seq = seq,
        duration_ms = duration_ms,
        client_error = client_error,
        error = %error,
    );
}

/// Emit `deployment.retired` once the last handle is gone.
pub fn emit_retired(context: &Context, requests_handled: u64) {
    info!(
        event = "deployment.retired",
        deployment = %context.deployment,
        version = %context.version,
        requests_handled = requests_handled,
    );
}

/// Retirement was requested while other handles still share the instance.
pub fn emit_retire_deferred(context: &Context, handles: usize) {
    debug!(
        event = "deployment.retire_deferred",
        deployment = %context.deployment,
        version = %context.version,
        other_handles = handles,
    );
}
