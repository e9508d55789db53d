//! Host side of the lifecycle contract.
//!
//! [`DeploymentHost`] activates a [`Deployment`] once and dispatches requests
//! to it. Dispatch is the single place where payload shapes are checked
//! against the [`Context`]: input shape and declared input fields before the
//! component runs, output shape and declared output fields after.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::activation::Activation;
use crate::context::{Context, IoType};
use crate::deployment::Deployment;
use crate::error::{ActivationError, RequestError};
use crate::metrics::{Metrics, METRICS};
use crate::obs;
use crate::payload::Payload;

struct HostInner<D> {
    deployment: D,
    context: Context,
    next_seq: AtomicU64,
    metrics: Metrics,
}

/// A live, activated deployment version.
///
/// Cloning is cheap and shares the instance, so requests can be dispatched
/// from several tasks at once.
pub struct DeploymentHost<D> {
    inner: Arc<HostInner<D>>,
}

impl<D> Clone for DeploymentHost<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Deployment> DeploymentHost<D> {
    /// Validate the context and construct the deployment.
    pub fn activate(activation: Activation) -> Result<Self, ActivationError> {
        activation.context.validate()?;
        let context = activation.context.clone();
        let started = Instant::now();

        match D::construct(activation) {
            Ok(deployment) => Ok(Self::ready(deployment, context, started)),
            Err(err) => {
                obs::emit_activation_failed(&context, &err);
                Err(err)
            }
        }
    }

    /// Host an instance that was constructed elsewhere, e.g. with an
    /// injected storage collaborator.
    pub fn from_instance(deployment: D) -> Result<Self, ActivationError> {
        let context = deployment.context().clone();
        context.validate()?;
        Ok(Self::ready(deployment, context, Instant::now()))
    }

    fn ready(deployment: D, context: Context, started: Instant) -> Self {
        METRICS.inc_activations();
        let metrics = Metrics::new();
        metrics.inc_activations();
        obs::emit_activated(&context, started.elapsed().as_millis() as u64);

        Self {
            inner: Arc::new(HostInner {
                deployment,
                context,
                next_seq: AtomicU64::new(1),
                metrics,
            }),
        }
    }

    pub fn context(&self) -> &Context {
        &self.inner.context
    }

    pub fn deployment(&self) -> &D {
        &self.inner.deployment
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    /// Parse a JSON-serialized payload and dispatch it.
    pub async fn dispatch_json(&self, raw: &str) -> Result<Payload, RequestError> {
        let payload = Payload::from_json(raw)?;
        self.dispatch(payload).await
    }

    /// Run one request through the shape guard and the deployment.
    ///
    /// Errors are logged and returned; the instance stays live.
    pub async fn dispatch(&self, payload: Payload) -> Result<Payload, RequestError> {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let span = obs::request_span(&self.inner.context, seq);
        self.dispatch_inner(seq, payload).instrument(span).await
    }

    async fn dispatch_inner(&self, seq: u64, payload: Payload) -> Result<Payload, RequestError> {
        let started = Instant::now();
        obs::emit_request_started(seq);

        let result = self.guarded_request(payload).await;

        let duration_ms = started.elapsed().as_millis() as u64;
        self.inner.metrics.record_request(result.is_ok());
        METRICS.record_request(result.is_ok());
        match &result {
            Ok(_) => obs::emit_request_finished(seq, duration_ms),
            Err(err) => obs::emit_request_failed(seq, duration_ms, err.is_client_error(), err),
        }
        result
    }

    async fn guarded_request(&self, payload: Payload) -> Result<Payload, RequestError> {
        let context = &self.inner.context;
        check_input(context, &payload)?;
        let output = self.inner.deployment.request(payload).await?;
        check_output(context, &output)?;
        Ok(output)
    }

    /// Take the version out of service.
    ///
    /// Returns the instance when this was the last handle to it. Otherwise
    /// the handle is dropped and the remaining clones keep serving.
    pub fn retire(self) -> Option<D> {
        match Arc::try_unwrap(self.inner) {
            Ok(inner) => {
                obs::emit_retired(&inner.context, inner.metrics.requests_total());
                Some(inner.deployment)
            }
            Err(shared) => {
                obs::emit_retire_deferred(&shared.context, Arc::strong_count(&shared) - 1);
                None
            }
        }
    }
}

fn check_input(context: &Context, payload: &Payload) -> Result<(), RequestError> {
    if payload.io_type() != context.input_type {
        return Err(RequestError::InputShape {
            expected: context.input_type,
            actual: payload.io_type(),
        });
    }
    if context.input_type == IoType::Structured {
        if let Some(field) = context
            .input_fields
            .iter()
            .find(|f| payload.field(f).is_none())
        {
            return Err(RequestError::MissingField {
                field: field.clone(),
            });
        }
    }
    Ok(())
}

fn check_output(context: &Context, output: &Payload) -> Result<(), RequestError> {
    if output.io_type() != context.output_type {
        return Err(RequestError::OutputShape {
            expected: context.output_type,
            actual: output.io_type(),
        });
    }
    if output.io_type() == IoType::Structured {
        if let Some(field) = context
            .output_fields
            .iter()
            .find(|f| output.field(f).is_none())
        {
            return Err(RequestError::MissingOutputField {
                field: field.clone(),
            });
        }
    }
    Ok(())
}
