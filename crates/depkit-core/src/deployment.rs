//! The component side of the lifecycle contract.

use async_trait::async_trait;

use crate::activation::Activation;
use crate::context::Context;
use crate::error::{ActivationError, RequestError};
use crate::payload::Payload;

/// A deployable request handler.
///
/// Constructed once per activated version, then asked to handle any number
/// of requests. `construct` finishes all setup (files, environment,
/// collaborator handles) before returning; there is no lazy initialization.
/// `request` borrows the instance immutably, so state built at construction
/// is shared read-only between requests and one failed request cannot leave
/// the instance in a worse state for the next.
#[async_trait]
pub trait Deployment: Send + Sync {
    /// Build a ready instance, or fail activation.
    fn construct(activation: Activation) -> Result<Self, ActivationError>
    where
        Self: Sized;

    /// The context this instance was constructed with.
    fn context(&self) -> &Context;

    /// Handle one request. The result shape must follow `context().output_type`.
    async fn request(&self, payload: Payload) -> Result<Payload, RequestError>;
}
