//! Deployment Kit core library
//!
//! The lifecycle contract between a model-serving host and a deployment
//! package: construct once with a base directory and a [`Context`], then
//! handle requests whose [`Payload`] shape the context fixes.

pub mod activation;
pub mod context;
pub mod dataset;
pub mod deployment;
pub mod error;
pub mod host;
pub mod metrics;
pub mod obs;
pub mod payload;
pub mod telemetry;

pub use activation::{Activation, Environment};
pub use context::{Context, IoType};
pub use dataset::{Dataset, DEFAULT_SEPARATOR};
pub use deployment::Deployment;
pub use error::{ActivationError, DatasetError, RequestError};
pub use host::DeploymentHost;
pub use metrics::{Metrics, METRICS};
pub use payload::Payload;
pub use telemetry::{init_tracing, LogFormat};

/// Deployment Kit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
