//! The three remote-service capabilities the pipeline consumes.
//!
//! The pipeline never talks to a concrete service; it is written against
//! these traits. `gantry-remote` provides the production HTTP
//! implementations, tests substitute scripted stubs.

use async_trait::async_trait;
use thiserror::Error;

use crate::plan::BucketTarget;
use crate::types::{HealthSnapshot, PublishedVersion, SettingOverride, UpdateAck};

/// Failure from a remote-service call.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request never produced a response (connect failure, timeout,
    /// broken connection).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service rejected request ({status}): {message}")]
    Service { status: u16, message: String },

    /// The service answered, but the body was not what we expected.
    #[error("failed to decode service response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether the failure is worth retrying on the next poll interval.
    ///
    /// Transport failures and server-side errors (5xx, 429) are transient;
    /// client-side rejections, decode failures, and I/O errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::Service { status, .. } => *status == 429 || *status >= 500,
            RemoteError::Io(_) | RemoteError::Decode(_) => false,
        }
    }
}

/// Object storage: a single atomic put per upload.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` at `bucket`/`key`, replacing any existing object.
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), RemoteError>;
}

/// Registry of deployable application versions.
#[async_trait]
pub trait VersionRegistry: Send + Sync {
    /// Register an uploaded object as a version of `application`.
    ///
    /// The returned label is the one the service actually assigned, which
    /// may differ from the requested `label`.
    async fn create_version(
        &self,
        application: &str,
        label: &str,
        description: Option<&str>,
        source: &BucketTarget,
    ) -> Result<PublishedVersion, RemoteError>;
}

/// Control over a running environment.
#[async_trait]
pub trait EnvironmentControl: Send + Sync {
    /// Ask `environment` to switch to `version_label`, applying `settings`
    /// in order. The ack confirms acceptance, not completion.
    async fn update_environment(
        &self,
        environment: &str,
        version_label: &str,
        settings: &[SettingOverride],
    ) -> Result<UpdateAck, RemoteError>;

    /// Sample the environment's current health.
    async fn describe_health(&self, environment: &str) -> Result<HealthSnapshot, RemoteError>;
}
