//! Pipeline error types.

use std::time::Duration;

use thiserror::Error;

use gantry_core::{ConfigError, RemoteError};

/// Errors that can abort a deployment. One variant per pipeline stage;
/// each wraps the underlying configuration or remote-service failure.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to upload bundle to {bucket}/{key}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to register version {label} for application {application}")]
    Publish {
        application: String,
        label: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to update environment {environment}")]
    Update {
        environment: String,
        #[source]
        source: RemoteError,
    },

    #[error("health polling failed for environment {environment}")]
    Poll {
        environment: String,
        #[source]
        source: RemoteError,
    },

    #[error("environment {environment} did not reach Ready within {timeout:?}")]
    PollTimeout {
        environment: String,
        timeout: Duration,
    },

    #[error("deployment cancelled")]
    Cancelled,
}

pub type DeployResult<T> = Result<T, DeployError>;
