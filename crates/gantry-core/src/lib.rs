//! gantry-core — shared types for the gantry deployment pipeline.
//!
//! This crate holds everything the other gantry crates agree on:
//!
//! - **`config`** — the raw configuration surface (`DeployRequest`)
//! - **`plan`** — validation into an immutable `DeploymentPlan`
//! - **`remote`** — the three capability traits the pipeline consumes
//!   (object store, version registry, environment control)
//! - **`types`** — health snapshots, statuses, acks

pub mod config;
pub mod error;
pub mod plan;
pub mod remote;
pub mod types;

pub use config::{BucketOverride, DeployRequest};
pub use error::ConfigError;
pub use plan::{BucketTarget, ClientOptions, DeploymentPlan};
pub use remote::{EnvironmentControl, ObjectStore, RemoteError, VersionRegistry};
pub use types::{
    EnvironmentStatus, HealthColor, HealthSnapshot, PublishedVersion, SettingOverride, Transition,
    UpdateAck,
};
