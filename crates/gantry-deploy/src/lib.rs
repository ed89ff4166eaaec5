//! gantry-deploy — the deployment orchestration pipeline.
//!
//! One deployment is a strictly linear sequence: validate the request,
//! upload the bundle, register it as a version, point the environment at
//! the new version, and (by default) poll health until the environment
//! reports Ready. Each stage depends only on the previous stage's output;
//! any failure aborts the rest of the pipeline.
//!
//! # Components
//!
//! - **`upload`** — single atomic put of the bundle to object storage
//! - **`publish`** — version registration, reading back the confirmed label
//! - **`update`** — environment switch request (acceptance, not completion)
//! - **`poll`** — the health-convergence loop
//! - **`pipeline`** — the `Deployer` that sequences the stages

pub mod error;
pub mod pipeline;
pub mod poll;
pub mod publish;
pub mod update;
pub mod upload;

pub use error::{DeployError, DeployResult};
pub use pipeline::{DeployOutcome, Deployer};
pub use poll::{PollConfig, PollOutcome, PollState};
