//! The deployment orchestrator.

use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use gantry_core::{
    DeployRequest, DeploymentPlan, EnvironmentControl, HealthSnapshot, ObjectStore, UpdateAck,
    VersionRegistry,
};

use crate::error::{DeployError, DeployResult};
use crate::poll::{self, PollConfig};
use crate::{publish, update, upload};

/// What a deployment produced.
#[derive(Debug, Clone)]
pub enum DeployOutcome {
    /// The environment accepted the update; convergence was not awaited.
    Accepted(UpdateAck),
    /// The environment accepted the update and converged to Ready.
    Converged {
        ack: UpdateAck,
        health: HealthSnapshot,
        samples: u32,
    },
}

/// Sequences one deployment: validate → upload → publish → update →
/// (optionally) poll until Ready.
///
/// The deployer owns its three remote capabilities for the duration of
/// one invocation; they are dropped with it on every exit path. Stages
/// run strictly in order and any failure aborts the rest — no stage is
/// attempted out of order and nothing is rolled back.
pub struct Deployer<S, R, C> {
    store: S,
    registry: R,
    control: C,
    cancel: Option<watch::Receiver<bool>>,
}

impl<S, R, C> Deployer<S, R, C>
where
    S: ObjectStore,
    R: VersionRegistry,
    C: EnvironmentControl,
{
    pub fn new(store: S, registry: R, control: C) -> Self {
        Self {
            store,
            registry,
            control,
            cancel: None,
        }
    }

    /// Wire in a cancellation signal.
    ///
    /// The signal is checked before every outbound call: ahead of each of
    /// the three stages here, and around every sleep and health sample
    /// inside the polling loop.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn ensure_not_cancelled(&self) -> DeployResult<()> {
        if let Some(rx) = &self.cancel {
            if *rx.borrow() {
                return Err(DeployError::Cancelled);
            }
        }
        Ok(())
    }

    /// Validate a raw request and run the full pipeline.
    pub async fn deploy(&self, request: DeployRequest) -> DeployResult<DeployOutcome> {
        let plan = DeploymentPlan::from_request(request)?;
        self.deploy_plan(&plan).await
    }

    /// Run the pipeline against an already-validated plan.
    ///
    /// The plan is threaded through every stage as-is; labels and bucket
    /// targets are never recomputed here.
    pub async fn deploy_plan(&self, plan: &DeploymentPlan) -> DeployResult<DeployOutcome> {
        info!(
            application = %plan.application_name,
            environment = %plan.environment_name,
            label = %plan.version_label,
            "starting deployment"
        );

        self.ensure_not_cancelled()?;
        upload::upload_bundle(&self.store, plan).await?;
        self.ensure_not_cancelled()?;
        let version = publish::publish_version(&self.registry, plan).await?;
        self.ensure_not_cancelled()?;
        let ack = update::update_environment(&self.control, plan, &version.label).await?;

        if !plan.wait_for_deploy {
            info!(
                environment = %ack.environment,
                label = %ack.version_label,
                "update accepted; not waiting for convergence"
            );
            return Ok(DeployOutcome::Accepted(ack));
        }

        let config = PollConfig {
            interval: Duration::from_millis(plan.check_interval_ms),
            timeout: plan.poll_timeout_secs.map(Duration::from_secs),
            ..Default::default()
        };
        let outcome = poll::wait_for_ready(
            &self.control,
            &plan.environment_name,
            &config,
            self.cancel.clone(),
        )
        .await?;

        Ok(DeployOutcome::Converged {
            ack,
            health: outcome.final_snapshot,
            samples: outcome.samples,
        })
    }
}
