//! Environment update request.

use tracing::info;

use gantry_core::{DeploymentPlan, EnvironmentControl, UpdateAck};

use crate::error::{DeployError, DeployResult};

/// Ask the environment to switch to the published version.
///
/// `version_label` is the confirmed label from the registry, not the one
/// in the plan. The returned ack means the service accepted the request;
/// whether the switch completes is what the polling stage answers.
pub async fn update_environment<C: EnvironmentControl + ?Sized>(
    control: &C,
    plan: &DeploymentPlan,
    version_label: &str,
) -> DeployResult<UpdateAck> {
    info!(
        environment = %plan.environment_name,
        label = %version_label,
        settings = plan.settings.len(),
        "requesting environment update"
    );

    let ack = control
        .update_environment(&plan.environment_name, version_label, &plan.settings)
        .await
        .map_err(|e| DeployError::Update {
            environment: plan.environment_name.clone(),
            source: e,
        })?;

    info!(
        environment = %ack.environment,
        label = %ack.version_label,
        status = %ack.status,
        "environment update accepted"
    );
    Ok(ack)
}
