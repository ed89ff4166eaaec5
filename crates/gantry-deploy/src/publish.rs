//! Version registration.

use tracing::{debug, info};

use gantry_core::{DeploymentPlan, PublishedVersion, VersionRegistry};

use crate::error::{DeployError, DeployResult};

/// Register the uploaded object as a new version of the application.
///
/// The label on the returned [`PublishedVersion`] comes from the service's
/// response, not from the plan — the service may adjust the requested
/// label, and the adjusted one is what later stages must use. Rejections
/// (duplicate immutable label, insufficient permission) surface as
/// [`DeployError::Publish`]; nothing here retries.
pub async fn publish_version<R: VersionRegistry + ?Sized>(
    registry: &R,
    plan: &DeploymentPlan,
) -> DeployResult<PublishedVersion> {
    info!(
        application = %plan.application_name,
        label = %plan.version_label,
        "registering application version"
    );

    let version = registry
        .create_version(
            &plan.application_name,
            &plan.version_label,
            plan.description.as_deref(),
            &plan.bucket,
        )
        .await
        .map_err(|e| DeployError::Publish {
            application: plan.application_name.clone(),
            label: plan.version_label.clone(),
            source: e,
        })?;

    if version.label != plan.version_label {
        debug!(
            requested = %plan.version_label,
            confirmed = %version.label,
            "service adjusted the version label"
        );
    }
    info!(
        application = %plan.application_name,
        label = %version.label,
        "version registered"
    );
    Ok(version)
}
