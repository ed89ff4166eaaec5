//! Bundle upload — one read, one put.

use tracing::info;

use gantry_core::{DeploymentPlan, ObjectStore, RemoteError};

use crate::error::{DeployError, DeployResult};

/// Read the bundle in full and put it at the plan's bucket target.
///
/// A re-run with the same key replaces the existing object, so repeating
/// a deployment with the same version label is safe. No chunking and no
/// resume: the put either lands whole or the stage fails.
pub async fn upload_bundle<S: ObjectStore + ?Sized>(
    store: &S,
    plan: &DeploymentPlan,
) -> DeployResult<()> {
    let target = &plan.bucket;
    info!(
        bucket = %target.bucket,
        key = %target.key,
        bundle = %plan.source_bundle.display(),
        "uploading source bundle"
    );

    let body = tokio::fs::read(&plan.source_bundle)
        .await
        .map_err(|e| upload_error(plan, RemoteError::Io(e)))?;
    let bytes = body.len();

    store
        .put_object(&target.bucket, &target.key, body)
        .await
        .map_err(|e| upload_error(plan, e))?;

    info!(bucket = %target.bucket, key = %target.key, bytes, "bundle uploaded");
    Ok(())
}

fn upload_error(plan: &DeploymentPlan, source: RemoteError) -> DeployError {
    DeployError::Upload {
        bucket: plan.bucket.bucket.clone(),
        key: plan.bucket.key.clone(),
        source,
    }
}
