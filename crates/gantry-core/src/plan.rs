//! Validation of a raw [`DeployRequest`] into an immutable [`DeploymentPlan`].
//!
//! The plan is computed exactly once per deployment and threaded through
//! every later stage unchanged; nothing downstream re-derives a label or
//! bucket target.

use std::io;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::DeployRequest;
use crate::error::ConfigError;
use crate::types::SettingOverride;

/// Default health polling interval, in milliseconds.
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 2000;

/// Where the bundle is uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketTarget {
    pub bucket: String,
    pub key: String,
}

/// Options passed to every remote-service client.
#[derive(Debug, Clone, Serialize)]
pub struct ClientOptions {
    pub region: String,
    pub proxy: Option<String>,
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
}

/// A validated, immutable deployment plan.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentPlan {
    pub application_name: String,
    pub environment_name: String,
    pub source_bundle: PathBuf,
    pub version_label: String,
    pub description: Option<String>,
    pub bucket: BucketTarget,
    pub client: ClientOptions,
    pub settings: Vec<SettingOverride>,
    pub wait_for_deploy: bool,
    pub check_interval_ms: u64,
    pub poll_timeout_secs: Option<u64>,
}

impl DeploymentPlan {
    /// Validate a raw request and derive the plan.
    ///
    /// Fails with [`ConfigError::MissingField`] when any of region,
    /// application_name, environment_name, or source_bundle is absent or
    /// empty, and with [`ConfigError::BundleNotFound`] when the bundle path
    /// does not exist. Other filesystem errors surface as
    /// [`ConfigError::Io`] rather than being folded into "not found".
    pub fn from_request(request: DeployRequest) -> Result<Self, ConfigError> {
        let region = required(request.region, "region")?;
        let application_name = required(request.application_name, "application_name")?;
        let environment_name = required(request.environment_name, "environment_name")?;

        let source_bundle = request
            .source_bundle
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingField("source_bundle"))?;

        match std::fs::metadata(&source_bundle) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::BundleNotFound(source_bundle));
            }
            Err(e) => return Err(ConfigError::Io(e)),
        }

        let file_name = source_bundle
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| ConfigError::InvalidBundlePath(source_bundle.clone()))?;
        let file_stem = source_bundle
            .file_stem()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| ConfigError::InvalidBundlePath(source_bundle.clone()))?;

        let version_label = request
            .version_label
            .filter(|l| !l.is_empty())
            .unwrap_or(file_stem);

        let bucket_override = request.bucket.unwrap_or_default();
        let bucket = BucketTarget {
            bucket: bucket_override
                .bucket
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| application_name.clone()),
            key: bucket_override
                .key
                .filter(|k| !k.is_empty())
                .unwrap_or(file_name),
        };

        Ok(DeploymentPlan {
            application_name,
            environment_name,
            source_bundle,
            version_label,
            description: request.description,
            bucket,
            client: ClientOptions {
                region,
                proxy: request.proxy,
                endpoint: request.endpoint,
                auth_token: request.auth_token,
            },
            settings: request.settings.unwrap_or_default(),
            wait_for_deploy: request.wait_for_deploy.unwrap_or(true),
            check_interval_ms: request
                .check_interval_ms
                .unwrap_or(DEFAULT_CHECK_INTERVAL_MS),
            poll_timeout_secs: request.poll_timeout_secs,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingField(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BucketOverride;

    /// A request whose bundle actually exists on disk.
    fn valid_request(dir: &tempfile::TempDir) -> DeployRequest {
        let bundle = dir.path().join("app-1.2.0.zip");
        std::fs::write(&bundle, b"zip bytes").unwrap();
        DeployRequest {
            region: Some("us-west-1".into()),
            application_name: Some("svc".into()),
            environment_name: Some("svc-prod".into()),
            source_bundle: Some(bundle),
            ..Default::default()
        }
    }

    #[test]
    fn missing_fields_are_named() {
        let dir = tempfile::tempdir().unwrap();
        for field in [
            "region",
            "application_name",
            "environment_name",
            "source_bundle",
        ] {
            let mut request = valid_request(&dir);
            match field {
                "region" => request.region = None,
                "application_name" => request.application_name = None,
                "environment_name" => request.environment_name = None,
                "source_bundle" => request.source_bundle = None,
                _ => unreachable!(),
            }
            let err = DeploymentPlan::from_request(request).unwrap_err();
            match err {
                ConfigError::MissingField(name) => assert_eq!(name, field),
                other => panic!("expected MissingField for {field}, got {other}"),
            }
        }
    }

    #[test]
    fn empty_fields_count_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = valid_request(&dir);
        request.region = Some(String::new());
        let err = DeploymentPlan::from_request(request).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("region")));
    }

    #[test]
    fn absent_bundle_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = valid_request(&dir);
        request.source_bundle = Some(dir.path().join("missing.zip"));
        let err = DeploymentPlan::from_request(request).unwrap_err();
        assert!(matches!(err, ConfigError::BundleNotFound(_)));
    }

    #[test]
    fn label_and_key_derive_from_bundle_name() {
        let dir = tempfile::tempdir().unwrap();
        let request = valid_request(&dir);
        let plan = DeploymentPlan::from_request(request).unwrap();
        assert_eq!(plan.version_label, "app-1.2.0");
        assert_eq!(plan.bucket.key, "app-1.2.0.zip");
    }

    #[test]
    fn bucket_defaults_to_application_name() {
        let dir = tempfile::tempdir().unwrap();
        let plan = DeploymentPlan::from_request(valid_request(&dir)).unwrap();
        assert_eq!(plan.bucket.bucket, "svc");
    }

    #[test]
    fn explicit_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = valid_request(&dir);
        request.version_label = Some("v42".into());
        request.bucket = Some(BucketOverride {
            bucket: Some("artifacts".into()),
            key: Some("svc/v42.zip".into()),
        });
        let plan = DeploymentPlan::from_request(request).unwrap();
        assert_eq!(plan.version_label, "v42");
        assert_eq!(plan.bucket.bucket, "artifacts");
        assert_eq!(plan.bucket.key, "svc/v42.zip");
    }

    #[test]
    fn partial_bucket_override_keeps_derived_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = valid_request(&dir);
        request.bucket = Some(BucketOverride {
            bucket: Some("artifacts".into()),
            key: None,
        });
        let plan = DeploymentPlan::from_request(request).unwrap();
        assert_eq!(plan.bucket.bucket, "artifacts");
        assert_eq!(plan.bucket.key, "app-1.2.0.zip");
    }

    #[test]
    fn defaults_apply() {
        let dir = tempfile::tempdir().unwrap();
        let plan = DeploymentPlan::from_request(valid_request(&dir)).unwrap();
        assert!(plan.wait_for_deploy);
        assert_eq!(plan.check_interval_ms, DEFAULT_CHECK_INTERVAL_MS);
        assert!(plan.poll_timeout_secs.is_none());
        assert!(plan.settings.is_empty());
        assert_eq!(plan.client.region, "us-west-1");
    }

    #[test]
    fn auth_token_is_not_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = valid_request(&dir);
        request.auth_token = Some("secret".into());
        let plan = DeploymentPlan::from_request(request).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        assert!(!json.contains("secret"));
    }
}
