//! The raw deployment configuration surface.
//!
//! `DeployRequest` enumerates every field a caller can set, either from
//! CLI flags or a `gantry.toml` file. All fields are optional here;
//! validation and derivation happen in [`crate::plan`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::SettingOverride;

/// A deployment request before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployRequest {
    /// Service region for all remote calls.
    pub region: Option<String>,
    /// Target application; also the default bucket name.
    pub application_name: Option<String>,
    /// Target environment.
    pub environment_name: Option<String>,
    /// Path to the bundle to upload. Must exist at validation time.
    pub source_bundle: Option<PathBuf>,
    /// Explicit version label. Derived from the bundle file name when unset.
    pub version_label: Option<String>,
    /// Free-text version metadata.
    pub description: Option<String>,
    /// Explicit bucket/key for the upload.
    pub bucket: Option<BucketOverride>,
    /// Ordered environment option overrides applied during the update.
    pub settings: Option<Vec<SettingOverride>>,
    /// Outbound proxy URL for all remote calls.
    pub proxy: Option<String>,
    /// Control-plane base URL, overriding the region-derived default.
    pub endpoint: Option<String>,
    /// Bearer token for all remote calls.
    pub auth_token: Option<String>,
    /// Whether to block until the environment reports Ready. Default true.
    pub wait_for_deploy: Option<bool>,
    /// Health polling interval in milliseconds. Default 2000.
    pub check_interval_ms: Option<u64>,
    /// Bound on total polling time. Unset means wait indefinitely.
    pub poll_timeout_secs: Option<u64>,
}

/// Explicit override for the upload target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketOverride {
    pub bucket: Option<String>,
    pub key: Option<String>,
}

impl DeployRequest {
    /// Load a request from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let request = toml::from_str(&content)?;
        Ok(request)
    }

    /// Fill unset fields from `fallback`, field by field.
    ///
    /// Values already present on `self` win; used to layer CLI flags over
    /// a config file.
    pub fn merged_with(self, fallback: DeployRequest) -> DeployRequest {
        DeployRequest {
            region: self.region.or(fallback.region),
            application_name: self.application_name.or(fallback.application_name),
            environment_name: self.environment_name.or(fallback.environment_name),
            source_bundle: self.source_bundle.or(fallback.source_bundle),
            version_label: self.version_label.or(fallback.version_label),
            description: self.description.or(fallback.description),
            bucket: self.bucket.or(fallback.bucket),
            settings: self.settings.or(fallback.settings),
            proxy: self.proxy.or(fallback.proxy),
            endpoint: self.endpoint.or(fallback.endpoint),
            auth_token: self.auth_token.or(fallback.auth_token),
            wait_for_deploy: self.wait_for_deploy.or(fallback.wait_for_deploy),
            check_interval_ms: self.check_interval_ms.or(fallback.check_interval_ms),
            poll_timeout_secs: self.poll_timeout_secs.or(fallback.poll_timeout_secs),
        }
    }
}
