//! The `gantry deploy` command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tokio::sync::watch;
use tracing::{info, warn};

use gantry_core::{BucketOverride, DeployRequest, DeploymentPlan, SettingOverride};
use gantry_deploy::{DeployOutcome, Deployer};
use gantry_remote::RemoteClient;

#[derive(Args, Debug, Default)]
pub struct DeployArgs {
    /// Service region, e.g. us-west-1
    #[arg(long)]
    pub region: Option<String>,
    /// Target application name
    #[arg(long = "app")]
    pub application_name: Option<String>,
    /// Target environment name
    #[arg(long = "env")]
    pub environment_name: Option<String>,
    /// Path to the bundle to deploy
    #[arg(long)]
    pub bundle: Option<PathBuf>,
    /// Version label (default: bundle file name without extension)
    #[arg(long)]
    pub version_label: Option<String>,
    /// Version description
    #[arg(long)]
    pub description: Option<String>,
    /// Upload bucket (default: the application name)
    #[arg(long)]
    pub bucket: Option<String>,
    /// Upload key (default: the bundle file name)
    #[arg(long)]
    pub key: Option<String>,
    /// Environment option override as name=value; repeatable, applied in order
    #[arg(long = "setting", value_parser = parse_setting)]
    pub settings: Vec<SettingOverride>,
    /// Outbound proxy URL for all service calls
    #[arg(long)]
    pub proxy: Option<String>,
    /// Control-plane base URL, overriding the region-derived default
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Bearer token for all service calls
    #[arg(long, env = "GANTRY_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,
    /// Return as soon as the update is accepted instead of waiting for Ready
    #[arg(long)]
    pub no_wait: bool,
    /// Health polling interval in milliseconds (default 2000)
    #[arg(long)]
    pub check_interval_ms: Option<u64>,
    /// Give up waiting for Ready after this many seconds (default: wait forever)
    #[arg(long)]
    pub poll_timeout_secs: Option<u64>,
    /// TOML config file; flags override values from the file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl DeployArgs {
    /// Turn the flags into a raw request, layering in the config file when
    /// one was given.
    pub fn to_request(&self) -> anyhow::Result<DeployRequest> {
        let bucket = if self.bucket.is_some() || self.key.is_some() {
            Some(BucketOverride {
                bucket: self.bucket.clone(),
                key: self.key.clone(),
            })
        } else {
            None
        };
        let mut request = DeployRequest {
            region: self.region.clone(),
            application_name: self.application_name.clone(),
            environment_name: self.environment_name.clone(),
            source_bundle: self.bundle.clone(),
            version_label: self.version_label.clone(),
            description: self.description.clone(),
            bucket,
            settings: (!self.settings.is_empty()).then(|| self.settings.clone()),
            proxy: self.proxy.clone(),
            endpoint: self.endpoint.clone(),
            auth_token: self.auth_token.clone(),
            wait_for_deploy: self.no_wait.then_some(false),
            check_interval_ms: self.check_interval_ms,
            poll_timeout_secs: self.poll_timeout_secs,
        };
        if let Some(path) = &self.config {
            let file = DeployRequest::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            request = request.merged_with(file);
        }
        Ok(request)
    }
}

fn parse_setting(s: &str) -> Result<SettingOverride, String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid setting {s:?}, expected name=value"))?;
    if name.is_empty() {
        return Err(format!("invalid setting {s:?}, empty name"));
    }
    Ok(SettingOverride {
        name: name.to_string(),
        value: value.to_string(),
    })
}

pub async fn run(args: DeployArgs) -> anyhow::Result<()> {
    let request = args.to_request()?;
    let plan = DeploymentPlan::from_request(request)?;

    // Each capability gets its own client, owned by this invocation.
    let store = RemoteClient::from_options(&plan.client)?;
    let registry = RemoteClient::from_options(&plan.client)?;
    let control = RemoteClient::from_options(&plan.client)?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; stopping before the next remote call");
            let _ = cancel_tx.send(true);
        }
    });

    let deployer = Deployer::new(store, registry, control).with_cancellation(cancel_rx);
    let outcome = deployer.deploy_plan(&plan).await?;

    match outcome {
        DeployOutcome::Accepted(ack) => {
            info!(
                environment = %ack.environment,
                version = %ack.version_label,
                "update accepted; environment is converging in the background"
            );
        }
        DeployOutcome::Converged { ack, health, samples } => {
            info!(
                environment = %ack.environment,
                version = %ack.version_label,
                status = %health.status,
                health = %health.health_status,
                samples,
                "deployment converged"
            );
        }
    }
    Ok(())
}
