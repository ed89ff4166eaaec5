//! The `gantry check-config` command.

use clap::Args;

use gantry_core::DeploymentPlan;

use super::deploy::DeployArgs;

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub deploy: DeployArgs,
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let request = args.deploy.to_request()?;
    let plan = DeploymentPlan::from_request(request)?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&plan)?),
        _ => print_plan(&plan),
    }
    Ok(())
}

fn print_plan(plan: &DeploymentPlan) {
    println!("application:    {}", plan.application_name);
    println!("environment:    {}", plan.environment_name);
    println!("region:         {}", plan.client.region);
    println!("bundle:         {}", plan.source_bundle.display());
    println!("version label:  {}", plan.version_label);
    if let Some(description) = &plan.description {
        println!("description:    {description}");
    }
    println!("upload target:  {}/{}", plan.bucket.bucket, plan.bucket.key);
    if let Some(endpoint) = &plan.client.endpoint {
        println!("endpoint:       {endpoint}");
    }
    if let Some(proxy) = &plan.client.proxy {
        println!("proxy:          {proxy}");
    }
    if !plan.settings.is_empty() {
        println!("settings:");
        for setting in &plan.settings {
            println!("  {} = {}", setting.name, setting.value);
        }
    }
    println!("wait for deploy: {}", plan.wait_for_deploy);
    println!("check interval:  {}ms", plan.check_interval_ms);
    match plan.poll_timeout_secs {
        Some(secs) => println!("poll timeout:    {secs}s"),
        None => println!("poll timeout:    none (wait indefinitely)"),
    }
}
