use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gantry",
    about = "Deploy application bundles to gantry-hosted environments",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a bundle, register it as a version, and roll an environment
    /// onto it.
    ///
    /// By default the command blocks until the environment reports Ready;
    /// use --no-wait to return as soon as the update is accepted.
    Deploy(commands::deploy::DeployArgs),
    /// Validate configuration and print the derived deployment plan
    /// without touching the network.
    CheckConfig(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gantry_cli=info".parse()?)
                .add_directive("gantry_deploy=info".parse()?)
                .add_directive("gantry_remote=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy(args) => commands::deploy::run(args).await,
        Commands::CheckConfig(args) => commands::check::run(args),
    }
}
