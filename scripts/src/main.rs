use clap::Parser;
use scripts::{cli::Cli, errors::ScriptError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let ctx = cli.context()?;
    let report = cli.report();
    let artifacts = cli.artifact_store();

    cli.command.run(&ctx, &report, artifacts).await
}
