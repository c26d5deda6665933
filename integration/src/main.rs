//! Integration tests for the Liblock contracts, run against a live deployment
//! recorded in the deployment report

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]

mod test_args;
mod test_inventory;
mod tests;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;
use eyre::Result;
use scripts::{
    constants::DEFAULT_REPORT_PATH,
    report::{BatchSelector, ReportFormat},
};
use test_args::TestArgs;
use test_inventory::IntegrationTest;
use tracing_subscriber::EnvFilter;

/// The default private key for the tests, the first default account in an Anvil node
const DEFAULT_PKEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The CLI arguments for the integration tests
#[derive(Debug, Clone, Parser)]
struct CliArgs {
    /// The path to the deployment report
    #[clap(long, default_value = DEFAULT_REPORT_PATH)]
    report: PathBuf,
    /// The encoding of the deployment report
    #[clap(long, value_enum, default_value_t = ReportFormat::Csv)]
    report_format: ReportFormat,
    /// The report batch holding the deployment under test
    #[clap(long, default_value_t = BatchSelector::First)]
    batch: BatchSelector,
    /// The private key to use for testing
    #[clap(short = 'p', long, env = "PRIVATE_KEY", default_value = DEFAULT_PKEY)]
    pkey: String,
    /// The RPC url to run the tests against
    #[clap(short = 'r', long, default_value = "http://127.0.0.1:8545")]
    rpc_url: String,

    // --- Test Harness Args --- //
    /// The test to run, all tests are run if omitted
    #[arg(short, long, value_parser)]
    test: Option<String>,
}

// --------------
// | Entrypoint |
// --------------

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli_args = CliArgs::parse();
    let args = TestArgs::from_cli(&cli_args)?;

    let tests: Vec<&IntegrationTest> = inventory::iter::<IntegrationTest>
        .into_iter()
        .filter(|t| cli_args.test.as_deref().map_or(true, |name| t.name == name))
        .collect();
    if tests.is_empty() {
        eyre::bail!("no test matches {:?}", cli_args.test);
    }

    let mut num_failed = 0;
    for test in &tests {
        match (test.test_fn)(args.clone()).await {
            Ok(()) => println!("{} {}", test.name, "passed".green()),
            Err(e) => {
                num_failed += 1;
                println!("{} {}: {e:#}", test.name, "failed".red());
            }
        }
    }

    let summary = format!("{}/{} tests passed", tests.len() - num_failed, tests.len());
    if num_failed > 0 {
        println!("{}", summary.red().bold());
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", summary.green().bold());
    Ok(ExitCode::SUCCESS)
}
