//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};

use crate::{
    artifacts::ArtifactStore,
    bootstrap::{parse_lib, BootstrapPlan},
    commands::{accounts, bootstrap, deploy, deploy_all, verify, wire},
    config::{Network, ScriptContext},
    constants::{
        BOOTSTRAP_TRANSFER_AMOUNT, DEFAULT_ARTIFACTS_DIR, DEFAULT_JSONL_REPORT_PATH,
        DEFAULT_REPORT_PATH, PRIVATE_KEY_ENV_VAR,
    },
    errors::ScriptError,
    report::{BatchSelector, Report, ReportFormat},
    types::LiblockContract,
};

/// Deploy, wire, bootstrap and verify the Liblock contracts
#[derive(Parser)]
#[command(name = "liblock-scripts", version)]
pub struct Cli {
    /// The network to run against
    #[arg(short, long, value_enum, default_value_t = Network::Localhost, global = true)]
    pub network: Network,

    /// Network RPC URL, overriding the network's default
    #[arg(short, long, global = true)]
    pub rpc_url: Option<String>,

    /// Private key of the deployer
    #[arg(short, long, env = PRIVATE_KEY_ENV_VAR, hide_env_values = true, global = true)]
    pub priv_key: Option<String>,

    /// Block explorer API key, overriding the network's default
    #[arg(long, global = true)]
    pub explorer_api_key: Option<String>,

    /// Path of the deployment report, defaulting to `reports/report.<format>`
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    /// Encoding of the deployment report
    #[arg(long, value_enum, default_value_t = ReportFormat::Csv, global = true)]
    pub report_format: ReportFormat,

    /// Directory of the compiled contract artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR, global = true)]
    pub artifacts: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The context the command runs with, resolved from the arguments and the environment
    pub fn context(&self) -> Result<ScriptContext, ScriptError> {
        ScriptContext::from_env(
            self.network,
            self.rpc_url.clone(),
            self.priv_key.clone(),
            self.explorer_api_key.clone(),
        )
    }

    /// The report the command reads and appends to
    pub fn report(&self) -> Report {
        let path = self.report.clone().unwrap_or_else(|| {
            PathBuf::from(match self.report_format {
                ReportFormat::Csv => DEFAULT_REPORT_PATH,
                ReportFormat::Jsonl => DEFAULT_JSONL_REPORT_PATH,
            })
        });
        Report::new(path, self.report_format)
    }

    /// The store the contract artifacts are read from
    pub fn artifact_store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.artifacts)
    }
}

/// The commands of the deploy scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy all contracts, record them, then wire and bootstrap them
    DeployAll(DeployAllArgs),
    /// Deploy a single contract
    Deploy(DeployArgs),
    /// Wire together the contracts of a recorded deployment
    Wire(WireArgs),
    /// Bootstrap a recorded deployment
    Bootstrap(BootstrapArgs),
    /// Verify the contracts of a recorded deployment on the block explorer
    Verify(VerifyArgs),
    /// Print the deployer's address and balance
    Accounts,
}

impl Command {
    /// Run the command
    pub async fn run(
        self,
        ctx: &ScriptContext,
        report: &Report,
        artifacts: ArtifactStore,
    ) -> Result<(), ScriptError> {
        match self {
            Command::DeployAll(args) => deploy_all(args, ctx, report, artifacts).await,
            Command::Deploy(args) => deploy(args, ctx, artifacts).await,
            Command::Wire(args) => wire(args, ctx, report, artifacts).await,
            Command::Bootstrap(args) => bootstrap(args, ctx, report, artifacts).await,
            Command::Verify(args) => verify(args, ctx, report, artifacts).await,
            Command::Accounts => accounts(ctx, artifacts).await,
        }
    }
}

/// Deploy every contract in dependency order.
///
/// The deployment is appended to the report as one batch once all contracts
/// are deployed, then wired and bootstrapped unless skipped.
#[derive(Args)]
pub struct DeployAllArgs {
    /// Skip wiring the contracts together
    #[arg(long)]
    pub skip_wiring: bool,

    /// Skip the bootstrap step
    #[arg(long)]
    pub skip_bootstrap: bool,

    /// The bootstrap options
    #[command(flatten)]
    pub bootstrap: BootstrapOpts,
}

/// Deploy a single contract with explicit constructor addresses
#[derive(Args)]
pub struct DeployArgs {
    /// The contract to deploy
    #[arg(short, long, value_enum)]
    pub contract: LiblockContract,

    /// Constructor addresses, comma separated, in constructor order
    #[arg(long, value_delimiter = ',')]
    pub args: Vec<Address>,
}

/// Wire a recorded deployment
#[derive(Args)]
pub struct WireArgs {
    /// The report batch to read: `first`, `latest` or an index
    #[arg(long, default_value_t = BatchSelector::First)]
    pub batch: BatchSelector,
}

/// Bootstrap a recorded deployment
#[derive(Args)]
pub struct BootstrapArgs {
    /// The report batch to read: `first`, `latest` or an index
    #[arg(long, default_value_t = BatchSelector::First)]
    pub batch: BatchSelector,

    /// The bootstrap options
    #[command(flatten)]
    pub opts: BootstrapOpts,
}

/// Options of the bootstrap step
#[derive(Args)]
pub struct BootstrapOpts {
    /// Accounts receiving an initial LIB transfer, comma separated
    #[arg(long = "recipients", value_delimiter = ',')]
    pub recipients: Vec<Address>,

    /// LIB sent to each recipient, in whole tokens
    #[arg(long, default_value = BOOTSTRAP_TRANSFER_AMOUNT)]
    pub transfer_amount: String,

    /// Do not create the first proposal
    #[arg(long)]
    pub skip_proposal: bool,
}

impl BootstrapOpts {
    /// The bootstrap plan described by the options
    pub fn plan(&self) -> Result<BootstrapPlan, ScriptError> {
        let mut plan = BootstrapPlan::new(self.recipients.clone())?;
        plan.transfer_amount = parse_lib(&self.transfer_amount)?;
        if self.skip_proposal {
            plan.proposal = None;
        }
        Ok(plan)
    }
}

/// Verify a recorded deployment on the network's block explorer
#[derive(Args)]
pub struct VerifyArgs {
    /// The report batch to read: `first`, `latest` or an index
    #[arg(long, default_value_t = BatchSelector::First)]
    pub batch: BatchSelector,

    /// The compiler build-info file the contracts were built from
    #[arg(long)]
    pub build_info: PathBuf,
}
