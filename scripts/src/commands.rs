//! Implementations of the various deploy scripts

use alloy::{primitives::utils::format_ether, providers::Provider};
use tracing::{info, warn};

use crate::{
    artifacts::{ArtifactStore, BuildInfo},
    bootstrap::{bootstrap as run_bootstrap, BootstrapPlan},
    cli::{BootstrapArgs, DeployAllArgs, DeployArgs, VerifyArgs, WireArgs},
    client::DeployClient,
    config::ScriptContext,
    deployment::{deploy_contract, deploy_contracts, wire_contracts},
    errors::ScriptError,
    explorer::EtherscanVerifier,
    report::{BatchSelector, Report},
    types::DeployedContracts,
    utils::setup_client,
    verification::verify_records,
};

/// Read a deployment batch back from the report
fn read_deployment(
    report: &Report,
    batch: BatchSelector,
) -> Result<DeployedContracts, ScriptError> {
    let records = report.read_records(batch)?;
    DeployedContracts::from_records(&records)
}

pub async fn deploy_all(
    args: DeployAllArgs,
    ctx: &ScriptContext,
    report: &Report,
    artifacts: ArtifactStore,
) -> Result<(), ScriptError> {
    // Resolve the bootstrap plan before anything is sent
    let plan = args.bootstrap.plan()?;
    let client = setup_client(ctx, artifacts).await?;

    let plan = (!args.skip_bootstrap).then_some(&plan);
    deploy_and_record(&client, report, !args.skip_wiring, plan).await?;
    Ok(())
}

/// Deploy all contracts, record the batch, then wire and bootstrap them
///
/// Stops at the first failure. The report is only written once all five
/// deployments succeed, and before any call is sent
async fn deploy_and_record(
    client: &impl DeployClient,
    report: &Report,
    wire: bool,
    plan: Option<&BootstrapPlan>,
) -> Result<DeployedContracts, ScriptError> {
    let deployed = deploy_contracts(client).await?;
    report.append_batch(&deployed.records())?;
    info!("deployment recorded in {}", report.path().display());

    if wire {
        wire_contracts(client, &deployed).await?;
    } else {
        info!("skipping wiring");
    }

    let Some(plan) = plan else {
        info!("skipping bootstrap");
        return Ok(deployed);
    };

    let summary = run_bootstrap(client, &deployed, plan).await?;
    if !summary.proposal_created && plan.proposal.is_some() {
        warn!("bootstrap finished without creating the first proposal");
    }

    Ok(deployed)
}

pub async fn deploy(
    args: DeployArgs,
    ctx: &ScriptContext,
    artifacts: ArtifactStore,
) -> Result<(), ScriptError> {
    let client = setup_client(ctx, artifacts).await?;
    let address = deploy_contract(&client, args.contract, &args.args).await?;

    println!("{}:{address:#x}", args.contract);
    Ok(())
}

pub async fn wire(
    args: WireArgs,
    ctx: &ScriptContext,
    report: &Report,
    artifacts: ArtifactStore,
) -> Result<(), ScriptError> {
    let deployed = read_deployment(report, args.batch)?;
    let client = setup_client(ctx, artifacts).await?;

    wire_contracts(&client, &deployed).await
}

pub async fn bootstrap(
    args: BootstrapArgs,
    ctx: &ScriptContext,
    report: &Report,
    artifacts: ArtifactStore,
) -> Result<(), ScriptError> {
    let plan = args.opts.plan()?;
    let deployed = read_deployment(report, args.batch)?;
    let client = setup_client(ctx, artifacts).await?;

    let summary = run_bootstrap(&client, &deployed, &plan).await?;
    info!(
        "bootstrap sent {} calls, proposal created: {}",
        summary.calls_sent, summary.proposal_created
    );
    Ok(())
}

/// Verify every contract of the batch, appending the results to the report
///
/// A contract failing verification is recorded as such and does not fail the
/// command
pub async fn verify(
    args: VerifyArgs,
    ctx: &ScriptContext,
    report: &Report,
    artifacts: ArtifactStore,
) -> Result<(), ScriptError> {
    let explorer = ctx.explorer()?.clone();
    let build_info = BuildInfo::from_file(&args.build_info)?;
    let (batch_idx, batch) = report.read_batch(args.batch)?;

    let verifier = EtherscanVerifier::new(explorer, artifacts, build_info)?;
    let results = verify_records(&verifier, &batch.records).await;
    report.append_results(batch_idx, &results)?;

    let num_verified = results.iter().filter(|r| r.verified).count();
    info!("{num_verified}/{} contracts verified", results.len());
    Ok(())
}

pub async fn accounts(ctx: &ScriptContext, artifacts: ArtifactStore) -> Result<(), ScriptError> {
    let client = setup_client(ctx, artifacts).await?;
    let balance = client
        .provider()
        .get_balance(client.sender())
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    println!("{:#x}: {} ETH", client.sender(), format_ether(balance));
    Ok(())
}
