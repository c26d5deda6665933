//! Deployment of the contracts and wiring of their cross-contract addresses

use alloy::primitives::Address;
use tracing::info;

use crate::{
    client::DeployClient,
    errors::ScriptError,
    types::{DeployedContracts, LiblockContract, ScriptCall},
};

/// Deploy a single contract, checking the number of constructor addresses
pub async fn deploy_contract(
    client: &impl DeployClient,
    contract: LiblockContract,
    constructor_args: &[Address],
) -> Result<Address, ScriptError> {
    let expected = contract.dependencies().len();
    if constructor_args.len() != expected {
        return Err(ScriptError::CalldataConstruction(format!(
            "{contract} takes {expected} constructor addresses, got {}",
            constructor_args.len()
        )));
    }

    let address = client.deploy(contract, constructor_args).await?;
    info!("{contract} deployed at {address:#x}");
    Ok(address)
}

/// Deploy all contracts in dependency order
///
/// Each deployment waits for its receipt, and the first failure aborts the
/// sequence
pub async fn deploy_contracts(client: &impl DeployClient) -> Result<DeployedContracts, ScriptError> {
    let liblock = deploy_contract(client, LiblockContract::Liblock, &[]).await?;
    let rliblock = deploy_contract(client, LiblockContract::RLiblock, &[]).await?;
    let proposal =
        deploy_contract(client, LiblockContract::Proposal, &[liblock, rliblock]).await?;
    let distributor = deploy_contract(client, LiblockContract::Distributor, &[liblock]).await?;
    let stacking = deploy_contract(
        client,
        LiblockContract::Stacking,
        &[liblock, rliblock, distributor],
    )
    .await?;

    Ok(DeployedContracts {
        liblock,
        rliblock,
        proposal,
        distributor,
        stacking,
    })
}

/// The calls wiring a deployment together, in the order they are sent
pub fn wiring_calls(deployed: &DeployedContracts) -> Vec<ScriptCall> {
    let mut calls = vec![ScriptCall::SetDistributor {
        token: deployed.liblock,
        distributor: deployed.distributor,
    }];

    // Admin rights move to the staking contract
    for contract in [
        LiblockContract::RLiblock,
        LiblockContract::Distributor,
        LiblockContract::Proposal,
    ] {
        calls.push(ScriptCall::TransferOwnership {
            contract,
            target: deployed.address(contract),
            new_owner: deployed.stacking,
        });
    }

    calls
}

/// Tell each contract the addresses of its collaborators
///
/// There is no rollback: a failure leaves the contracts partially wired
pub async fn wire_contracts(
    client: &impl DeployClient,
    deployed: &DeployedContracts,
) -> Result<(), ScriptError> {
    for call in wiring_calls(deployed) {
        let tx_hash = client.send(&call).await?;
        info!("{call} confirmed in {tx_hash:#x}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;

    use crate::{
        test_helpers::{dummy_deployment, FakeClient, FakeOp},
        types::{LiblockContract, ScriptCall},
    };

    use super::{deploy_contract, deploy_contracts, wire_contracts};

    #[tokio::test]
    async fn test_deploy_order_and_args() {
        let client = FakeClient::default();
        let deployed = deploy_contracts(&client).await.unwrap();

        let ops = client.ops();
        let expected: Vec<FakeOp> = LiblockContract::ALL
            .into_iter()
            .map(|c| FakeOp::Deploy(c, deployed.constructor_args(c)))
            .collect();
        assert_eq!(ops, expected);
        assert_eq!(
            deployed.constructor_args(LiblockContract::Stacking),
            vec![deployed.liblock, deployed.rliblock, deployed.distributor]
        );
    }

    #[tokio::test]
    async fn test_deploy_failure_stops_sequence() {
        let client = FakeClient::failing_deploy(LiblockContract::Proposal);
        assert!(deploy_contracts(&client).await.is_err());

        // The failed attempt is the last operation issued
        let ops = client.ops();
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[2], FakeOp::Deploy(LiblockContract::Proposal, _)));
    }

    #[tokio::test]
    async fn test_deploy_contract_checks_arg_count() {
        let client = FakeClient::default();
        let res = deploy_contract(&client, LiblockContract::Distributor, &[]).await;

        assert!(res.is_err());
        assert!(client.ops().is_empty());
    }

    #[tokio::test]
    async fn test_wiring_calls() {
        let client = FakeClient::default();
        let deployed = dummy_deployment();
        wire_contracts(&client, &deployed).await.unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls[0],
            ScriptCall::SetDistributor {
                token: deployed.liblock,
                distributor: deployed.distributor
            }
        );
        for call in &calls[1..] {
            match call {
                ScriptCall::TransferOwnership { new_owner, .. } => {
                    assert_eq!(*new_owner, deployed.stacking)
                }
                other => panic!("unexpected wiring call {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_wiring_failure_stops_remaining_calls() {
        let client = FakeClient::failing_call(1);
        let deployed = dummy_deployment();

        assert!(wire_contracts(&client, &deployed).await.is_err());
        assert_eq!(client.calls().len(), 2);
        assert!(!client.calls().iter().any(|c| matches!(
            c,
            ScriptCall::TransferOwnership { target, .. } if *target == Address::repeat_byte(0xc)
        )));
    }
}
