//! The chain client used to deploy and call the contracts

use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, TxHash},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use tracing::debug;

use crate::{
    artifacts::ArtifactStore,
    constants::PROPOSAL_GAS_LIMIT,
    errors::ScriptError,
    solidity::{ILiblock, ILiblocked, IOwnable, IProposal},
    types::{LiblockContract, ScriptCall},
};

/// The provider type used by the scripts
pub type Wallet = DynProvider<Ethereum>;

/// The call builder type used by the scripts
pub type ScriptCallBuilder<'a, C> = CallBuilder<&'a Wallet, C, Ethereum>;

/// The operations the deployment steps need from the chain
///
/// Every method returns once the transaction's receipt is available
#[allow(async_fn_in_trait)]
pub trait DeployClient {
    /// Deploy a contract with the given constructor addresses, returning its address
    async fn deploy(
        &self,
        contract: LiblockContract,
        constructor_args: &[Address],
    ) -> Result<Address, ScriptError>;

    /// Send a state-changing call, returning the transaction hash
    async fn send(&self, call: &ScriptCall) -> Result<TxHash, ScriptError>;
}

/// A [`DeployClient`] backed by an RPC provider with a local signer
#[derive(Clone)]
pub struct ChainClient {
    /// The signing provider
    provider: Wallet,
    /// The address of the signer
    sender: Address,
    /// The compiled artifacts deployments are read from
    artifacts: ArtifactStore,
}

impl ChainClient {
    /// Create a client from a signing provider
    pub fn new(provider: Wallet, sender: Address, artifacts: ArtifactStore) -> Self {
        Self {
            provider,
            sender,
            artifacts,
        }
    }

    /// The signing provider
    pub fn provider(&self) -> &Wallet {
        &self.provider
    }

    /// The address transactions are sent from
    pub fn sender(&self) -> Address {
        self.sender
    }
}

impl DeployClient for ChainClient {
    async fn deploy(
        &self,
        contract: LiblockContract,
        constructor_args: &[Address],
    ) -> Result<Address, ScriptError> {
        let artifact = self.artifacts.load(contract)?;
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_deploy_code(artifact.deploy_code(constructor_args));

        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{contract}: {e}")))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{contract}: {e}")))?;

        if !receipt.status() {
            return Err(ScriptError::ContractDeployment(format!(
                "{contract}: deployment reverted in tx {:#x}",
                receipt.transaction_hash
            )));
        }

        receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "{contract}: no contract address in receipt of {:#x}",
                receipt.transaction_hash
            ))
        })
    }

    async fn send(&self, call: &ScriptCall) -> Result<TxHash, ScriptError> {
        debug!("sending {call}");
        let receipt = match call {
            ScriptCall::SetDistributor { token, distributor } => {
                let liblock = ILiblock::new(*token, self.provider.clone());
                send_tx(liblock.setDistributor(*distributor)).await?
            }
            ScriptCall::TransferOwnership {
                target, new_owner, ..
            } => {
                let ownable = IOwnable::new(*target, self.provider.clone());
                send_tx(ownable.transferOwnership(*new_owner)).await?
            }
            ScriptCall::Transfer { token, to, amount } => {
                let liblock = ILiblock::new(*token, self.provider.clone());
                send_tx(liblock.transfer(*to, *amount)).await?
            }
            ScriptCall::Approve {
                token,
                spender,
                amount,
            } => {
                let liblock = ILiblock::new(*token, self.provider.clone());
                send_tx(liblock.approve(*spender, *amount)).await?
            }
            ScriptCall::Lock17 { stacking, amount } => {
                let liblocked = ILiblocked::new(*stacking, self.provider.clone());
                send_tx(liblocked.lock17(*amount)).await?
            }
            ScriptCall::Lock186 { stacking, amount } => {
                let liblocked = ILiblocked::new(*stacking, self.provider.clone());
                send_tx(liblocked.lock186(*amount)).await?
            }
            ScriptCall::CreateProposal {
                proposal,
                title,
                text,
            } => {
                let proposal = IProposal::new(*proposal, self.provider.clone());
                let tx = proposal
                    .createProposal(title.clone(), text.clone())
                    .gas(PROPOSAL_GAS_LIMIT);
                send_tx(tx).await?
            }
        };

        Ok(receipt.transaction_hash)
    }
}

/// Send a transaction and wait for its receipt, failing if it reverted
pub async fn send_tx<C: CallDecoder>(
    tx: ScriptCallBuilder<'_, C>,
) -> Result<TransactionReceipt, ScriptError> {
    let receipt = tx
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractInteraction(format!(
            "tx {:#x} reverted",
            receipt.transaction_hash
        )));
    }
    Ok(receipt)
}
