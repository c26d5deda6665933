//! In-memory fakes of the chain client and verifier used in unit tests

use std::sync::Mutex;

use alloy::primitives::{Address, TxHash};

use crate::{
    client::DeployClient,
    errors::ScriptError,
    report::DeploymentRecord,
    types::{DeployedContracts, LiblockContract, ScriptCall},
    verification::{ContractVerifier, VerificationStatus},
};

/// A deployment with distinct, recognizable addresses
pub fn dummy_deployment() -> DeployedContracts {
    DeployedContracts {
        liblock: fake_address(LiblockContract::Liblock),
        rliblock: fake_address(LiblockContract::RLiblock),
        proposal: fake_address(LiblockContract::Proposal),
        distributor: fake_address(LiblockContract::Distributor),
        stacking: fake_address(LiblockContract::Stacking),
    }
}

/// The address the fake client deploys a contract at
fn fake_address(contract: LiblockContract) -> Address {
    Address::repeat_byte(0xa + contract as u8)
}

/// An operation issued against the fake client
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FakeOp {
    /// A deployment with its constructor arguments
    Deploy(LiblockContract, Vec<Address>),
    /// A contract call
    Call(ScriptCall),
}

/// A [`DeployClient`] that records every operation and fails on demand
#[derive(Default)]
pub struct FakeClient {
    /// The operations issued so far
    ops: Mutex<Vec<FakeOp>>,
    /// The contract whose deployment fails
    fail_deploy: Option<LiblockContract>,
    /// The zero-based index of the call that fails
    fail_call: Option<usize>,
    /// Whether proposal creation fails
    fail_proposal: bool,
}

impl FakeClient {
    /// A client failing to deploy the given contract
    pub fn failing_deploy(contract: LiblockContract) -> Self {
        Self {
            fail_deploy: Some(contract),
            ..Default::default()
        }
    }

    /// A client failing the call at the given index
    pub fn failing_call(idx: usize) -> Self {
        Self {
            fail_call: Some(idx),
            ..Default::default()
        }
    }

    /// A client failing every proposal creation
    pub fn failing_proposal() -> Self {
        Self {
            fail_proposal: true,
            ..Default::default()
        }
    }

    /// The operations issued so far
    pub fn ops(&self) -> Vec<FakeOp> {
        self.ops.lock().unwrap().clone()
    }

    /// The calls issued so far
    pub fn calls(&self) -> Vec<ScriptCall> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                FakeOp::Call(call) => Some(call),
                FakeOp::Deploy(..) => None,
            })
            .collect()
    }
}

impl DeployClient for FakeClient {
    async fn deploy(
        &self,
        contract: LiblockContract,
        constructor_args: &[Address],
    ) -> Result<Address, ScriptError> {
        self.ops
            .lock()
            .unwrap()
            .push(FakeOp::Deploy(contract, constructor_args.to_vec()));

        if self.fail_deploy == Some(contract) {
            return Err(ScriptError::ContractDeployment(format!("{contract}: out of gas")));
        }
        Ok(fake_address(contract))
    }

    async fn send(&self, call: &ScriptCall) -> Result<TxHash, ScriptError> {
        let idx = {
            let mut ops = self.ops.lock().unwrap();
            ops.push(FakeOp::Call(call.clone()));
            ops.iter().filter(|op| matches!(op, FakeOp::Call(_))).count() - 1
        };

        let is_proposal = matches!(call, ScriptCall::CreateProposal { .. });
        if self.fail_call == Some(idx) || (self.fail_proposal && is_proposal) {
            return Err(ScriptError::ContractInteraction(format!("{call} reverted")));
        }
        Ok(TxHash::repeat_byte(idx as u8))
    }
}

/// A [`ContractVerifier`] that records every attempt and fails for chosen contracts
#[derive(Default)]
pub struct FakeVerifier {
    /// The names of the contracts verification was attempted for
    attempts: Mutex<Vec<String>>,
    /// The names of the contracts whose verification fails
    failing: Vec<String>,
    /// The names of the contracts reported as already verified
    already_verified: Vec<String>,
}

impl FakeVerifier {
    /// A verifier failing for the given contracts
    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    /// A verifier reporting the given contracts as already verified
    pub fn already_verified(names: &[&str]) -> Self {
        Self {
            already_verified: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    /// The names of the contracts verification was attempted for
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

impl ContractVerifier for FakeVerifier {
    async fn verify(&self, record: &DeploymentRecord) -> Result<VerificationStatus, ScriptError> {
        self.attempts.lock().unwrap().push(record.name.clone());

        if self.failing.contains(&record.name) {
            return Err(ScriptError::Verification(format!(
                "{}: bytecode does not match",
                record.name
            )));
        }
        if self.already_verified.contains(&record.name) {
            return Ok(VerificationStatus::AlreadyVerified);
        }
        Ok(VerificationStatus::Verified)
    }
}
