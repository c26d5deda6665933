//! Initial token distribution, locking and proposal creation on a fresh deployment

use alloy::primitives::{utils::parse_units, Address, U256};
use tracing::{info, warn};

use crate::{
    client::DeployClient,
    constants::{
        BOOTSTRAP_APPROVE_AMOUNT, BOOTSTRAP_LOCK17_AMOUNT, BOOTSTRAP_LOCK186_AMOUNT,
        BOOTSTRAP_PROPOSAL_TEXT, BOOTSTRAP_PROPOSAL_TITLE, BOOTSTRAP_TRANSFER_AMOUNT,
        LIBLOCK_DECIMALS,
    },
    errors::ScriptError,
    types::{DeployedContracts, ScriptCall},
};

/// Convert an amount of whole LIB into base units
pub fn parse_lib(amount: &str) -> Result<U256, ScriptError> {
    parse_units(amount, LIBLOCK_DECIMALS)
        .map(|units| units.get_absolute())
        .map_err(|e| {
            ScriptError::CalldataConstruction(format!("invalid LIB amount `{amount}`: {e}"))
        })
}

/// The proposal created at the end of the bootstrap
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalDraft {
    /// The proposal title
    pub title: String,
    /// The proposal body
    pub text: String,
}

impl Default for ProposalDraft {
    fn default() -> Self {
        Self {
            title: BOOTSTRAP_PROPOSAL_TITLE.to_string(),
            text: BOOTSTRAP_PROPOSAL_TEXT.to_string(),
        }
    }
}

/// The parameters of a bootstrap run, with amounts in base units
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapPlan {
    /// The accounts receiving an initial LIB transfer
    pub recipients: Vec<Address>,
    /// The amount sent to each recipient
    pub transfer_amount: U256,
    /// The amount the staking contract is approved to spend
    pub approve_amount: U256,
    /// The amount locked for 17 days
    pub lock17_amount: U256,
    /// The amount locked for 186 days
    pub lock186_amount: U256,
    /// The proposal to create, if any
    pub proposal: Option<ProposalDraft>,
}

impl BootstrapPlan {
    /// The default plan sending the default amount to the given recipients
    pub fn new(recipients: Vec<Address>) -> Result<Self, ScriptError> {
        Ok(Self {
            recipients,
            transfer_amount: parse_lib(BOOTSTRAP_TRANSFER_AMOUNT)?,
            approve_amount: parse_lib(BOOTSTRAP_APPROVE_AMOUNT)?,
            lock17_amount: parse_lib(BOOTSTRAP_LOCK17_AMOUNT)?,
            lock186_amount: parse_lib(BOOTSTRAP_LOCK186_AMOUNT)?,
            proposal: Some(ProposalDraft::default()),
        })
    }

    /// The calls every bootstrap must complete, in the order they are sent
    pub fn mandatory_calls(&self, deployed: &DeployedContracts) -> Vec<ScriptCall> {
        let transfers = self.recipients.iter().map(|to| ScriptCall::Transfer {
            token: deployed.liblock,
            to: *to,
            amount: self.transfer_amount,
        });

        transfers
            .chain([
                ScriptCall::Approve {
                    token: deployed.liblock,
                    spender: deployed.stacking,
                    amount: self.approve_amount,
                },
                ScriptCall::Lock17 {
                    stacking: deployed.stacking,
                    amount: self.lock17_amount,
                },
                ScriptCall::Lock186 {
                    stacking: deployed.stacking,
                    amount: self.lock186_amount,
                },
            ])
            .collect()
    }

    /// The proposal creation call, if the plan creates a proposal
    pub fn proposal_call(&self, deployed: &DeployedContracts) -> Option<ScriptCall> {
        self.proposal.as_ref().map(|draft| ScriptCall::CreateProposal {
            proposal: deployed.proposal,
            title: draft.title.clone(),
            text: draft.text.clone(),
        })
    }
}

/// The outcome of a bootstrap run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootstrapSummary {
    /// The number of mandatory calls confirmed
    pub calls_sent: usize,
    /// Whether the proposal was created
    pub proposal_created: bool,
}

/// Distribute, approve and lock LIB, then create the first proposal
///
/// A failure of any call but the proposal creation aborts the bootstrap. A
/// failed proposal creation is logged and reported in the summary.
pub async fn bootstrap(
    client: &impl DeployClient,
    deployed: &DeployedContracts,
    plan: &BootstrapPlan,
) -> Result<BootstrapSummary, ScriptError> {
    let mut summary = BootstrapSummary::default();
    for call in plan.mandatory_calls(deployed) {
        let tx_hash = client.send(&call).await?;
        info!("{call} confirmed in {tx_hash:#x}");
        summary.calls_sent += 1;
    }

    let Some(call) = plan.proposal_call(deployed) else {
        info!("skipping proposal creation");
        return Ok(summary);
    };

    match client.send(&call).await {
        Ok(tx_hash) => {
            info!("{call} confirmed in {tx_hash:#x}");
            summary.proposal_created = true;
        }
        Err(e) => warn!("proposal creation failed: {e}"),
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, U256};

    use crate::{
        test_helpers::{dummy_deployment, FakeClient},
        types::ScriptCall,
    };

    use super::{bootstrap, parse_lib, BootstrapPlan};

    /// One LIB in base units
    fn one_lib() -> U256 {
        U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_parse_lib() {
        assert_eq!(parse_lib("1").unwrap(), one_lib());
        assert_eq!(parse_lib("400").unwrap(), one_lib() * U256::from(400u64));
        assert!(parse_lib("four hundred").is_err());
    }

    #[tokio::test]
    async fn test_bootstrap_call_order() {
        let client = FakeClient::default();
        let deployed = dummy_deployment();
        let recipients = vec![Address::repeat_byte(0x1), Address::repeat_byte(0x2)];
        let plan = BootstrapPlan::new(recipients.clone()).unwrap();

        let summary = bootstrap(&client, &deployed, &plan).await.unwrap();
        assert_eq!(summary.calls_sent, 5);
        assert!(summary.proposal_created);

        let calls = client.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(
            calls[0],
            ScriptCall::Transfer {
                token: deployed.liblock,
                to: recipients[0],
                amount: one_lib() * U256::from(100u64),
            }
        );
        assert_eq!(
            calls[2],
            ScriptCall::Approve {
                token: deployed.liblock,
                spender: deployed.stacking,
                amount: one_lib() * U256::from(1000u64),
            }
        );
        assert!(matches!(calls[3], ScriptCall::Lock17 { .. }));
        assert!(matches!(calls[4], ScriptCall::Lock186 { .. }));
        match &calls[5] {
            ScriptCall::CreateProposal { proposal, title, .. } => {
                assert_eq!(*proposal, deployed.proposal);
                assert_eq!(title, "First test prop");
            }
            other => panic!("unexpected call {other}"),
        }
    }

    #[tokio::test]
    async fn test_proposal_failure_is_not_fatal() {
        let client = FakeClient::failing_proposal();
        let plan = BootstrapPlan::new(vec![]).unwrap();

        let summary = bootstrap(&client, &dummy_deployment(), &plan).await.unwrap();
        assert_eq!(summary.calls_sent, 3);
        assert!(!summary.proposal_created);
    }

    #[tokio::test]
    async fn test_mandatory_failure_stops_bootstrap() {
        // The approval is the first call without recipients
        let client = FakeClient::failing_call(0);
        let plan = BootstrapPlan::new(vec![]).unwrap();

        assert!(bootstrap(&client, &dummy_deployment(), &plan).await.is_err());
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_skip_proposal() {
        let client = FakeClient::default();
        let plan = BootstrapPlan {
            proposal: None,
            ..BootstrapPlan::new(vec![]).unwrap()
        };

        let summary = bootstrap(&client, &dummy_deployment(), &plan).await.unwrap();
        assert!(!summary.proposal_created);
        assert!(!client
            .calls()
            .iter()
            .any(|c| matches!(c, ScriptCall::CreateProposal { .. })));
    }
}
