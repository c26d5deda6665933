//! Type definitions used throughout the scripts

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use alloy::primitives::{Address, U256};
use clap::ValueEnum;

use crate::{errors::ScriptError, report::DeploymentRecord};

/// The contracts managed by the scripts, in deployment order
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiblockContract {
    /// The LIB base token
    Liblock,
    /// The rLIB receipt token, minted against locked LIB
    #[value(name = "rliblock")]
    RLiblock,
    /// The governance proposal contract
    Proposal,
    /// The rewards distributor
    Distributor,
    /// The staking contract
    Stacking,
}

impl LiblockContract {
    /// All contracts, in the order in which they must be deployed
    pub const ALL: [LiblockContract; 5] = [
        LiblockContract::Liblock,
        LiblockContract::RLiblock,
        LiblockContract::Proposal,
        LiblockContract::Distributor,
        LiblockContract::Stacking,
    ];

    /// The name under which the contract is recorded in the report
    pub fn report_name(&self) -> &'static str {
        match self {
            LiblockContract::Liblock => "Liblock",
            LiblockContract::RLiblock => "rLiblock",
            LiblockContract::Proposal => "Proposal",
            LiblockContract::Distributor => "Distributor",
            LiblockContract::Stacking => "Stacking",
        }
    }

    /// The name of the contract's compiled artifact
    pub fn artifact_name(&self) -> &'static str {
        match self {
            LiblockContract::Liblock => "Liblock",
            LiblockContract::RLiblock => "rLiblock",
            LiblockContract::Proposal => "gProposal",
            LiblockContract::Distributor => "Distributor",
            LiblockContract::Stacking => "Liblocked",
        }
    }

    /// The contracts whose addresses are passed to this contract's constructor, in order
    pub fn dependencies(&self) -> &'static [LiblockContract] {
        match self {
            LiblockContract::Liblock | LiblockContract::RLiblock => &[],
            LiblockContract::Proposal => &[LiblockContract::Liblock, LiblockContract::RLiblock],
            LiblockContract::Distributor => &[LiblockContract::Liblock],
            LiblockContract::Stacking => &[
                LiblockContract::Liblock,
                LiblockContract::RLiblock,
                LiblockContract::Distributor,
            ],
        }
    }
}

impl Display for LiblockContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report_name())
    }
}

impl FromStr for LiblockContract {
    type Err = ScriptError;

    /// Parses a report name or an artifact name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LiblockContract::ALL
            .into_iter()
            .find(|c| c.report_name() == s || c.artifact_name() == s)
            .ok_or_else(|| ScriptError::ReadReport(format!("unknown contract name `{s}`")))
    }
}

/// The addresses of one full deployment of the contracts
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeployedContracts {
    /// The address of the LIB token
    pub liblock: Address,
    /// The address of the rLIB token
    pub rliblock: Address,
    /// The address of the proposal contract
    pub proposal: Address,
    /// The address of the distributor
    pub distributor: Address,
    /// The address of the staking contract
    pub stacking: Address,
}

impl DeployedContracts {
    /// The address of the given contract
    pub fn address(&self, contract: LiblockContract) -> Address {
        match contract {
            LiblockContract::Liblock => self.liblock,
            LiblockContract::RLiblock => self.rliblock,
            LiblockContract::Proposal => self.proposal,
            LiblockContract::Distributor => self.distributor,
            LiblockContract::Stacking => self.stacking,
        }
    }

    /// The constructor arguments used when deploying the given contract
    pub fn constructor_args(&self, contract: LiblockContract) -> Vec<Address> {
        contract
            .dependencies()
            .iter()
            .map(|dep| self.address(*dep))
            .collect()
    }

    /// The report records of this deployment, in deployment order
    pub fn records(&self) -> Vec<DeploymentRecord> {
        LiblockContract::ALL
            .into_iter()
            .map(|contract| DeploymentRecord {
                name: contract.report_name().to_string(),
                address: self.address(contract),
                args: self.constructor_args(contract),
            })
            .collect()
    }

    /// Rebuild a deployment from report records
    ///
    /// Every contract must be present; records with unknown names are an error
    pub fn from_records(records: &[DeploymentRecord]) -> Result<Self, ScriptError> {
        let mut addresses: [Option<Address>; 5] = [None; 5];
        for record in records {
            let contract = record.name.parse::<LiblockContract>()?;
            addresses[contract as usize] = Some(record.address);
        }

        let get = |contract: LiblockContract| {
            addresses[contract as usize].ok_or_else(|| {
                ScriptError::ReadReport(format!("no `{contract}` record in report batch"))
            })
        };

        Ok(DeployedContracts {
            liblock: get(LiblockContract::Liblock)?,
            rliblock: get(LiblockContract::RLiblock)?,
            proposal: get(LiblockContract::Proposal)?,
            distributor: get(LiblockContract::Distributor)?,
            stacking: get(LiblockContract::Stacking)?,
        })
    }
}

/// A state-changing contract call issued by the scripts
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptCall {
    /// `Liblock.setDistributor(distributor)`
    SetDistributor {
        /// The token contract
        token: Address,
        /// The distributor to register
        distributor: Address,
    },
    /// `transferOwnership(new_owner)` on an ownable contract
    TransferOwnership {
        /// The contract whose ownership is transferred
        contract: LiblockContract,
        /// The address of that contract
        target: Address,
        /// The new owner
        new_owner: Address,
    },
    /// `Liblock.transfer(to, amount)`
    Transfer {
        /// The token contract
        token: Address,
        /// The recipient
        to: Address,
        /// The amount, in base units
        amount: U256,
    },
    /// `Liblock.approve(spender, amount)`
    Approve {
        /// The token contract
        token: Address,
        /// The approved spender
        spender: Address,
        /// The amount, in base units
        amount: U256,
    },
    /// `Liblocked.lock17(amount)`
    Lock17 {
        /// The staking contract
        stacking: Address,
        /// The amount, in base units
        amount: U256,
    },
    /// `Liblocked.lock186(amount)`
    Lock186 {
        /// The staking contract
        stacking: Address,
        /// The amount, in base units
        amount: U256,
    },
    /// `gProposal.createProposal(title, text)`
    CreateProposal {
        /// The proposal contract
        proposal: Address,
        /// The proposal title
        title: String,
        /// The proposal body
        text: String,
    },
}

impl Display for ScriptCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptCall::SetDistributor { distributor, .. } => {
                write!(f, "Liblock.setDistributor({distributor})")
            }
            ScriptCall::TransferOwnership {
                contract,
                new_owner,
                ..
            } => write!(f, "{contract}.transferOwnership({new_owner})"),
            ScriptCall::Transfer { to, amount, .. } => {
                write!(f, "Liblock.transfer({to}, {amount})")
            }
            ScriptCall::Approve {
                spender, amount, ..
            } => write!(f, "Liblock.approve({spender}, {amount})"),
            ScriptCall::Lock17 { amount, .. } => write!(f, "Stacking.lock17({amount})"),
            ScriptCall::Lock186 { amount, .. } => write!(f, "Stacking.lock186({amount})"),
            ScriptCall::CreateProposal { title, .. } => {
                write!(f, "Proposal.createProposal({title:?})")
            }
        }
    }
}
