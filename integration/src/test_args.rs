//! Defines arguments passed to each test

use std::str::FromStr;

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use eyre::{eyre, Result};
use scripts::{
    client::Wallet,
    report::Report,
    solidity::{
        ILiblock::{self, ILiblockInstance},
        ILiblocked::{self, ILiblockedInstance},
        IOwnable::{self, IOwnableInstance},
        IProposal::{self, IProposalInstance},
        IRLiblock::{self, IRLiblockInstance},
    },
    types::DeployedContracts,
};

use crate::CliArgs;

/// The arguments provided to each integration test
#[derive(Clone)]
pub(crate) struct TestArgs {
    /// The contracts under test, read from the report
    pub deployed: DeployedContracts,
    /// The signing provider
    pub provider: Wallet,
    /// The signer sending the test transactions
    pub signer: PrivateKeySigner,
}

impl TestArgs {
    /// Build the test arguments from the CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let report = Report::new(&args.report, args.report_format);
        let records = report.read_records(args.batch)?;
        let deployed = DeployedContracts::from_records(&records)?;

        let signer = PrivateKeySigner::from_str(&args.pkey)?;
        let provider = setup_wallet(&args.rpc_url, signer.clone())?;

        Ok(Self {
            deployed,
            provider,
            signer,
        })
    }

    /// Get the address of the wallet
    pub fn wallet_addr(&self) -> Address {
        self.signer.address()
    }

    // --- Contracts --- //

    /// The LIB token
    pub fn liblock(&self) -> ILiblockInstance<Wallet, Ethereum> {
        ILiblock::new(self.deployed.liblock, self.provider.clone())
    }

    /// The rLIB token
    pub fn rliblock(&self) -> IRLiblockInstance<Wallet, Ethereum> {
        IRLiblock::new(self.deployed.rliblock, self.provider.clone())
    }

    /// The staking contract
    pub fn stacking(&self) -> ILiblockedInstance<Wallet, Ethereum> {
        ILiblocked::new(self.deployed.stacking, self.provider.clone())
    }

    /// The proposal contract
    pub fn proposal(&self) -> IProposalInstance<Wallet, Ethereum> {
        IProposal::new(self.deployed.proposal, self.provider.clone())
    }

    /// An ownable view of the contract at the given address
    pub fn ownable(&self, addr: Address) -> IOwnableInstance<Wallet, Ethereum> {
        IOwnable::new(addr, self.provider.clone())
    }

    // --- Balances --- //

    /// Get the LIB balance of the given address
    pub async fn lib_balance(&self, addr: Address) -> Result<U256> {
        let balance = self.liblock().balanceOf(addr).call().await?;
        Ok(balance)
    }
}

/// Setup a provider for tests
fn setup_wallet(rpc_url: &str, pkey: PrivateKeySigner) -> Result<Wallet> {
    let url = Url::parse(rpc_url).map_err(|e| eyre!("invalid RPC url {rpc_url}: {e}"))?;
    let provider = ProviderBuilder::new().wallet(pkey).connect_http(url);
    Ok(DynProvider::new(provider))
}
