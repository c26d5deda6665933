//! Tests for the cross-contract wiring done after deployment

use eyre::{ensure, Result};
use scripts::types::LiblockContract;

use crate::{integration_test, test_args::TestArgs};

/// Test that admin rights were handed to the staking contract
async fn test_ownership_transferred(args: TestArgs) -> Result<()> {
    let stacking = args.deployed.stacking;
    for contract in [
        LiblockContract::RLiblock,
        LiblockContract::Distributor,
        LiblockContract::Proposal,
    ] {
        let owner = args.ownable(args.deployed.address(contract)).owner().call().await?;
        ensure!(
            owner == stacking,
            "{contract} is owned by {owner:#x}, expected {stacking:#x}"
        );
    }

    Ok(())
}
integration_test!(test_ownership_transferred);
