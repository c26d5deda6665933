//! Tests for locking LIB in the staking contract

use eyre::{ensure, Result};
use scripts::{
    bootstrap::parse_lib,
    client::send_tx,
    constants::{BOOTSTRAP_APPROVE_AMOUNT, BOOTSTRAP_LOCK17_AMOUNT, BOOTSTRAP_LOCK186_AMOUNT},
};

use crate::{integration_test, test_args::TestArgs};

/// Test approving the staking contract and locking LIB for both durations
async fn test_lock(args: TestArgs) -> Result<()> {
    let approve_amount = parse_lib(BOOTSTRAP_APPROVE_AMOUNT)?;
    let lock17_amount = parse_lib(BOOTSTRAP_LOCK17_AMOUNT)?;
    let lock186_amount = parse_lib(BOOTSTRAP_LOCK186_AMOUNT)?;

    let my_addr = args.wallet_addr();
    let balance_before = args.lib_balance(my_addr).await?;
    ensure!(
        balance_before >= approve_amount,
        "wallet holds {balance_before} LIB base units, needs {approve_amount}"
    );

    let liblock = args.liblock();
    let stacking = args.stacking();
    send_tx(liblock.approve(args.deployed.stacking, approve_amount)).await?;
    send_tx(stacking.lock17(lock17_amount)).await?;
    send_tx(stacking.lock186(lock186_amount)).await?;

    let balance_after = args.lib_balance(my_addr).await?;
    let locked = lock17_amount + lock186_amount;
    ensure!(
        balance_after == balance_before - locked,
        "balance went from {balance_before} to {balance_after} after locking {locked}"
    );

    Ok(())
}
integration_test!(test_lock);
