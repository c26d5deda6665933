//! Utilities for the deploy scripts.

use std::str::FromStr;

use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use tracing::{info, warn};

use crate::{
    artifacts::ArtifactStore,
    client::ChainClient,
    config::{Network, ScriptContext},
    errors::ScriptError,
};

/// Sets up the signing client for the context's network, checking that the
/// remote chain matches the network profile.
pub async fn setup_client(
    ctx: &ScriptContext,
    artifacts: ArtifactStore,
) -> Result<ChainClient, ScriptError> {
    let signer = PrivateKeySigner::from_str(ctx.priv_key()?)
        .map_err(|e| ScriptError::ClientInitialization(format!("invalid private key: {e}")))?;
    let sender = signer.address();

    let url = Url::parse(&ctx.rpc_url)
        .map_err(|e| ScriptError::ClientInitialization(format!("{}: {e}", ctx.rpc_url)))?;
    let provider = DynProvider::new(ProviderBuilder::new().wallet(signer).connect_http(url));

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    check_chain_id(ctx.network, chain_id)?;

    info!("connected to {} (chain {chain_id}) as {sender:#x}", ctx.network);
    Ok(ChainClient::new(provider, sender, artifacts))
}

/// Check the remote chain ID against the network profile
///
/// Local nodes run with varying chain IDs, so a mismatch on localhost only warns
pub fn check_chain_id(network: Network, chain_id: u64) -> Result<(), ScriptError> {
    if chain_id == network.chain_id() {
        return Ok(());
    }

    if network == Network::Localhost {
        warn!("localhost node reports chain {chain_id}, expected {}", network.chain_id());
        return Ok(());
    }

    Err(ScriptError::ClientInitialization(format!(
        "RPC endpoint serves chain {chain_id}, {network} is chain {}",
        network.chain_id()
    )))
}

#[cfg(test)]
mod tests {
    use crate::config::Network;

    use super::check_chain_id;

    #[test]
    fn test_check_chain_id() {
        assert!(check_chain_id(Network::Goerli, 5).is_ok());
        assert!(check_chain_id(Network::Scroll, 534351).is_err());
        assert!(check_chain_id(Network::Localhost, 31337).is_ok());
    }
}
