//! Network profiles and the explicit context the scripts run with

use std::{
    env,
    fmt::{self, Display},
};

use clap::ValueEnum;

use crate::{
    constants::{
        BLOCKSCOUT_API_KEY, ETHERSCAN_API_KEY_ENV_VAR, LOCALHOST_RPC_URL, PRIVATE_KEY_ENV_VAR,
    },
    errors::ScriptError,
};

/// The networks the contracts are deployed to
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Network {
    /// A local development node
    Localhost,
    /// The Goerli testnet
    Goerli,
    /// Scroll mainnet
    Scroll,
    /// The Scroll Sepolia testnet
    ScrollSepolia,
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Localhost => write!(f, "localhost"),
            Network::Goerli => write!(f, "goerli"),
            Network::Scroll => write!(f, "scroll"),
            Network::ScrollSepolia => write!(f, "scroll-sepolia"),
        }
    }
}

/// Where the API key of an explorer comes from
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ApiKeySource {
    /// Read from the named environment variable
    Env(&'static str),
    /// A fixed key, for explorers which do not check it
    Fixed(&'static str),
}

/// The block explorer of a network
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExplorerProfile {
    /// The Etherscan-compatible API endpoint
    pub api_url: &'static str,
    /// The human-facing explorer URL
    pub browser_url: &'static str,
    /// Where the API key comes from
    pub api_key: ApiKeySource,
}

impl Network {
    /// The chain ID of the network
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Localhost => 1337,
            Network::Goerli => 5,
            Network::Scroll => 534352,
            Network::ScrollSepolia => 534351,
        }
    }

    /// The environment variable holding the network's RPC URL, if it has no fixed one
    pub fn rpc_url_env_var(&self) -> Option<&'static str> {
        match self {
            Network::Localhost => None,
            Network::Goerli => Some("GOERLI_RPC_URL"),
            Network::Scroll => Some("SCROLL_RPC_URL"),
            Network::ScrollSepolia => Some("SCROLL_SEPOLIA_RPC_URL"),
        }
    }

    /// The network's block explorer, if it has one
    pub fn explorer(&self) -> Option<ExplorerProfile> {
        match self {
            Network::Localhost => None,
            Network::Goerli => Some(ExplorerProfile {
                api_url: "https://api-goerli.etherscan.io/api",
                browser_url: "https://goerli.etherscan.io/",
                api_key: ApiKeySource::Env(ETHERSCAN_API_KEY_ENV_VAR),
            }),
            Network::Scroll => Some(ExplorerProfile {
                api_url: "https://blockscout.scroll.io/api",
                browser_url: "https://blockscout.scroll.io/",
                api_key: ApiKeySource::Fixed(BLOCKSCOUT_API_KEY),
            }),
            Network::ScrollSepolia => Some(ExplorerProfile {
                api_url: "https://sepolia-blockscout.scroll.io/api",
                browser_url: "https://sepolia-blockscout.scroll.io/",
                api_key: ApiKeySource::Fixed(BLOCKSCOUT_API_KEY),
            }),
        }
    }
}

/// The explorer settings resolved for a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// The Etherscan-compatible API endpoint
    pub api_url: String,
    /// The human-facing explorer URL
    pub browser_url: String,
    /// The API key
    pub api_key: String,
}

/// Everything a command needs to reach the network, passed explicitly
#[derive(Clone)]
pub struct ScriptContext {
    /// The target network
    pub network: Network,
    /// The RPC endpoint
    pub rpc_url: String,
    /// The deployer's private key, absent for commands which do not sign
    pub priv_key: Option<String>,
    /// The explorer settings, if the network has an explorer
    pub explorer: Option<ExplorerConfig>,
}

impl fmt::Debug for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptContext")
            .field("network", &self.network)
            .field("rpc_url", &self.rpc_url)
            .field("priv_key", &"<redacted>")
            .field("explorer", &self.explorer.as_ref().map(|e| &e.api_url))
            .finish()
    }
}

impl ScriptContext {
    /// Resolve the context for a network
    ///
    /// Explicit values take precedence over the network profile's environment
    /// variables; `lookup` reads an environment variable
    pub fn resolve(
        network: Network,
        rpc_url: Option<String>,
        priv_key: Option<String>,
        explorer_api_key: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ScriptError> {
        let rpc_url = match (rpc_url, network.rpc_url_env_var()) {
            (Some(url), _) => url,
            (None, None) => LOCALHOST_RPC_URL.to_string(),
            (None, Some(var)) => lookup(var).ok_or_else(|| {
                ScriptError::Config(format!("no RPC URL for {network}, set `{var}` or --rpc-url"))
            })?,
        };

        let explorer = network.explorer().map(|profile| {
            let api_key = explorer_api_key
                .or_else(|| match profile.api_key {
                    ApiKeySource::Env(var) => lookup(var),
                    ApiKeySource::Fixed(key) => Some(key.to_string()),
                })
                .unwrap_or_default();

            ExplorerConfig {
                api_url: profile.api_url.to_string(),
                browser_url: profile.browser_url.to_string(),
                api_key,
            }
        });

        Ok(Self {
            network,
            rpc_url,
            priv_key,
            explorer,
        })
    }

    /// Resolve the context from the process environment
    pub fn from_env(
        network: Network,
        rpc_url: Option<String>,
        priv_key: Option<String>,
        explorer_api_key: Option<String>,
    ) -> Result<Self, ScriptError> {
        Self::resolve(network, rpc_url, priv_key, explorer_api_key, |var| {
            env::var(var).ok().filter(|v| !v.is_empty())
        })
    }

    /// The deployer's private key, failing if none was given
    pub fn priv_key(&self) -> Result<&str, ScriptError> {
        self.priv_key.as_deref().ok_or_else(|| {
            ScriptError::Config(format!("no private key, set `{PRIVATE_KEY_ENV_VAR}` or --priv-key"))
        })
    }

    /// The explorer settings, failing if the network has no explorer or no API key
    pub fn explorer(&self) -> Result<&ExplorerConfig, ScriptError> {
        let explorer = self.explorer.as_ref().ok_or_else(|| {
            ScriptError::Config(format!("{} has no block explorer", self.network))
        })?;

        if explorer.api_key.is_empty() {
            return Err(ScriptError::Config(format!(
                "no explorer API key for {}, set `{ETHERSCAN_API_KEY_ENV_VAR}`",
                self.network
            )));
        }
        Ok(explorer)
    }
}
