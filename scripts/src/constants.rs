//! Constants used in the deploy scripts

use std::time::Duration;

/// The default path of the deployment report, relative to the working directory
pub const DEFAULT_REPORT_PATH: &str = "reports/report.csv";

/// The default path of the JSON-lines deployment report
pub const DEFAULT_JSONL_REPORT_PATH: &str = "reports/report.jsonl";

/// The default directory holding compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "out";

/// The line closing a batch of deployment records in the CSV report
pub const REPORT_SENTINEL: &str = "- * - * -";

/// The separator between a contract name and its addresses in the CSV report
pub const REPORT_NAME_SEPARATOR: char = ':';

/// The separator between addresses in the CSV report
pub const REPORT_ADDRESS_SEPARATOR: char = ',';

/// The marker written for a verified contract in the CSV report
pub const VERIFIED_MARKER: &str = "Verified";

/// The marker written for a contract that failed verification in the CSV report
pub const NOT_VERIFIED_MARKER: &str = "Not Verified";

/// The version written with every JSON-lines report entry
pub const JSON_REPORT_VERSION: u32 = 1;

/// The number of decimals of the Liblock token
pub const LIBLOCK_DECIMALS: u8 = 18;

/// The amount of LIB, in whole tokens, sent to each bootstrap recipient
pub const BOOTSTRAP_TRANSFER_AMOUNT: &str = "100";

/// The amount of LIB, in whole tokens, the staking contract is approved to spend
pub const BOOTSTRAP_APPROVE_AMOUNT: &str = "1000";

/// The amount of LIB, in whole tokens, locked for 17 days
pub const BOOTSTRAP_LOCK17_AMOUNT: &str = "400";

/// The amount of LIB, in whole tokens, locked for 186 days
pub const BOOTSTRAP_LOCK186_AMOUNT: &str = "600";

/// The title of the proposal created during bootstrap
pub const BOOTSTRAP_PROPOSAL_TITLE: &str = "First test prop";

/// The body of the proposal created during bootstrap
pub const BOOTSTRAP_PROPOSAL_TEXT: &str = "Mock text for testing purposes";

/// The gas limit used when creating a proposal, which is not estimated
pub const PROPOSAL_GAS_LIMIT: u64 = 500_000;

/// The `module` parameter of the explorer's contract endpoints
pub const EXPLORER_CONTRACT_MODULE: &str = "contract";

/// The explorer action submitting source code for verification
pub const EXPLORER_VERIFY_ACTION: &str = "verifysourcecode";

/// The explorer action polling a verification request
pub const EXPLORER_CHECK_STATUS_ACTION: &str = "checkverifystatus";

/// The code format used when submitting a standard JSON compiler input
pub const EXPLORER_CODE_FORMAT: &str = "solidity-standard-json-input";

/// The number of times a pending verification request is polled
pub const VERIFICATION_POLL_ATTEMPTS: usize = 10;

/// The interval between two polls of a pending verification request
pub const VERIFICATION_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// The default RPC URL of a local development node
pub const LOCALHOST_RPC_URL: &str = "http://127.0.0.1:8545";

/// The name of the environment variable holding the deployer's private key
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// The name of the environment variable holding the Etherscan API key
pub const ETHERSCAN_API_KEY_ENV_VAR: &str = "ETHERSCAN_API_KEY";

/// The API key accepted by Blockscout explorers, which do not check it
pub const BLOCKSCOUT_API_KEY: &str = "dummy";
