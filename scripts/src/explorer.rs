//! A client for the Etherscan-compatible verification API
//!
//! Verification is a two step exchange: the source is submitted with
//! `verifysourcecode`, which answers with a request GUID, then the request is
//! polled with `checkverifystatus` until the explorer decides.

use std::time::Duration;

use alloy::primitives::hex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    artifacts::{encode_constructor_args, ArtifactStore, BuildInfo, ContractArtifact},
    config::ExplorerConfig,
    constants::{
        EXPLORER_CHECK_STATUS_ACTION, EXPLORER_CODE_FORMAT, EXPLORER_CONTRACT_MODULE,
        EXPLORER_VERIFY_ACTION, VERIFICATION_POLL_ATTEMPTS, VERIFICATION_POLL_INTERVAL,
    },
    errors::ScriptError,
    report::DeploymentRecord,
    types::LiblockContract,
    verification::{ContractVerifier, VerificationStatus},
};

/// The `status` field of a successful explorer response
const STATUS_OK: &str = "1";

/// The envelope of every explorer API response
#[derive(Deserialize, Debug)]
struct ExplorerResponse {
    /// `"1"` on success, `"0"` otherwise
    status: String,
    /// A short status message
    #[serde(default)]
    message: String,
    /// The payload, a GUID or a human-readable status
    #[serde(default)]
    result: Value,
}

impl ExplorerResponse {
    /// Parse a response body
    fn parse(body: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(body).map_err(|e| {
            ScriptError::Verification(format!("invalid explorer response `{}`: {e}", body.trim()))
        })
    }

    /// The result rendered as text
    fn result_text(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            Value::Null => self.message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the explorer reports the contract as verified already
    fn is_already_verified(&self) -> bool {
        self.result_text().to_lowercase().contains("already verified")
    }
}

/// The answer to a verification submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The request was queued under the given GUID
    Queued(String),
    /// The explorer already holds the contract's source
    AlreadyVerified,
}

/// Interpret the response to a `verifysourcecode` request
pub fn parse_submit_response(body: &str) -> Result<SubmitOutcome, ScriptError> {
    let response = ExplorerResponse::parse(body)?;
    if response.is_already_verified() {
        return Ok(SubmitOutcome::AlreadyVerified);
    }

    let result = response.result_text();
    if response.status != STATUS_OK || result.is_empty() {
        return Err(ScriptError::Verification(format!("submission rejected: {result}")));
    }
    Ok(SubmitOutcome::Queued(result))
}

/// The state of a queued verification request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollStatus {
    /// The request has not been processed yet
    Pending,
    /// The source was accepted
    Verified,
    /// The explorer already held the contract's source
    AlreadyVerified,
    /// The source was rejected, with the explorer's reason
    Failed(String),
}

/// Interpret the response to a `checkverifystatus` request
pub fn classify_status(body: &str) -> Result<PollStatus, ScriptError> {
    let response = ExplorerResponse::parse(body)?;
    if response.is_already_verified() {
        return Ok(PollStatus::AlreadyVerified);
    }

    let result = response.result_text();
    let lower = result.to_lowercase();
    let status = if lower.contains("pending") || lower.contains("in queue") {
        PollStatus::Pending
    } else if response.status == STATUS_OK || lower.starts_with("pass") {
        PollStatus::Verified
    } else {
        PollStatus::Failed(result)
    };
    Ok(status)
}

/// Build the form fields of a `verifysourcecode` request
pub fn submit_params(
    api_key: &str,
    record: &DeploymentRecord,
    artifact: &ContractArtifact,
    build_info: &BuildInfo,
) -> Result<Vec<(&'static str, String)>, ScriptError> {
    let source_code = serde_json::to_string(&build_info.input)
        .map_err(|e| ScriptError::Verification(e.to_string()))?;

    let mut params = vec![
        ("apikey", api_key.to_string()),
        ("module", EXPLORER_CONTRACT_MODULE.to_string()),
        ("action", EXPLORER_VERIFY_ACTION.to_string()),
        ("contractaddress", format!("{:#x}", record.address)),
        ("sourceCode", source_code),
        ("codeformat", EXPLORER_CODE_FORMAT.to_string()),
        ("contractname", artifact.qualified_name()),
        ("compilerversion", build_info.compiler_version()),
    ];

    // The misspelling is the API's own
    if !record.args.is_empty() {
        params.push((
            "constructorArguements",
            hex::encode(encode_constructor_args(&record.args)),
        ));
    }

    Ok(params)
}

/// A [`ContractVerifier`] submitting sources to an Etherscan-compatible explorer
pub struct EtherscanVerifier {
    /// The HTTP client
    http: Client,
    /// The explorer endpoint and key
    explorer: ExplorerConfig,
    /// The artifacts the contract names are resolved from
    artifacts: ArtifactStore,
    /// The compiler input submitted for every contract
    build_info: BuildInfo,
    /// The interval between two status polls
    poll_interval: Duration,
}

impl EtherscanVerifier {
    /// Create a verifier for the given explorer
    pub fn new(
        explorer: ExplorerConfig,
        artifacts: ArtifactStore,
        build_info: BuildInfo,
    ) -> Result<Self, ScriptError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

        Ok(Self {
            http,
            explorer,
            artifacts,
            build_info,
            poll_interval: VERIFICATION_POLL_INTERVAL,
        })
    }

    /// The browser URL of a contract
    pub fn contract_url(&self, record: &DeploymentRecord) -> String {
        format!(
            "{}/address/{:#x}#code",
            self.explorer.browser_url.trim_end_matches('/'),
            record.address
        )
    }

    /// Send a request and return its body, failing on a non-success HTTP status
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ScriptError> {
        let response = request
            .send()
            .await
            .map_err(|e| ScriptError::Verification(format!("explorer unreachable: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;

        if !status.is_success() {
            return Err(ScriptError::Verification(format!(
                "explorer returned {status}: {}",
                body.trim()
            )));
        }
        Ok(body)
    }

    /// Submit a contract's source
    async fn submit(&self, record: &DeploymentRecord) -> Result<SubmitOutcome, ScriptError> {
        let contract = record.name.parse::<LiblockContract>()?;
        let artifact = self.artifacts.load(contract)?;
        let params = submit_params(&self.explorer.api_key, record, &artifact, &self.build_info)?;

        debug!("submitting {} as {}", record.name, artifact.qualified_name());
        let request = self.http.post(&self.explorer.api_url).form(&params);
        parse_submit_response(&self.send(request).await?)
    }

    /// Poll a queued request until the explorer decides
    async fn poll(&self, guid: &str) -> Result<VerificationStatus, ScriptError> {
        for attempt in 1..=VERIFICATION_POLL_ATTEMPTS {
            tokio::time::sleep(self.poll_interval).await;

            let request = self.http.get(&self.explorer.api_url).query(&[
                ("apikey", self.explorer.api_key.as_str()),
                ("module", EXPLORER_CONTRACT_MODULE),
                ("action", EXPLORER_CHECK_STATUS_ACTION),
                ("guid", guid),
            ]);

            match classify_status(&self.send(request).await?)? {
                PollStatus::Pending => debug!("request {guid} pending (attempt {attempt})"),
                PollStatus::Verified => return Ok(VerificationStatus::Verified),
                PollStatus::AlreadyVerified => return Ok(VerificationStatus::AlreadyVerified),
                PollStatus::Failed(reason) => return Err(ScriptError::Verification(reason)),
            }
        }

        Err(ScriptError::Verification(format!(
            "request {guid} still pending after {VERIFICATION_POLL_ATTEMPTS} polls"
        )))
    }
}

impl ContractVerifier for EtherscanVerifier {
    async fn verify(&self, record: &DeploymentRecord) -> Result<VerificationStatus, ScriptError> {
        let status = match self.submit(record).await? {
            SubmitOutcome::AlreadyVerified => VerificationStatus::AlreadyVerified,
            SubmitOutcome::Queued(guid) => self.poll(&guid).await?,
        };

        info!("{} source available at {}", record.name, self.contract_url(record));
        Ok(status)
    }
}
