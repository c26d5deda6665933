//! Verification of every contract of a deployment batch

use tracing::{error, info};

use crate::{
    errors::ScriptError,
    report::{DeploymentRecord, VerificationResult},
};

/// The successful outcomes of a verification request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VerificationStatus {
    /// The explorer accepted the submitted source
    Verified,
    /// The explorer already held the contract's source
    AlreadyVerified,
}

/// A block explorer able to verify deployed contracts
#[allow(async_fn_in_trait)]
pub trait ContractVerifier {
    /// Submit the source of a recorded contract, returning once the explorer has decided
    async fn verify(&self, record: &DeploymentRecord) -> Result<VerificationStatus, ScriptError>;
}

/// Verify every record in order
///
/// A failure is logged and recorded as unverified; the next record is always
/// attempted
pub async fn verify_records(
    verifier: &impl ContractVerifier,
    records: &[DeploymentRecord],
) -> Vec<VerificationResult> {
    let mut results = Vec::with_capacity(records.len());
    for record in records {
        let verified = match verifier.verify(record).await {
            Ok(VerificationStatus::Verified) => {
                info!("{} verified at {:#x}", record.name, record.address);
                true
            }
            Ok(VerificationStatus::AlreadyVerified) => {
                info!("{} already verified at {:#x}", record.name, record.address);
                true
            }
            Err(e) => {
                error!("failed to verify {}: {e}", record.name);
                false
            }
        };

        results.push(VerificationResult {
            name: record.name.clone(),
            verified,
        });
    }

    results
}
