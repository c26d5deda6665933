//! Loading of compiled contract artifacts and compiler build info
//!
//! Both the forge layout (`out/Name.sol/Name.json`, bytecode under
//! `bytecode.object`) and the hardhat layout
//! (`artifacts/contracts/Name.sol/Name.json`, bytecode as a plain string) are
//! understood.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::primitives::{Address, Bytes};
use serde::Deserialize;
use serde_json::Value;

use crate::{errors::ScriptError, types::LiblockContract};

/// The directory, relative to a hardhat artifacts root, holding contract artifacts
const HARDHAT_CONTRACTS_DIR: &str = "contracts";

/// The bytecode entry of an artifact
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ArtifactBytecode {
    /// Hardhat: a hex string
    Hex(String),
    /// Forge: an object holding the hex string
    Object {
        /// The hex-encoded creation bytecode
        object: String,
    },
}

impl ArtifactBytecode {
    /// The hex-encoded bytecode
    fn hex(&self) -> &str {
        match self {
            ArtifactBytecode::Hex(s) => s,
            ArtifactBytecode::Object { object } => object,
        }
    }
}

/// The metadata settings emitted by solc, of which only the compilation target is used
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct MetadataSettings {
    /// Maps the source path to the contract name
    #[serde(default)]
    compilation_target: BTreeMap<String, String>,
}

/// The solc metadata of an artifact
#[derive(Deserialize, Debug, Default)]
struct ArtifactMetadata {
    /// The compiler settings
    #[serde(default)]
    settings: MetadataSettings,
}

/// The subset of a compiled artifact read by the scripts
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    /// The creation bytecode
    bytecode: ArtifactBytecode,
    /// The source file of the contract (hardhat only)
    source_name: Option<String>,
    /// The solc metadata (forge only)
    metadata: Option<ArtifactMetadata>,
}

/// A compiled contract
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    /// The name of the contract in its source
    pub contract_name: String,
    /// The path of the contract's source file, relative to the project root
    pub source_path: String,
    /// The creation bytecode
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// The fully qualified name `path/To.sol:Name` expected by block explorers
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.source_path, self.contract_name)
    }

    /// The deployment calldata: the creation bytecode followed by the ABI-encoded addresses
    pub fn deploy_code(&self, constructor_args: &[Address]) -> Bytes {
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&encode_constructor_args(constructor_args));
        code.into()
    }
}

/// ABI-encode a list of address constructor arguments
///
/// Addresses are static types, so each is a left-padded 32 byte word
pub fn encode_constructor_args(args: &[Address]) -> Vec<u8> {
    args.iter().flat_map(|a| a.into_word().0).collect()
}

/// Parse an artifact from its JSON content
fn parse_artifact(contract_name: &str, content: &str) -> Result<ContractArtifact, ScriptError> {
    let raw: RawArtifact =
        serde_json::from_str(content).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

    let bytecode = Bytes::from_str(raw.bytecode.hex())
        .map_err(|e| ScriptError::ArtifactParsing(format!("{contract_name}: {e}")))?;
    if bytecode.is_empty() {
        return Err(ScriptError::ArtifactParsing(format!(
            "{contract_name} has no creation bytecode, is it abstract?"
        )));
    }

    let source_path = raw
        .source_name
        .or_else(|| {
            raw.metadata.and_then(|m| {
                m.settings
                    .compilation_target
                    .into_iter()
                    .find(|(_, name)| name == contract_name)
                    .map(|(path, _)| path)
            })
        })
        .unwrap_or_else(|| format!("{HARDHAT_CONTRACTS_DIR}/{contract_name}.sol"));

    Ok(ContractArtifact {
        contract_name: contract_name.to_string(),
        source_path,
        bytecode,
    })
}

/// A directory of compiled artifacts
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    /// The root of the artifacts directory
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store reading from the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The candidate paths of an artifact, in lookup order
    fn candidate_paths(&self, artifact_name: &str) -> [PathBuf; 2] {
        let file_dir = format!("{artifact_name}.sol");
        let file_name = format!("{artifact_name}.json");
        [
            self.root.join(&file_dir).join(&file_name),
            self.root
                .join(HARDHAT_CONTRACTS_DIR)
                .join(&file_dir)
                .join(&file_name),
        ]
    }

    /// Load the artifact of the given contract
    pub fn load(&self, contract: LiblockContract) -> Result<ContractArtifact, ScriptError> {
        let artifact_name = contract.artifact_name();
        let path = self
            .candidate_paths(artifact_name)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| {
                ScriptError::ArtifactParsing(format!(
                    "no artifact for {artifact_name} under {}",
                    self.root.display()
                ))
            })?;

        let content =
            fs::read_to_string(&path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
        parse_artifact(artifact_name, &content)
    }
}

/// The compiler input and version needed to verify a contract
#[derive(Clone, Debug)]
pub struct BuildInfo {
    /// The full compiler version, e.g. `0.8.19+commit.7dd6d404`
    pub solc_long_version: String,
    /// The standard JSON input the contracts were compiled from
    pub input: Value,
}

impl BuildInfo {
    /// Read a hardhat or forge build-info file
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse a build-info document
    pub fn from_json(content: &str) -> Result<Self, ScriptError> {
        let mut value: Value =
            serde_json::from_str(content).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        let solc_long_version = value
            .get("solcLongVersion")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ScriptError::ArtifactParsing("build info has no `solcLongVersion`".to_string())
            })?
            .to_string();

        let input = value
            .get_mut("input")
            .map(Value::take)
            .filter(Value::is_object)
            .ok_or_else(|| ScriptError::ArtifactParsing("build info has no `input`".to_string()))?;

        Ok(Self {
            solc_long_version,
            input,
        })
    }

    /// The compiler version in the `v0.8.19+commit.7dd6d404` form used by explorers
    pub fn compiler_version(&self) -> String {
        if self.solc_long_version.starts_with('v') {
            self.solc_long_version.clone()
        } else {
            format!("v{}", self.solc_long_version)
        }
    }
}
