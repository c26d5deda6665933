//! The append-only deployment report
//!
//! Deployments are appended as a batch of records closed by a batch marker,
//! and verification results for a batch are appended after it. Two encodings
//! are supported: the line-oriented CSV format
//!
//! ```text
//! Liblock:0xA..
//! Proposal:0xC..,0xA..,0xB..
//! - * - * -
//! Liblock: Verified
//! ```
//!
//! and a versioned JSON-lines format with one tagged object per line.

use std::{
    fmt::{self, Display},
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::primitives::Address;
use clap::ValueEnum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    constants::{
        JSON_REPORT_VERSION, NOT_VERIFIED_MARKER, REPORT_ADDRESS_SEPARATOR, REPORT_NAME_SEPARATOR,
        REPORT_SENTINEL, VERIFIED_MARKER,
    },
    errors::ScriptError,
};

/// A deployed contract, as recorded in the report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentRecord {
    /// The name of the contract
    pub name: String,
    /// The address the contract was deployed at
    pub address: Address,
    /// The addresses passed to the contract's constructor
    pub args: Vec<Address>,
}

/// The outcome of verifying a recorded contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    /// The name of the contract
    pub name: String,
    /// Whether the explorer accepted the contract's source
    pub verified: bool,
}

/// The records of one deployment, followed by the results of verifying them
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportBatch {
    /// The deployment records, in the order they were written
    pub records: Vec<DeploymentRecord>,
    /// Verification results for the batch
    ///
    /// JSON-lines results name their batch. CSV result lines carry no batch
    /// index, so they are attached to the batch preceding them in the file
    pub results: Vec<VerificationResult>,
    /// Whether the batch was closed by a batch marker
    pub closed: bool,
}

impl ReportBatch {
    /// Whether nothing has been read into the batch
    fn is_empty(&self) -> bool {
        self.records.is_empty() && self.results.is_empty()
    }
}

/// The encoding of the report file
#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// `Name:Address,Arg1,Arg2` lines closed by a sentinel line
    #[default]
    Csv,
    /// One versioned JSON object per line
    Jsonl,
}

/// Which batch of the report to read
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BatchSelector {
    /// The first batch in the file
    #[default]
    First,
    /// The last batch in the file
    Latest,
    /// The batch at the given zero-based index
    Index(usize),
}

impl FromStr for BatchSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(BatchSelector::First),
            "latest" => Ok(BatchSelector::Latest),
            _ => s
                .parse::<usize>()
                .map(BatchSelector::Index)
                .map_err(|_| format!("expected `first`, `latest` or an index, got `{s}`")),
        }
    }
}

impl Display for BatchSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchSelector::First => write!(f, "first"),
            BatchSelector::Latest => write!(f, "latest"),
            BatchSelector::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A handle to the report file
#[derive(Clone, Debug)]
pub struct Report {
    /// The path of the report file
    path: PathBuf,
    /// The encoding of the report file
    format: ReportFormat,
}

impl Report {
    /// Create a handle to the report at the given path
    pub fn new(path: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// The path of the report file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a full deployment batch, closing it with a batch marker
    ///
    /// The batch is written with a single append, so that the file never
    /// holds a partial batch written by this process
    pub fn append_batch(&self, records: &[DeploymentRecord]) -> Result<(), ScriptError> {
        let content = match self.format {
            ReportFormat::Csv => encode_csv_batch(records),
            ReportFormat::Jsonl => encode_jsonl_batch(records)?,
        };
        self.append(&content)
    }

    /// Append verification results for the batch at index `batch`
    pub fn append_results(
        &self,
        batch: usize,
        results: &[VerificationResult],
    ) -> Result<(), ScriptError> {
        let content = match self.format {
            ReportFormat::Csv => encode_csv_results(results),
            ReportFormat::Jsonl => encode_jsonl_results(batch, results)?,
        };
        self.append(&content)
    }

    /// Parse every batch in the report
    pub fn read_batches(&self) -> Result<Vec<ReportBatch>, ScriptError> {
        self.parse(None)
    }

    /// Parse the report, stopping once the batch at index `until` is closed
    ///
    /// Lines after that batch's marker are never parsed
    fn parse(&self, until: Option<usize>) -> Result<Vec<ReportBatch>, ScriptError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            ScriptError::ReadReport(format!("{}: {}", self.path.display(), e))
        })?;

        match self.format {
            ReportFormat::Csv => parse_csv(&content, until),
            ReportFormat::Jsonl => parse_jsonl(&content, until),
        }
    }

    /// Read the deployment records of the selected batch
    pub fn read_records(
        &self,
        selector: BatchSelector,
    ) -> Result<Vec<DeploymentRecord>, ScriptError> {
        self.read_batch(selector).map(|(_, batch)| batch.records)
    }

    /// Read the selected batch along with its index in the report
    pub fn read_batch(&self, selector: BatchSelector) -> Result<(usize, ReportBatch), ScriptError> {
        // Only the latest batch needs the whole file
        let until = match selector {
            BatchSelector::First => Some(0),
            BatchSelector::Latest => None,
            BatchSelector::Index(i) => Some(i),
        };
        let mut batches = self.parse(until)?;
        let num_batches = batches.len();
        let idx = until.unwrap_or(num_batches.saturating_sub(1));

        if idx >= num_batches {
            return Err(ScriptError::ReadReport(format!(
                "batch {selector} not found, {} holds {num_batches} batches",
                self.path.display()
            )));
        }

        debug!("reading batch {idx} of {num_batches} from {}", self.path.display());
        Ok((idx, batches.swap_remove(idx)))
    }

    /// Append raw content to the report, creating it and its directory if needed
    fn append(&self, content: &str) -> Result<(), ScriptError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ScriptError::WriteReport(e.to_string()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ScriptError::WriteReport(format!("{}: {}", self.path.display(), e)))?;

        file.write_all(content.as_bytes())
            .map_err(|e| ScriptError::WriteReport(e.to_string()))
    }
}

// -------
// | CSV |
// -------

/// Encode a batch of records as CSV lines followed by the sentinel
fn encode_csv_batch(records: &[DeploymentRecord]) -> String {
    let mut content = String::new();
    for record in records {
        content.push_str(&record.name);
        content.push(REPORT_NAME_SEPARATOR);
        content.push_str(
            &std::iter::once(&record.address)
                .chain(&record.args)
                .join(&REPORT_ADDRESS_SEPARATOR.to_string()),
        );
        content.push('\n');
    }
    content.push_str(REPORT_SENTINEL);
    content.push('\n');
    content
}

/// Encode verification results as `Name: Verified` lines
fn encode_csv_results(results: &[VerificationResult]) -> String {
    results
        .iter()
        .map(|r| {
            let marker = if r.verified {
                VERIFIED_MARKER
            } else {
                NOT_VERIFIED_MARKER
            };
            format!("{}{REPORT_NAME_SEPARATOR} {marker}\n", r.name)
        })
        .collect()
}

/// A single line of the CSV report
enum CsvLine {
    /// A deployment record
    Record(DeploymentRecord),
    /// A verification result
    Result(VerificationResult),
}

/// Parse a single non-blank, non-sentinel line of the CSV report
fn parse_csv_line(line: &str, line_no: usize) -> Result<CsvLine, ScriptError> {
    let (name, rest) = line.split_once(REPORT_NAME_SEPARATOR).ok_or_else(|| {
        ScriptError::ReadReport(format!("line {line_no}: missing `{REPORT_NAME_SEPARATOR}`"))
    })?;
    let name = name.trim().to_string();
    let rest = rest.trim();

    if rest == VERIFIED_MARKER || rest == NOT_VERIFIED_MARKER {
        return Ok(CsvLine::Result(VerificationResult {
            name,
            verified: rest == VERIFIED_MARKER,
        }));
    }

    let mut addresses = rest
        .split(REPORT_ADDRESS_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Address::from_str(s).map_err(|e| {
                ScriptError::ReadReport(format!("line {line_no}: invalid address `{s}`: {e}"))
            })
        });

    let address = addresses.next().ok_or_else(|| {
        ScriptError::ReadReport(format!("line {line_no}: no address for `{name}`"))
    })??;
    let args = addresses.collect::<Result<Vec<_>, _>>()?;

    Ok(CsvLine::Record(DeploymentRecord {
        name,
        address,
        args,
    }))
}

/// Whether the batch at index `until` has been closed
fn reached(batches: &[ReportBatch], until: Option<usize>) -> bool {
    until.is_some_and(|idx| batches.len() > idx)
}

/// Parse a CSV report into batches, stopping at the sentinel closing batch `until`
///
/// Blank lines are skipped, and a trailing batch without a sentinel ends at
/// the end of the file
fn parse_csv(content: &str, until: Option<usize>) -> Result<Vec<ReportBatch>, ScriptError> {
    let mut batches = Vec::new();
    let mut current = ReportBatch::default();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == REPORT_SENTINEL {
            current.closed = true;
            batches.push(std::mem::take(&mut current));
            if reached(&batches, until) {
                return Ok(batches);
            }
            continue;
        }

        match parse_csv_line(line, idx + 1)? {
            CsvLine::Record(record) => current.records.push(record),
            CsvLine::Result(result) => attach_result(&mut batches, &mut current, result),
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }
    Ok(batches)
}

/// Attach a verification result to the batch it follows
fn attach_result(
    batches: &mut [ReportBatch],
    current: &mut ReportBatch,
    result: VerificationResult,
) {
    match batches.last_mut() {
        Some(last) if current.records.is_empty() => last.results.push(result),
        _ => current.results.push(result),
    }
}

// ---------------
// | JSON Lines |
// ---------------

/// A single line of the JSON-lines report
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
struct JsonEntry {
    /// The version of the entry's schema
    version: u32,
    /// The entry itself
    #[serde(flatten)]
    body: JsonBody,
}

/// The kinds of entries in the JSON-lines report
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JsonBody {
    /// A deployment record
    Deployment {
        /// The name of the contract
        name: String,
        /// The address of the contract
        address: Address,
        /// The constructor arguments
        args: Vec<Address>,
    },
    /// The end of a deployment batch
    BatchEnd,
    /// A verification result
    Verification {
        /// The index of the verified batch
        #[serde(default, skip_serializing_if = "Option::is_none")]
        batch: Option<usize>,
        /// The name of the contract
        name: String,
        /// Whether the contract was verified
        verified: bool,
    },
}

/// Serialize entries as newline-terminated JSON objects
fn encode_jsonl(entries: impl IntoIterator<Item = JsonBody>) -> Result<String, ScriptError> {
    let mut content = String::new();
    for body in entries {
        let entry = JsonEntry {
            version: JSON_REPORT_VERSION,
            body,
        };
        let line =
            serde_json::to_string(&entry).map_err(|e| ScriptError::WriteReport(e.to_string()))?;
        content.push_str(&line);
        content.push('\n');
    }
    Ok(content)
}

/// Encode a batch of records as JSON lines followed by a batch end entry
fn encode_jsonl_batch(records: &[DeploymentRecord]) -> Result<String, ScriptError> {
    let entries = records
        .iter()
        .map(|r| JsonBody::Deployment {
            name: r.name.clone(),
            address: r.address,
            args: r.args.clone(),
        })
        .chain(std::iter::once(JsonBody::BatchEnd));
    encode_jsonl(entries)
}

/// Encode verification results for a batch as JSON lines
fn encode_jsonl_results(
    batch: usize,
    results: &[VerificationResult],
) -> Result<String, ScriptError> {
    encode_jsonl(results.iter().map(|r| JsonBody::Verification {
        batch: Some(batch),
        name: r.name.clone(),
        verified: r.verified,
    }))
}

/// Parse a JSON-lines report into batches, stopping at the end of batch `until`
fn parse_jsonl(content: &str, until: Option<usize>) -> Result<Vec<ReportBatch>, ScriptError> {
    let mut batches = Vec::new();
    let mut current = ReportBatch::default();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry: JsonEntry = serde_json::from_str(line)
            .map_err(|e| ScriptError::ReadReport(format!("line {}: {}", idx + 1, e)))?;
        if entry.version != JSON_REPORT_VERSION {
            return Err(ScriptError::ReadReport(format!(
                "line {}: unsupported report version {}",
                idx + 1,
                entry.version
            )));
        }

        match entry.body {
            JsonBody::Deployment {
                name,
                address,
                args,
            } => current.records.push(DeploymentRecord {
                name,
                address,
                args,
            }),
            JsonBody::BatchEnd => {
                current.closed = true;
                batches.push(std::mem::take(&mut current));
                if reached(&batches, until) {
                    return Ok(batches);
                }
            }
            JsonBody::Verification {
                batch,
                name,
                verified,
            } => {
                let result = VerificationResult { name, verified };
                match batch {
                    None => attach_result(&mut batches, &mut current, result),
                    Some(i) if i < batches.len() => batches[i].results.push(result),
                    Some(i) if i == batches.len() => current.results.push(result),
                    Some(i) => {
                        return Err(ScriptError::ReadReport(format!(
                            "line {}: result for batch {i} precedes it",
                            idx + 1
                        )))
                    }
                }
            }
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use alloy::primitives::Address;
    use tempfile::tempdir;

    use crate::{constants::REPORT_SENTINEL, test_helpers::dummy_deployment};

    use super::{
        BatchSelector, DeploymentRecord, Report, ReportFormat, VerificationResult,
    };

    /// Create a report inside a fresh temporary directory
    fn temp_report(format: ReportFormat) -> (tempfile::TempDir, Report) {
        let dir = tempdir().unwrap();
        let report = Report::new(dir.path().join("reports").join("report"), format);
        (dir, report)
    }

    #[test]
    fn test_csv_scenario_lines() {
        let (_dir, report) = temp_report(ReportFormat::Csv);
        let deployment = dummy_deployment();
        report.append_batch(&deployment.records()).unwrap();

        let (a, b, c, d, e) = (
            deployment.liblock,
            deployment.rliblock,
            deployment.proposal,
            deployment.distributor,
            deployment.stacking,
        );
        let expected = format!(
            "Liblock:{a}\nrLiblock:{b}\nProposal:{c},{a},{b}\nDistributor:{d},{a}\nStacking:{e},{a},{b},{d}\n{REPORT_SENTINEL}\n"
        );
        assert_eq!(fs::read_to_string(report.path()).unwrap(), expected);
    }

    #[test]
    fn test_read_n_records_in_order() {
        let (_dir, report) = temp_report(ReportFormat::Csv);
        let records: Vec<DeploymentRecord> = (1..=7u8)
            .map(|i| DeploymentRecord {
                name: format!("Contract{i}"),
                address: Address::repeat_byte(i),
                args: (0..i % 3).map(|j| Address::repeat_byte(0x10 + j)).collect(),
            })
            .collect();
        report.append_batch(&records).unwrap();

        let read = report.read_records(BatchSelector::First).unwrap();
        assert_eq!(read, records);
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let (_dir, report) = temp_report(ReportFormat::Jsonl);
        let records = dummy_deployment().records();
        report.append_batch(&records).unwrap();

        assert_eq!(report.read_records(BatchSelector::First).unwrap(), records);
    }

    #[test]
    fn test_missing_sentinel_reads_to_eof() {
        let (_dir, report) = temp_report(ReportFormat::Csv);
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        fs::create_dir_all(report.path().parent().unwrap()).unwrap();
        fs::write(report.path(), format!("Liblock:{a}\n\nDistributor:{b},{a}")).unwrap();

        let batches = report.read_batches().unwrap();
        assert_eq!(batches.len(), 1);
        assert!(!batches[0].closed);
        assert_eq!(batches[0].records.len(), 2);
        assert_eq!(batches[0].records[1].args, vec![a]);
    }

    #[test]
    fn test_first_batch_stops_at_sentinel() {
        let (_dir, report) = temp_report(ReportFormat::Csv);
        let first = dummy_deployment().records();
        let second = vec![DeploymentRecord {
            name: "Liblock".to_string(),
            address: Address::repeat_byte(0x42),
            args: vec![],
        }];
        report.append_batch(&first).unwrap();
        report.append_batch(&second).unwrap();

        assert_eq!(report.read_records(BatchSelector::First).unwrap(), first);
        assert_eq!(report.read_records(BatchSelector::Latest).unwrap(), second);
        assert_eq!(report.read_records(BatchSelector::Index(1)).unwrap(), second);
        assert!(report.read_records(BatchSelector::Index(2)).is_err());
    }

    #[test]
    fn test_results_not_read_as_records() {
        for format in [ReportFormat::Csv, ReportFormat::Jsonl] {
            let (_dir, report) = temp_report(format);
            let records = dummy_deployment().records();
            let results = vec![
                VerificationResult {
                    name: "Liblock".to_string(),
                    verified: true,
                },
                VerificationResult {
                    name: "rLiblock".to_string(),
                    verified: false,
                },
            ];
            report.append_batch(&records).unwrap();
            report.append_results(0, &results).unwrap();
            report.append_batch(&records).unwrap();

            let batches = report.read_batches().unwrap();
            assert_eq!(batches.len(), 2);
            assert_eq!(batches[0].records, records);
            assert_eq!(batches[0].results, results);
            assert_eq!(batches[1].records, records);
            assert!(batches[1].results.is_empty());
        }
    }

    #[test]
    fn test_first_batch_ignores_lines_after_its_sentinel() {
        let (_dir, report) = temp_report(ReportFormat::Csv);
        let records = dummy_deployment().records();
        report.append_batch(&records).unwrap();
        let mut file = fs::OpenOptions::new().append(true).open(report.path()).unwrap();
        writeln!(file, "Liblock Address,0x0101010101010101010101010101010101010101").unwrap();
        writeln!(file, "{REPORT_SENTINEL}").unwrap();

        assert_eq!(report.read_records(BatchSelector::First).unwrap(), records);
        assert_eq!(report.read_records(BatchSelector::Index(0)).unwrap(), records);
        assert!(report.read_records(BatchSelector::Latest).is_err());
        assert!(report.read_batches().is_err());
    }

    #[test]
    fn test_jsonl_first_batch_ignores_lines_after_its_end() {
        let (_dir, report) = temp_report(ReportFormat::Jsonl);
        let records = dummy_deployment().records();
        report.append_batch(&records).unwrap();
        let mut file = fs::OpenOptions::new().append(true).open(report.path()).unwrap();
        writeln!(file, "{{\"version\":2,\"kind\":\"batch_end\"}}").unwrap();

        assert_eq!(report.read_records(BatchSelector::First).unwrap(), records);
        assert!(report.read_records(BatchSelector::Index(1)).is_err());
    }

    #[test]
    fn test_jsonl_results_attach_to_verified_batch() {
        let (_dir, report) = temp_report(ReportFormat::Jsonl);
        let first = dummy_deployment().records();
        let second = vec![DeploymentRecord {
            name: "Liblock".to_string(),
            address: Address::repeat_byte(0x42),
            args: vec![],
        }];
        let results = vec![VerificationResult {
            name: "Liblock".to_string(),
            verified: true,
        }];
        report.append_batch(&first).unwrap();
        report.append_batch(&second).unwrap();

        let (idx, batch) = report.read_batch(BatchSelector::First).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(batch.records, first);
        report.append_results(idx, &results).unwrap();

        let batches = report.read_batches().unwrap();
        assert_eq!(batches[0].results, results);
        assert!(batches[1].results.is_empty());
    }

    #[test]
    fn test_jsonl_result_before_its_batch_rejected() {
        let (_dir, report) = temp_report(ReportFormat::Jsonl);
        report
            .append_results(
                3,
                &[VerificationResult {
                    name: "Liblock".to_string(),
                    verified: true,
                }],
            )
            .unwrap();

        assert!(report.read_batches().is_err());
    }

    #[test]
    fn test_csv_results_format() {
        let (_dir, report) = temp_report(ReportFormat::Csv);
        report
            .append_results(0, &[
                VerificationResult {
                    name: "Liblock".to_string(),
                    verified: true,
                },
                VerificationResult {
                    name: "Stacking".to_string(),
                    verified: false,
                },
            ])
            .unwrap();

        assert_eq!(
            fs::read_to_string(report.path()).unwrap(),
            "Liblock: Verified\nStacking: Not Verified\n"
        );
    }

    #[test]
    fn test_malformed_lines_rejected() {
        let (_dir, report) = temp_report(ReportFormat::Csv);
        fs::create_dir_all(report.path().parent().unwrap()).unwrap();

        fs::write(report.path(), "Liblock 0x1234\n").unwrap();
        assert!(report.read_batches().is_err());

        fs::write(report.path(), "Liblock:not-an-address\n").unwrap();
        assert!(report.read_batches().is_err());
    }

    #[test]
    fn test_jsonl_unknown_version_rejected() {
        let (_dir, report) = temp_report(ReportFormat::Jsonl);
        fs::create_dir_all(report.path().parent().unwrap()).unwrap();
        fs::write(report.path(), "{\"version\":2,\"kind\":\"batch_end\"}\n").unwrap();

        assert!(report.read_batches().is_err());
    }

    #[test]
    fn test_batch_selector_parse() {
        assert_eq!("first".parse::<BatchSelector>().unwrap(), BatchSelector::First);
        assert_eq!("latest".parse::<BatchSelector>().unwrap(), BatchSelector::Latest);
        assert_eq!("3".parse::<BatchSelector>().unwrap(), BatchSelector::Index(3));
        assert!("last".parse::<BatchSelector>().is_err());
    }
}
