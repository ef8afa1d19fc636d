//! Decoding of fio result documents into [`RunTable`]s.

use crate::error::{ReportError, Result};
use crate::schema::{FioReport, GlobalOptions, JobResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One parsed result document: a single benchmark session.
#[derive(Debug, Clone)]
pub struct RunTable {
    /// File name of the source document without its extension.
    pub label: String,
    pub source: PathBuf,
    pub fio_version: String,
    pub time: String,
    pub global_options: GlobalOptions,
    /// Jobs in document order.
    pub jobs: Vec<JobResult>,
}

/// Returns the `{ ... }` span of `input`, from the first `{` to the last `}`.
///
/// fio may print banners or warnings around the JSON object; those are dropped.
pub fn locate_json_span(input: &[u8]) -> Option<&[u8]> {
    let begin = input.iter().position(|&b| b == b'{')?;
    let end = input.iter().rposition(|&b| b == b'}')?;
    if begin >= end {
        return None;
    }
    Some(&input[begin..=end])
}

/// Decodes a result document held in memory.
pub fn parse_document(input: &[u8], label: &str, source: &Path) -> Result<RunTable> {
    let span = locate_json_span(input)
        .ok_or_else(|| ReportError::malformed(source, "no JSON object found"))?;
    let report: FioReport = serde_json::from_slice(span)
        .map_err(|e| ReportError::malformed(source, format!("invalid JSON: {}", e)))?;

    debug!(
        run = label,
        jobs = report.jobs.len(),
        version = %report.fio_version,
        "parsed result document"
    );

    Ok(RunTable {
        label: label.to_string(),
        source: source.to_path_buf(),
        fio_version: report.fio_version,
        time: report.time,
        global_options: report.global_options,
        jobs: report.jobs,
    })
}

/// Reads and decodes one result file. The run label is the file stem.
pub fn parse_run_file(path: &Path) -> Result<RunTable> {
    let data = std::fs::read(path).map_err(|e| ReportError::io(path, e))?;
    parse_document(&data, &run_label(path), path)
}

/// File name with its extension removed (`"ssd-a.json"` -> `"ssd-a"`).
pub fn run_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Runs being compared, in load order, with unique labels.
#[derive(Debug, Clone, Default)]
pub struct RunBatch {
    runs: Vec<RunTable>,
}

impl RunBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a run, rejecting a label already present in the batch.
    pub fn push(&mut self, run: RunTable) -> Result<()> {
        if self.runs.iter().any(|r| r.label == run.label) {
            return Err(ReportError::DuplicateRunLabel(run.label));
        }
        self.runs.push(run);
        Ok(())
    }

    pub fn runs(&self) -> &[RunTable] {
        &self.runs
    }

    pub fn get(&self, label: &str) -> Option<&RunTable> {
        self.runs.iter().find(|r| r.label == label)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
