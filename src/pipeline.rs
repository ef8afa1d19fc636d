//! Orchestration: discovery, loading, comparison, log gluing and publishing.

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::matcher::{self, PatternSet};
use crate::parser::{self, RunBatch, RunTable};
use crate::pivot::{self, MetricKind, PivotedMetric};
use crate::sink::ReportSink;
use crate::table::{self, RunRows};
use crate::timeseries::{self, LogKind, MergedSeries};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A result file that could not be loaded.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ReportError,
}

/// Runs that loaded, and the files that did not.
#[derive(Debug, Default)]
pub struct LoadedBatch {
    pub batch: RunBatch,
    pub failures: Vec<FileFailure>,
}

/// Row tables, common patterns and pivots of a batch.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub tables: Vec<RunRows>,
    pub patterns: PatternSet,
    /// Pivots per metric, in the requested metric order.
    pub pivots: Vec<(MetricKind, Vec<PivotedMetric>)>,
}

impl Comparison {
    /// Projects every run, intersects their patterns and pivots each metric.
    pub fn build(batch: &RunBatch, metrics: &[MetricKind]) -> Result<Self> {
        let tables: Vec<RunRows> = batch.runs().iter().map(table::project).collect();
        let patterns = matcher::common_patterns(&tables)?;
        info!(
            runs = tables.len(),
            patterns = patterns.len(),
            "found patterns common to all runs"
        );

        let pivots = metrics
            .iter()
            .map(|&kind| (kind, pivot::build_pivots(&patterns, &tables, kind)))
            .collect();

        Ok(Self {
            tables,
            patterns,
            pivots,
        })
    }

    pub fn pivots_for(&self, kind: MetricKind) -> Option<&[PivotedMetric]> {
        self.pivots
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p.as_slice())
    }
}

/// A glued log of one job of one run.
#[derive(Debug, Clone)]
pub struct MergedLog {
    pub run_label: String,
    /// Group name, e.g. `seq-read_bw`.
    pub group: String,
    pub job_name: String,
    pub kind: LogKind,
    pub series: MergedSeries,
}

/// Glued logs of one run, and the problems met while gluing them.
#[derive(Debug, Default)]
pub struct LogMergeOutcome {
    pub logs: Vec<MergedLog>,
    pub issues: Vec<ReportError>,
}

/// Everything produced for one batch.
#[derive(Debug)]
pub struct Report {
    pub batch: RunBatch,
    pub failures: Vec<FileFailure>,
    pub comparison: Comparison,
    pub logs: Vec<MergedLog>,
    pub log_issues: Vec<ReportError>,
}

/// Result files in `dir`, sorted by file name.
pub fn discover_result_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ReportError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ReportError::io(dir, e))?.path();
        let is_json = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().contains(".json"));
        if path.is_file() && is_json {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(ReportError::NoInputFiles(dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

/// Parses every file; failures are reported and skipped.
pub fn load_batch(paths: &[PathBuf]) -> LoadedBatch {
    let mut loaded = LoadedBatch::default();
    for path in paths {
        let result = parser::parse_run_file(path).and_then(|run| loaded.batch.push(run));
        if let Err(error) = result {
            warn!(path = %path.display(), %error, "skipping result file");
            loaded.failures.push(FileFailure {
                path: path.clone(),
                error,
            });
        }
    }
    loaded
}

/// Subdirectories of `dir` that hold only `.log` files, keyed by directory name.
pub fn discover_log_dirs(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut dirs = BTreeMap::new();
    let entries = std::fs::read_dir(dir).map_err(|e| ReportError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| ReportError::io(dir, e))?.path();
        if !path.is_dir() {
            continue;
        }

        let mut has_logs = false;
        let mut only_logs = true;
        for inner in std::fs::read_dir(&path).map_err(|e| ReportError::io(&path, e))? {
            let inner = inner.map_err(|e| ReportError::io(&path, e))?.path();
            if inner.is_file() && inner.extension().is_some_and(|ext| ext == "log") {
                has_logs = true;
            } else {
                only_logs = false;
                break;
            }
        }

        if !only_logs {
            warn!(dir = %path.display(), "directory holds files other than .log, not gluing it");
            continue;
        }
        if has_logs {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            dirs.insert(name, path);
        }
    }
    Ok(dirs)
}

/// Glues the worker logs in `dir` for the jobs of `run`.
pub fn merge_run_logs(run: &RunTable, dir: &Path) -> Result<LogMergeOutcome> {
    let groups = timeseries::group_log_files(dir)?;
    let mut outcome = LogMergeOutcome::default();

    for group in &groups {
        let Some((job, kind)) = timeseries::resolve_group(run, &group.name) else {
            warn!(run = %run.label, group = %group.name, "no job of this run writes this log");
            continue;
        };
        match timeseries::merge_group(group) {
            Ok(series) => outcome.logs.push(MergedLog {
                run_label: run.label.clone(),
                group: group.name.clone(),
                job_name: job.job_name.clone(),
                kind,
                series,
            }),
            Err(error) => {
                warn!(run = %run.label, group = %group.name, %error, "could not glue log group");
                outcome.issues.push(error);
            }
        }
    }

    let present: HashSet<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    for job in &run.jobs {
        for (_, name) in LogKind::expected_groups(job) {
            if !present.contains(name.as_str()) {
                warn!(run = %run.label, job = %job.job_name, group = %name, "log file missing");
                outcome.issues.push(ReportError::MissingLogGroup {
                    job: job.job_name.clone(),
                    group: name,
                });
            }
        }
    }

    debug!(run = %run.label, logs = outcome.logs.len(), "glued run logs");
    Ok(outcome)
}

/// Glues the logs of every directory in `dirs` whose name is a run label.
///
/// A directory that cannot be read is recorded as an issue and the others
/// are still merged.
pub fn merge_batch_logs(batch: &RunBatch, dirs: &BTreeMap<String, PathBuf>) -> LogMergeOutcome {
    let mut outcome = LogMergeOutcome::default();
    for (label, dir) in dirs {
        let Some(run) = batch.get(label) else {
            warn!(dir = %dir.display(), "log directory does not match any run");
            continue;
        };
        match merge_run_logs(run, dir) {
            Ok(merged) => {
                outcome.logs.extend(merged.logs);
                outcome.issues.extend(merged.issues);
            }
            Err(error) => {
                warn!(run = %label, dir = %dir.display(), %error, "could not glue run logs");
                outcome.issues.push(error);
            }
        }
    }
    outcome
}

/// Runs discovery, loading, comparison and (optionally) log gluing.
pub fn run(config: &ReportConfig) -> Result<Report> {
    let files = discover_result_files(&config.input_dir)?;
    info!(files = files.len(), dir = %config.input_dir.display(), "loading result files");

    let LoadedBatch { batch, failures } = load_batch(&files);
    if batch.is_empty() {
        return Err(ReportError::NoComparableData);
    }
    let comparison = Comparison::build(&batch, &config.metrics)?;

    let outcome = if config.merge_logs {
        match discover_log_dirs(&config.input_dir) {
            Ok(dirs) => merge_batch_logs(&batch, &dirs),
            Err(error) => {
                warn!(%error, "could not look for log directories");
                LogMergeOutcome {
                    logs: Vec::new(),
                    issues: vec![error],
                }
            }
        }
    } else {
        LogMergeOutcome::default()
    };

    Ok(Report {
        batch,
        failures,
        comparison,
        logs: outcome.logs,
        log_issues: outcome.issues,
    })
}

/// Hands every artifact of `report` to `sink`.
///
/// A failing artifact is logged and does not stop the others; returns the
/// number of artifacts that failed.
pub fn publish(report: &Report, sink: &mut dyn ReportSink) -> usize {
    let mut failed = 0;

    for table in &report.comparison.tables {
        if let Err(error) = sink.write_run_table(table) {
            warn!(run = %table.label, %error, "could not write run table");
            failed += 1;
        }
    }
    let runs: Vec<String> = report
        .comparison
        .tables
        .iter()
        .map(|t| t.label.clone())
        .collect();
    for (kind, pivots) in &report.comparison.pivots {
        if let Err(error) = sink.write_pivots(*kind, &runs, pivots) {
            warn!(metric = %kind, %error, "could not write pivots");
            failed += 1;
        }
    }
    for log in &report.logs {
        if let Err(error) = sink.write_merged_log(log) {
            warn!(run = %log.run_label, group = %log.group, %error, "could not write glued log");
            failed += 1;
        }
    }

    failed
}
