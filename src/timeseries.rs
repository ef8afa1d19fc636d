//! fio time-series logs (`write_bw_log`, `write_iops_log`, `write_lat_log`).
//!
//! A job with `numjobs > 1` writes one log per worker, e.g. `seq-read_bw.1.log`
//! and `seq-read_bw.2.log`. Those are grouped by the name before the first `.`
//! and glued into a single series by summing values sample by sample.

use crate::error::{ReportError, Result};
use crate::parser::RunTable;
use crate::schema::JobResult;
use crate::table::corrected_mbps;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One log line: `time (ms), value, direction (0 read, 1 write, 2 trim)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSample {
    pub time_ms: i64,
    pub value: i64,
    pub op_type: u8,
}

/// Sum of parallel worker logs of one job, as long as the shortest of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedSeries {
    pub samples: Vec<LogSample>,
}

impl MergedSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn values(&self) -> Vec<i64> {
        self.samples.iter().map(|s| s.value).collect()
    }
}

/// Parses log text. Unparsable or missing numeric fields read as 0 since fio
/// can leave a partial last line behind.
pub fn parse_log(text: &str) -> Vec<LogSample> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.split(',').map(str::trim);
            let time_ms = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
            let value = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
            let op_type = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
            LogSample {
                time_ms,
                value,
                op_type,
            }
        })
        .collect()
}

/// Reads and parses a log file. Bytes that are not UTF-8 end up in fields
/// that read as 0 instead of failing the file.
pub fn read_log(path: &Path) -> Result<Vec<LogSample>> {
    let bytes = std::fs::read(path).map_err(|e| ReportError::io(path, e))?;
    Ok(parse_log(&String::from_utf8_lossy(&bytes)))
}

/// Sums `series` into the first one, truncated to the shortest series.
///
/// Times and directions are taken from the first series unchanged.
pub fn merge_series(series: &[Vec<LogSample>]) -> MergedSeries {
    let Some((base, rest)) = series.split_first() else {
        return MergedSeries::default();
    };
    let len = series.iter().map(Vec::len).min().unwrap_or(0);

    let mut samples = base[..len].to_vec();
    for other in rest {
        for (sample, extra) in samples.iter_mut().zip(other) {
            sample.value += extra.value;
        }
    }
    MergedSeries { samples }
}

/// Writes `series` in fio's log format with the trailing column fixed at 0.
pub fn write_series<W: Write>(series: &MergedSeries, mut writer: W) -> std::io::Result<()> {
    for s in &series.samples {
        writeln!(writer, "{}, {}, {}, 0", s.time_ms, s.value, s.op_type)?;
    }
    writer.flush()
}

/// Log files of one logical job and log type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroup {
    /// File name up to the first `.`, e.g. `seq-read_bw`.
    pub name: String,
    /// Worker logs sorted by file name.
    pub files: Vec<PathBuf>,
}

/// Groups the `.log` files directly inside `dir` by name stem.
pub fn group_log_files(dir: &Path) -> Result<Vec<LogGroup>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ReportError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ReportError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "log") {
            files.push(path);
        }
    }
    files.sort();

    let mut groups: Vec<LogGroup> = Vec::new();
    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = file_name.split('.').next().unwrap_or_default().to_string();
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.files.push(path),
            None => groups.push(LogGroup {
                name,
                files: vec![path],
            }),
        }
    }
    groups.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(groups)
}

/// Reads every file of `group` and glues them together.
pub fn merge_group(group: &LogGroup) -> Result<MergedSeries> {
    let series = group
        .files
        .iter()
        .map(|path| read_log(path))
        .collect::<Result<Vec<_>>>()?;
    let merged = merge_series(&series);
    debug!(
        group = %group.name,
        files = group.files.len(),
        samples = merged.len(),
        "merged log group"
    );
    Ok(merged)
}

/// Type of a log, encoded as the suffix of its group name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Bandwidth,
    Iops,
    Latency,
    CompletionLatency,
    SubmissionLatency,
}

impl LogKind {
    pub const ALL: [LogKind; 5] = [
        LogKind::Bandwidth,
        LogKind::Iops,
        LogKind::Latency,
        LogKind::CompletionLatency,
        LogKind::SubmissionLatency,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            LogKind::Bandwidth => "_bw",
            LogKind::Iops => "_iops",
            LogKind::Latency => "_lat",
            LogKind::CompletionLatency => "_clat",
            LogKind::SubmissionLatency => "_slat",
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            LogKind::Bandwidth => "MB/s",
            LogKind::Iops => "IOPS",
            _ => "Nanoseconds",
        }
    }

    /// Prefix of chart image names, also the per-type output directory.
    pub fn image_prefix(self) -> &'static str {
        match self {
            LogKind::Bandwidth => "bw",
            LogKind::Iops => "iops",
            LogKind::Latency => "lat",
            LogKind::CompletionLatency => "clat",
            LogKind::SubmissionLatency => "slat",
        }
    }

    /// The job option that names this log's prefix.
    fn prefix_option(self, job: &JobResult) -> Option<&str> {
        match self {
            LogKind::Bandwidth => job.options.bw_log.as_deref(),
            LogKind::Iops => job.options.iops_log.as_deref(),
            _ => job.options.lat_log.as_deref(),
        }
    }

    /// Group name this kind of log has for `job`, if the job writes it.
    pub fn group_name(self, job: &JobResult) -> Option<String> {
        let prefix = self.prefix_option(job)?;
        let base = Path::new(prefix).file_name()?.to_string_lossy();
        if base.is_empty() {
            return None;
        }
        Some(format!("{}{}", base, self.suffix()))
    }

    /// Group names announced by the log options of `job`.
    pub fn expected_groups(job: &JobResult) -> Vec<(LogKind, String)> {
        LogKind::ALL
            .into_iter()
            .filter_map(|kind| kind.group_name(job).map(|name| (kind, name)))
            .collect()
    }

    /// Value to plot for a raw sample: bandwidth in calibrated MB/s, other kinds as-is.
    pub fn chart_value(self, raw: i64) -> f64 {
        match self {
            LogKind::Bandwidth => corrected_mbps(raw as f64 / 1024.0),
            _ => raw as f64,
        }
    }
}

/// Chart points of a merged series: seconds on x, [`LogKind::chart_value`] on y.
pub fn chart_points(series: &MergedSeries, kind: LogKind) -> Vec<(f64, f64)> {
    series
        .samples
        .iter()
        .map(|s| ((s.time_ms / 1000) as f64, kind.chart_value(s.value)))
        .collect()
}

/// Finds the job and log type a group of `run` belongs to.
pub fn resolve_group<'a>(run: &'a RunTable, group_name: &str) -> Option<(&'a JobResult, LogKind)> {
    run.jobs.iter().find_map(|job| {
        LogKind::expected_groups(job)
            .into_iter()
            .find(|(_, name)| name == group_name)
            .map(|(kind, _)| (job, kind))
    })
}
