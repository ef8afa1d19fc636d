//! Result document types for fio's `--output-format=json`.
//!
//! Every field defaults when absent and unknown fields are ignored, so
//! documents from older and newer fio releases decode into the same model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percentile label for the p99 completion latency, exactly as fio prints it.
pub const P99_LABEL: &str = "99.000000";

/// Top-level fio result document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FioReport {
    /// fio release that wrote the document (`"fio version"`).
    #[serde(rename = "fio version")]
    pub fio_version: String,
    /// Unix timestamp of the run.
    pub timestamp: u64,
    /// Human-readable run time.
    pub time: String,
    #[serde(rename = "global options")]
    pub global_options: GlobalOptions,
    /// Jobs in the order fio ran them.
    pub jobs: Vec<JobResult>,
}

/// Options from the `[global]` section of the job file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalOptions {
    /// I/O engine, e.g. `libaio`.
    pub ioengine: String,
    /// Per-job file size, e.g. `4G`.
    pub size: String,
    /// `"1"` for O_DIRECT.
    pub direct: String,
    /// Runtime limit in seconds.
    pub runtime: String,
    /// Averaging window of time-series logs, in ms.
    pub log_avg_msec: String,
}

/// One job of a result document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobResult {
    /// Job section name (`jobname`).
    #[serde(rename = "jobname")]
    pub job_name: String,
    /// Reporting group (`groupid`).
    #[serde(rename = "groupid")]
    pub group_id: i64,
    /// Options of the job section (`job options`).
    #[serde(rename = "job options")]
    pub options: JobOptions,
    pub read: OperationMetrics,
    pub write: OperationMetrics,
    pub trim: OperationMetrics,
    /// Job runtime in ms.
    pub job_runtime: u64,
    /// User CPU, percent.
    pub usr_cpu: f64,
    /// System CPU, percent.
    pub sys_cpu: f64,
}

/// Per-job options. fio reports every option value as a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOptions {
    /// Access mode: `read`, `randwrite`, `randrw`, ...
    pub rw: String,
    /// Block size as written in the job file, e.g. `4k`.
    pub bs: String,
    /// Queue depth.
    pub iodepth: String,
    /// Parallel workers of the job.
    pub numjobs: String,
    /// Log prefix from `write_bw_log`.
    #[serde(rename = "write_bw_log", skip_serializing_if = "Option::is_none")]
    pub bw_log: Option<String>,
    /// Log prefix from `write_iops_log`.
    #[serde(rename = "write_iops_log", skip_serializing_if = "Option::is_none")]
    pub iops_log: Option<String>,
    /// Log prefix from `write_lat_log`; covers `lat`, `clat` and `slat` logs.
    #[serde(rename = "write_lat_log", skip_serializing_if = "Option::is_none")]
    pub lat_log: Option<String>,
}

/// I/O direction a set of metrics belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
    Trim,
}

impl Direction {
    /// The direction whose metrics describe a job running in access mode `rw`.
    ///
    /// Pure read modes select read metrics; every other mode (including mixed
    /// `rw`/`randrw`) selects write metrics.
    pub fn for_mode(rw: &str) -> Self {
        match rw {
            "read" | "randread" => Direction::Read,
            _ => Direction::Write,
        }
    }
}

/// Bandwidth, IOPS and latency statistics for one direction.
///
/// Bandwidth values are KiB/s, latencies nanoseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationMetrics {
    /// Average bandwidth, KiB/s.
    pub bw: i64,
    /// Lowest sampled bandwidth, KiB/s.
    pub bw_min: i64,
    /// Highest sampled bandwidth, KiB/s.
    pub bw_max: i64,
    /// Mean of bandwidth samples, KiB/s.
    pub bw_mean: f64,
    /// Standard deviation of bandwidth samples, KiB/s.
    pub bw_dev: f64,
    /// Number of bandwidth samples.
    pub bw_samples: i64,
    /// Average IOPS.
    pub iops: f64,
    /// Lowest sampled IOPS.
    pub iops_min: i64,
    /// Highest sampled IOPS.
    pub iops_max: i64,
    /// Mean of IOPS samples.
    pub iops_mean: f64,
    /// Standard deviation of IOPS samples.
    pub iops_stddev: f64,
    /// Number of IOPS samples.
    pub iops_samples: i64,
    /// Data transferred, KiB.
    pub io_kbytes: i64,
    /// Time spent in this direction, ms.
    pub runtime: i64,
    /// Completed I/Os.
    pub total_ios: i64,
    /// Submission latency.
    pub slat_ns: LatencyStats,
    /// Completion latency; carries the percentiles.
    pub clat_ns: LatencyStats,
    /// Total latency.
    pub lat_ns: LatencyStats,
}

/// A latency distribution in nanoseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyStats {
    /// Lowest latency, ns.
    pub min: i64,
    /// Highest latency, ns.
    pub max: i64,
    /// Mean latency, ns.
    pub mean: f64,
    /// Standard deviation, ns.
    pub stddev: f64,
    /// Keyed by fio's percentile label (e.g. `"99.000000"`), never by a parsed float.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub percentile: BTreeMap<String, i64>,
}

impl LatencyStats {
    /// Value at the exact percentile label, or 0 when fio did not report it.
    pub fn percentile(&self, label: &str) -> i64 {
        self.percentile.get(label).copied().unwrap_or(0)
    }
}

impl JobResult {
    /// Cross-run identity of the job's access configuration.
    pub fn pattern_key(&self) -> String {
        pattern_key(
            &self.options.rw,
            &self.options.bs,
            &self.options.iodepth,
            &self.options.numjobs,
        )
    }

    pub fn direction(&self) -> Direction {
        Direction::for_mode(&self.options.rw)
    }

    pub fn metrics(&self, direction: Direction) -> &OperationMetrics {
        match direction {
            Direction::Read => &self.read,
            Direction::Write => &self.write,
            Direction::Trim => &self.trim,
        }
    }

    /// Metrics of the direction selected by the job's access mode.
    pub fn selected(&self) -> &OperationMetrics {
        self.metrics(self.direction())
    }
}

/// Formats a pattern key as `"{rw}-{bs} d={iodepth} j={numjobs}"`.
pub fn pattern_key(rw: &str, bs: &str, iodepth: &str, numjobs: &str) -> String {
    format!("{}-{} d={} j={}", rw, bs, iodepth, numjobs)
}
