//! Flat per-job rows derived from a [`RunTable`].

use crate::error::Result;
use crate::parser::RunTable;
use crate::schema::{self, JobResult, P99_LABEL};
use serde::Serialize;
use std::io::Write;

/// Calibration factor applied to every bandwidth figure shown to users.
pub const BW_CORRECTION: f64 = 1.049;

const NS_PER_MS: f64 = 1_000_000.0;

/// Header of the exported CSV table, in column order.
pub const CSV_HEADER: [&str; 15] = [
    "Job Name",
    "Group ID",
    "Pattern",
    "Block Size",
    "IO Depth",
    "Jobs",
    "MB/s",
    "BWMin (MB/s)",
    "BWMax (MB/s)",
    "IOPS min",
    "IOPS max",
    "Latency Min (ms)",
    "Latency Max (ms)",
    "Latency stddev (ms)",
    "cLatency p99 (ms)",
];

/// One job of one run, reduced to the metrics of its selected direction.
///
/// Bandwidth is MiB/s without the calibration factor; latencies are ms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRow {
    pub job_name: String,
    pub group_id: i64,
    pub mode: String,
    pub block_size: String,
    pub io_depth: String,
    pub jobs: String,
    pub throughput_mib: f64,
    pub bw_min_mib: f64,
    pub bw_max_mib: f64,
    pub iops_min: i64,
    pub iops_max: i64,
    pub lat_min_ms: f64,
    pub lat_max_ms: f64,
    pub lat_stddev_ms: f64,
    pub clat_p99_ms: f64,
}

impl RunRow {
    pub fn from_job(job: &JobResult) -> Self {
        let m = job.selected();
        Self {
            job_name: job.job_name.clone(),
            group_id: job.group_id,
            mode: job.options.rw.clone(),
            block_size: job.options.bs.clone(),
            io_depth: job.options.iodepth.clone(),
            jobs: job.options.numjobs.clone(),
            throughput_mib: kib_to_mib(m.bw),
            bw_min_mib: kib_to_mib(m.bw_min),
            bw_max_mib: kib_to_mib(m.bw_max),
            iops_min: m.iops_min,
            iops_max: m.iops_max,
            lat_min_ms: m.lat_ns.min as f64 / NS_PER_MS,
            lat_max_ms: m.lat_ns.max as f64 / NS_PER_MS,
            lat_stddev_ms: m.lat_ns.stddev / NS_PER_MS,
            clat_p99_ms: m.clat_ns.percentile(P99_LABEL) as f64 / NS_PER_MS,
        }
    }

    pub fn pattern_key(&self) -> String {
        schema::pattern_key(&self.mode, &self.block_size, &self.io_depth, &self.jobs)
    }

    fn csv_record(&self) -> [String; 15] {
        [
            self.job_name.clone(),
            self.group_id.to_string(),
            self.mode.clone(),
            self.block_size.clone(),
            self.io_depth.clone(),
            self.jobs.clone(),
            format!("{:.2}", corrected_mbps(self.throughput_mib)),
            format!("{:.2}", corrected_mbps(self.bw_min_mib)),
            format!("{:.2}", corrected_mbps(self.bw_max_mib)),
            self.iops_min.to_string(),
            self.iops_max.to_string(),
            format!("{:.2}", self.lat_min_ms),
            format!("{:.2}", self.lat_max_ms),
            format!("{:.2}", self.lat_stddev_ms),
            format!("{:.2}", self.clat_p99_ms),
        ]
    }
}

/// A run's label together with its projected rows.
#[derive(Debug, Clone)]
pub struct RunRows {
    pub label: String,
    pub rows: Vec<RunRow>,
}

/// Projects every job of `run` into a row, in document order.
pub fn project(run: &RunTable) -> RunRows {
    RunRows {
        label: run.label.clone(),
        rows: run.jobs.iter().map(RunRow::from_job).collect(),
    }
}

pub fn kib_to_mib(kib: i64) -> f64 {
    kib as f64 / 1024.0
}

/// MiB/s rounded to two decimals and scaled by [`BW_CORRECTION`].
pub fn corrected_mbps(mib: f64) -> f64 {
    (mib * 100.0).round() / 100.0 * BW_CORRECTION
}

/// Writes `rows` as CSV with [`CSV_HEADER`].
pub fn write_csv<W: Write>(rows: &[RunRow], writer: W) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(CSV_HEADER)?;
    for row in rows {
        w.write_record(row.csv_record())?;
    }
    w.flush().map_err(csv::Error::from)?;
    Ok(())
}
