//! Shared fixtures: synthetic fio result documents and log files.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::{Path, PathBuf};

// =============================================================================
// Result documents
// =============================================================================

/// A job definition for a synthetic fio document.
#[derive(Clone)]
pub struct JobSpec {
    pub name: String,
    pub rw: String,
    pub bs: String,
    pub iodepth: u32,
    pub numjobs: u32,
    pub bw_kib: i64,
    pub iops_min: i64,
    pub iops_max: i64,
    pub lat_min_ns: i64,
    pub lat_max_ns: i64,
    pub p99_ns: Option<i64>,
    pub log_prefix: Option<String>,
}

impl JobSpec {
    pub fn new(name: &str, rw: &str, bs: &str, iodepth: u32, numjobs: u32) -> Self {
        Self {
            name: name.to_string(),
            rw: rw.to_string(),
            bs: bs.to_string(),
            iodepth,
            numjobs,
            bw_kib: 102_400,
            iops_min: 100,
            iops_max: 900,
            lat_min_ns: 50_000,
            lat_max_ns: 4_000_000,
            p99_ns: Some(2_000_000),
            log_prefix: None,
        }
    }

    pub fn bw(mut self, kib: i64) -> Self {
        self.bw_kib = kib;
        self
    }

    pub fn iops(mut self, min: i64, max: i64) -> Self {
        self.iops_min = min;
        self.iops_max = max;
        self
    }

    pub fn without_p99(mut self) -> Self {
        self.p99_ns = None;
        self
    }

    pub fn logs(mut self, prefix: &str) -> Self {
        self.log_prefix = Some(prefix.to_string());
        self
    }

    /// Pattern key this job is expected to produce.
    pub fn pattern(&self) -> String {
        format!("{}-{} d={} j={}", self.rw, self.bs, self.iodepth, self.numjobs)
    }

    fn direction_stats(&self) -> Value {
        let mut percentile = serde_json::Map::new();
        percentile.insert("50.000000".into(), json!(self.lat_min_ns * 2));
        if let Some(p99) = self.p99_ns {
            percentile.insert("99.000000".into(), json!(p99));
        }
        json!({
            "io_bytes": 1_048_576,
            "io_kbytes": 1024,
            "bw": self.bw_kib,
            "iops": self.bw_kib as f64 / 4.0,
            "runtime": 60_000,
            "total_ios": 262_144,
            "short_ios": 0,
            "slat_ns": { "min": 1_000, "max": 20_000, "mean": 2_500.5, "stddev": 300.0 },
            "clat_ns": {
                "min": self.lat_min_ns,
                "max": self.lat_max_ns,
                "mean": 400_000.0,
                "stddev": 120_000.0,
                "percentile": percentile
            },
            "lat_ns": {
                "min": self.lat_min_ns,
                "max": self.lat_max_ns,
                "mean": 410_000.0,
                "stddev": 130_000.0
            },
            "bw_min": self.bw_kib / 2,
            "bw_max": self.bw_kib * 2,
            "bw_agg": 100.0,
            "bw_mean": self.bw_kib as f64,
            "bw_dev": 12.5,
            "bw_samples": 120,
            "iops_min": self.iops_min,
            "iops_max": self.iops_max,
            "iops_mean": 500.0,
            "iops_stddev": 40.0,
            "iops_samples": 120
        })
    }

    fn to_json(&self, group_id: usize) -> Value {
        let mut options = json!({
            "name": self.name,
            "rw": self.rw,
            "bs": self.bs,
            "iodepth": self.iodepth.to_string(),
            "numjobs": self.numjobs.to_string(),
        });
        if let Some(prefix) = &self.log_prefix {
            options["write_bw_log"] = json!(prefix);
            options["write_iops_log"] = json!(prefix);
            options["write_lat_log"] = json!(prefix);
        }

        let active = self.direction_stats();
        let idle = json!({ "bw": 0, "iops": 0.0, "lat_ns": { "min": 0, "max": 0, "mean": 0.0, "stddev": 0.0 } });
        let (read, write) = if self.rw == "read" || self.rw == "randread" {
            (active, idle)
        } else {
            (idle, active)
        };

        json!({
            "jobname": self.name,
            "groupid": group_id,
            "error": 0,
            "eta": 0,
            "elapsed": 61,
            "job options": options,
            "read": read,
            "write": write,
            "trim": { "bw": 0, "iops": 0.0 },
            "sync": { "total_ios": 0 },
            "job_runtime": 60_000,
            "usr_cpu": 3.2,
            "sys_cpu": 11.7,
            "ctx": 812_004,
            "majf": 0,
            "minf": 41
        })
    }
}

/// A complete fio document with `jobs`.
pub fn fio_document(jobs: &[JobSpec]) -> String {
    let jobs: Vec<Value> = jobs.iter().enumerate().map(|(i, j)| j.to_json(i)).collect();
    let doc = json!({
        "fio version": "fio-3.35",
        "timestamp": 1_700_000_000u64,
        "timestamp_ms": 1_700_000_000_000u64,
        "time": "Tue Nov 14 22:13:20 2023",
        "global options": {
            "ioengine": "libaio",
            "size": "4G",
            "direct": "1",
            "runtime": "60",
            "log_avg_msec": "1000"
        },
        "jobs": jobs,
        "disk_util": [{ "name": "nvme0n1", "read_ios": 12, "write_ios": 34, "util": 97.5 }]
    });
    serde_json::to_string_pretty(&doc).expect("fixture serializes")
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write fixture");
    path
}

/// Writes a result document for `jobs` as `<dir>/<label>.json`.
pub fn write_run(dir: &Path, label: &str, jobs: &[JobSpec]) -> PathBuf {
    write_file(dir, &format!("{}.json", label), &fio_document(jobs))
}

// =============================================================================
// Log files
// =============================================================================

/// fio log text with one sample per second.
pub fn log_text(values: &[i64], op_type: u8) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{}, {}, {}, 0\n", (i + 1) * 1000, v, op_type))
        .collect()
}
