//! Per-metric pivots of row tables, the unit chart and sheet renderers consume.

use crate::error::{ReportError, Result};
use crate::matcher::PatternSet;
use crate::table::{RunRow, RunRows, BW_CORRECTION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metric a pivot is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Performance,
    IopsMin,
    IopsMax,
    BwMin,
    BwMax,
    LatMin,
    LatMax,
    LatStddev,
    ClatP99,
}

impl MetricKind {
    pub const ALL: [MetricKind; 9] = [
        MetricKind::Performance,
        MetricKind::IopsMin,
        MetricKind::IopsMax,
        MetricKind::BwMin,
        MetricKind::BwMax,
        MetricKind::LatMin,
        MetricKind::LatMax,
        MetricKind::LatStddev,
        MetricKind::ClatP99,
    ];

    /// Selector name used in configuration files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::Performance => "performance",
            MetricKind::IopsMin => "iops_min",
            MetricKind::IopsMax => "iops_max",
            MetricKind::BwMin => "bw_min",
            MetricKind::BwMax => "bw_max",
            MetricKind::LatMin => "lat_min",
            MetricKind::LatMax => "lat_max",
            MetricKind::LatStddev => "lat_stddev",
            MetricKind::ClatP99 => "clat_p99",
        }
    }

    /// Axis label for charts.
    pub fn axis_label(self) -> &'static str {
        match self {
            MetricKind::Performance => "Mb/s",
            MetricKind::IopsMin => "IOPS min",
            MetricKind::IopsMax => "IOPS max",
            MetricKind::BwMin => "BW Min (MB/s)",
            MetricKind::BwMax => "BW Max (MB/s)",
            MetricKind::LatMin => "Latency min (ms)",
            MetricKind::LatMax => "Latency max (ms)",
            MetricKind::LatStddev => "Latency stddev (ms)",
            MetricKind::ClatP99 => "cLatency p99 (ms)",
        }
    }

    /// File name stem for artifacts rendered from this metric.
    pub fn file_stem(self) -> &'static str {
        match self {
            MetricKind::Performance => "Performance",
            MetricKind::IopsMin => "IOPS_min_value",
            MetricKind::IopsMax => "IOPS_max_value",
            MetricKind::BwMin => "BW_min_value",
            MetricKind::BwMax => "BW_max_value",
            MetricKind::LatMin => "Latency_min_value",
            MetricKind::LatMax => "Latency_max_value",
            MetricKind::LatStddev => "Latency_stdev",
            MetricKind::ClatP99 => "Latency_p99",
        }
    }

    /// Whether a larger value is an improvement.
    pub fn higher_is_better(self) -> bool {
        matches!(
            self,
            MetricKind::Performance
                | MetricKind::IopsMin
                | MetricKind::IopsMax
                | MetricKind::BwMin
                | MetricKind::BwMax
        )
    }

    /// Extracts this metric from a row.
    pub fn value(self, row: &RunRow) -> f64 {
        match self {
            MetricKind::Performance => round_half_away(row.throughput_mib) * BW_CORRECTION,
            MetricKind::IopsMin => row.iops_min as f64,
            MetricKind::IopsMax => row.iops_max as f64,
            MetricKind::BwMin => round_half_away(row.bw_min_mib) * BW_CORRECTION,
            MetricKind::BwMax => round_half_away(row.bw_max_mib) * BW_CORRECTION,
            MetricKind::LatMin => row.lat_min_ms,
            MetricKind::LatMax => row.lat_max_ms,
            MetricKind::LatStddev => row.lat_stddev_ms,
            MetricKind::ClatP99 => row.clat_p99_ms,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        MetricKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ReportError::UnknownMetric(s.to_string()))
    }
}

/// Rounds to the nearest integer, halves away from zero.
pub fn round_half_away(x: f64) -> f64 {
    let t = x.trunc();
    if (x - t).abs() >= 0.5 {
        t + 1f64.copysign(x)
    } else {
        t
    }
}

/// Values of one metric for one pattern, one point per matching row per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotedMetric {
    pub kind: MetricKind,
    pub pattern: String,
    /// `(run_label, value)` in run load order.
    pub points: Vec<(String, f64)>,
}

impl PivotedMetric {
    pub fn axis_label(&self) -> &'static str {
        self.kind.axis_label()
    }

    pub fn file_stem(&self) -> &'static str {
        self.kind.file_stem()
    }

    pub fn value_for(&self, run_label: &str) -> Option<f64> {
        self.points
            .iter()
            .find(|(label, _)| label == run_label)
            .map(|(_, v)| *v)
    }

    /// Every point of `run_label`; more than one when the run repeats the pattern.
    pub fn values_for(&self, run_label: &str) -> Vec<f64> {
        self.points
            .iter()
            .filter(|(label, _)| label == run_label)
            .map(|(_, v)| *v)
            .collect()
    }
}

/// Builds one pivot per pattern in `patterns`, sorted by pattern key.
pub fn build_pivots(patterns: &PatternSet, tables: &[RunRows], kind: MetricKind) -> Vec<PivotedMetric> {
    patterns
        .iter()
        .map(|pattern| {
            let mut points = Vec::with_capacity(tables.len());
            for table in tables {
                for row in table.rows.iter().filter(|r| &r.pattern_key() == pattern) {
                    points.push((table.label.clone(), kind.value(row)));
                }
            }
            PivotedMetric {
                kind,
                pattern: pattern.clone(),
                points,
            }
        })
        .collect()
}

/// One run's values across all patterns of a metric: a bar group colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSeries {
    pub run_label: String,
    /// `(pattern, value)` in pivot order.
    pub points: Vec<(String, f64)>,
}

/// Transposes pivots into one series per run, runs in first-seen order.
pub fn series_by_run(pivots: &[PivotedMetric]) -> Vec<RunSeries> {
    let mut series: Vec<RunSeries> = Vec::new();
    for pivot in pivots {
        for (label, value) in &pivot.points {
            let idx = match series.iter().position(|s| &s.run_label == label) {
                Some(idx) => idx,
                None => {
                    series.push(RunSeries {
                        run_label: label.clone(),
                        points: Vec::new(),
                    });
                    series.len() - 1
                }
            };
            series[idx].points.push((pivot.pattern.clone(), *value));
        }
    }
    series
}
