//! Consumers of comparison results.
//!
//! Chart and spreadsheet renderers implement [`ReportSink`]; [`CsvSink`] is
//! the plain-data implementation shipped with the crate.

use crate::error::{ReportError, Result};
use crate::pipeline::MergedLog;
use crate::pivot::{MetricKind, PivotedMetric};
use crate::table::{self, RunRows};
use crate::timeseries;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub trait ReportSink {
    /// Receives the flat row table of one run.
    fn write_run_table(&mut self, run: &RunRows) -> Result<()>;

    /// Receives every pivot of one metric, sorted by pattern. `runs` lists the
    /// run labels of the batch in load order.
    fn write_pivots(
        &mut self,
        kind: MetricKind,
        runs: &[String],
        pivots: &[PivotedMetric],
    ) -> Result<()>;

    /// Receives one glued time-series log.
    fn write_merged_log(&mut self, log: &MergedLog) -> Result<()>;
}

/// Writes CSV artifacts below a root directory:
///
/// - `csv-tables/<run>.csv`
/// - `pivots/<metric file stem>.csv`
/// - `glued-logs/<run>/<log kind>/<group>.log`
/// - `charts/<run>/<log kind>/<group>.csv`
pub struct CsvSink {
    root: PathBuf,
}

impl CsvSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn create(&self, dir: &Path, file_name: &str) -> Result<BufWriter<File>> {
        std::fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;
        let path = dir.join(file_name);
        let file = File::create(&path).map_err(|e| ReportError::io(&path, e))?;
        Ok(BufWriter::new(file))
    }

    fn write_chart_points(&self, log: &MergedLog) -> Result<()> {
        let dir = self
            .root
            .join("charts")
            .join(&log.run_label)
            .join(log.kind.image_prefix());
        let out = self.create(&dir, &format!("{}.csv", log.group))?;
        let mut w = csv::Writer::from_writer(out);

        w.write_record(["Seconds", log.kind.axis_label()])?;
        for (seconds, value) in timeseries::chart_points(&log.series, log.kind) {
            w.write_record([seconds.to_string(), format!("{:.2}", value)])?;
        }
        w.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// One cell per run; repeated patterns within a run share the cell.
fn pivot_cell(pivot: &PivotedMetric, run: &str) -> String {
    pivot
        .values_for(run)
        .iter()
        .map(|v| format!("{:.2}", v))
        .collect::<Vec<_>>()
        .join(";")
}

impl ReportSink for CsvSink {
    fn write_run_table(&mut self, run: &RunRows) -> Result<()> {
        let out = self.create(&self.root.join("csv-tables"), &format!("{}.csv", run.label))?;
        table::write_csv(&run.rows, out)
    }

    fn write_pivots(
        &mut self,
        kind: MetricKind,
        runs: &[String],
        pivots: &[PivotedMetric],
    ) -> Result<()> {
        let out = self.create(&self.root.join("pivots"), &format!("{}.csv", kind.file_stem()))?;
        let mut w = csv::Writer::from_writer(out);

        let mut header = vec!["Pattern".to_string()];
        header.extend(runs.iter().cloned());
        w.write_record(&header)?;

        for pivot in pivots {
            let mut record = vec![pivot.pattern.clone()];
            record.extend(runs.iter().map(|run| pivot_cell(pivot, run)));
            w.write_record(&record)?;
        }
        w.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    fn write_merged_log(&mut self, log: &MergedLog) -> Result<()> {
        let dir = self
            .root
            .join("glued-logs")
            .join(&log.run_label)
            .join(log.kind.image_prefix());
        let file_name = format!("{}.log", log.group);
        let out = self.create(&dir, &file_name)?;
        timeseries::write_series(&log.series, out)
            .map_err(|e| ReportError::io(dir.join(&file_name), e))?;
        self.write_chart_points(log)
    }
}
