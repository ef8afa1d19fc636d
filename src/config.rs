//! Report configuration, loadable from a TOML file.

use crate::error::{ReportError, Result};
use crate::pivot::MetricKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory holding the `.json` result documents and log subdirectories.
    pub input_dir: PathBuf,
    /// Root directory for written artifacts.
    pub output_dir: PathBuf,
    /// Free text shown under charts.
    pub description: String,
    /// Metrics to pivot, in output order.
    pub metrics: Vec<MetricKind>,
    /// Whether to glue time-series logs.
    pub merge_logs: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("./fio-compare-results"),
            description: String::new(),
            metrics: MetricKind::ALL.to_vec(),
            merge_logs: false,
        }
    }
}

impl ReportConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        toml::from_str(&content)
            .map_err(|e| ReportError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ReportError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ReportError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pivots_every_metric() {
        let config = ReportConfig::default();
        assert_eq!(config.metrics.len(), MetricKind::ALL.len());
        assert!(!config.merge_logs);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ReportConfig = toml::from_str(
            r#"
            input_dir = "/srv/fio"
            metrics = ["performance", "clat_p99"]
            "#,
        )
        .unwrap();
        assert_eq!(config.input_dir, PathBuf::from("/srv/fio"));
        assert_eq!(config.metrics, vec![MetricKind::Performance, MetricKind::ClatP99]);
        assert_eq!(config.output_dir, ReportConfig::default().output_dir);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.toml");
        let config = ReportConfig {
            description: "nvme vs sata".into(),
            merge_logs: true,
            ..Default::default()
        };
        config.to_file(&path).unwrap();
        assert_eq!(ReportConfig::from_file(&path).unwrap(), config);
    }
}
