use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading, comparing and publishing benchmark results.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("malformed input {path}: {reason}")]
    MalformedInput { path: PathBuf, reason: String },

    #[error("no job pattern is present in every run; nothing to compare")]
    NoComparableData,

    #[error("job {job} announces log {group} but no such log file exists")]
    MissingLogGroup { job: String, group: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate run label: {0}")]
    DuplicateRunLabel(String),

    #[error("no result files with .json extension found in {0}")]
    NoInputFiles(PathBuf),

    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ReportError::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
