//! Cross-run comparison of fio benchmark results.
//!
//! Result documents are parsed into [`parser::RunTable`]s, flattened into
//! [`table::RunRow`]s, intersected on job patterns, and pivoted per metric for
//! chart and spreadsheet renderers. Worker time-series logs of the same job are
//! glued into one series by [`timeseries`].

pub mod config;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod pipeline;
pub mod pivot;
pub mod schema;
pub mod sink;
pub mod table;
pub mod timeseries;

pub use error::{ReportError, Result};
