//! fio result comparison tool.
//!
//! Loads every JSON result document in a directory, keeps the job patterns
//! present in all of them, writes CSV tables and pivots, and prints a table
//! per metric showing each run and the delta of the last run against the first.
//!
//! Usage: `fio-compare --catalog <dir-with-json> [--output <dir>] [--logs]`

use anyhow::{bail, Context};
use clap::Parser;
use fio_compare::config::ReportConfig;
use fio_compare::pipeline::{self, Report};
use fio_compare::pivot::{MetricKind, PivotedMetric};
use fio_compare::sink::CsvSink;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "fio-compare")]
#[command(about = "Compare fio JSON results across test runs", version)]
struct Cli {
    /// Directory with *.json results and, optionally, directories of *.log files
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Directory for CSV tables, pivots and glued logs
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Description attached to rendered results
    #[arg(short, long)]
    description: Option<String>,

    /// Metric to compare (repeatable): performance, iops_min, iops_max, bw_min,
    /// bw_max, lat_min, lat_max, lat_stddev, clat_p99
    #[arg(short, long = "metric")]
    metrics: Vec<MetricKind>,

    /// Glue per-worker time-series logs
    #[arg(short, long)]
    logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("fio_compare={}", level))
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&cli)?;
    let report = pipeline::run(&config).context("comparison failed")?;

    for failure in &report.failures {
        error!(path = %failure.path.display(), error = %failure.error, "result file skipped");
    }
    for issue in &report.log_issues {
        warn!(%issue, "log gluing incomplete");
    }

    let mut sink = CsvSink::new(&config.output_dir);
    let failed = pipeline::publish(&report, &mut sink);
    if failed > 0 {
        warn!(failed, "some artifacts could not be written");
    }

    print_report(&report, &config.description);
    info!(dir = %config.output_dir.display(), "results written");
    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<ReportConfig> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::from_file(path)?,
        None => ReportConfig::default(),
    };
    match &cli.catalog {
        Some(catalog) => config.input_dir = catalog.clone(),
        None if cli.config.is_none() => bail!("--catalog is required without --config"),
        None => {}
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    if let Some(description) = &cli.description {
        config.description = description.clone();
    }
    if !cli.metrics.is_empty() {
        config.metrics = cli.metrics.clone();
    }
    if cli.logs {
        config.merge_logs = true;
    }
    Ok(config)
}

fn print_report(report: &Report, description: &str) {
    if !description.is_empty() {
        println!("{}", description);
    }
    let labels: Vec<&str> = report
        .comparison
        .tables
        .iter()
        .map(|t| t.label.as_str())
        .collect();

    for (kind, pivots) in &report.comparison.pivots {
        println!();
        println!("{} [{}]", kind.file_stem(), kind.axis_label());

        let mut header = format!("{:<32}", "Pattern");
        for label in &labels {
            header.push_str(&format!(" | {:>14}", label));
        }
        header.push_str(" | Delta");
        println!("{}", header);
        println!("{}", "-".repeat(header.len() + 16));

        for pivot in pivots {
            print_comparison(*kind, pivot, &labels);
        }
    }

    println!();
    println!(
        "Runs: {} | Skipped files: {} | Common patterns: {} | Glued logs: {}",
        labels.len(),
        report.failures.len(),
        report.comparison.patterns.len(),
        report.logs.len()
    );
}

fn print_comparison(kind: MetricKind, pivot: &PivotedMetric, labels: &[&str]) {
    let mut line = format!("{:<32}", pivot.pattern);
    for label in labels {
        let cell = pivot
            .value_for(label)
            .map(format_value)
            .unwrap_or_else(|| "-".to_string());
        line.push_str(&format!(" | {:>14}", cell));
    }

    let first = labels.first().and_then(|l| pivot.value_for(l));
    let last = labels.last().and_then(|l| pivot.value_for(l));
    if let (Some(base), Some(cand)) = (first, last) {
        if labels.len() > 1 {
            let delta_pct = if base != 0.0 {
                ((cand - base) / base) * 100.0
            } else {
                0.0
            };
            let improved = if kind.higher_is_better() {
                delta_pct
            } else {
                -delta_pct
            };
            let hint = if improved > 1.0 {
                "faster"
            } else if improved < -1.0 {
                "slower"
            } else {
                "~same"
            };
            line.push_str(&format!(" | {:>+.1}% ({})", delta_pct, hint));
        }
    }
    println!("{}", line);
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format_num(v as i64)
    } else {
        format!("{:.2}", v)
    }
}

fn format_num(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}
