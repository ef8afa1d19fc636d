//! Pipeline benchmarks: document parsing, pattern matching, pivots, log gluing.

use std::path::Path;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fio_compare::matcher::common_patterns;
use fio_compare::parser::parse_document;
use fio_compare::pivot::{build_pivots, MetricKind};
use fio_compare::table::{project, RunRows};
use fio_compare::timeseries::{merge_series, parse_log, LogSample};
use serde_json::json;

const JOB_COUNTS: [usize; 3] = [8, 64, 512];
const RUN_COUNT: usize = 6;

fn document(jobs: usize, seed: i64) -> String {
    let jobs: Vec<_> = (0..jobs)
        .map(|i| {
            let rw = if i % 2 == 0 { "randread" } else { "randwrite" };
            let stats = json!({
                "bw": 100_000 + seed * 17 + i as i64,
                "bw_min": 90_000,
                "bw_max": 120_000,
                "iops_min": 20_000,
                "iops_max": 31_000,
                "lat_ns": { "min": 20_000, "max": 9_000_000, "mean": 80_000.0, "stddev": 4_000.0 },
                "clat_ns": { "percentile": { "99.000000": 1_200_000 } }
            });
            json!({
                "jobname": format!("job-{}", i),
                "groupid": i,
                "job options": {
                    "rw": rw,
                    "bs": format!("{}k", 4 << (i % 6)),
                    "iodepth": (1 << (i % 7)).to_string(),
                    "numjobs": (1 + i / 42).to_string()
                },
                "read": stats,
                "write": stats
            })
        })
        .collect();
    json!({ "fio version": "fio-3.35", "jobs": jobs }).to_string()
}

fn tables(jobs: usize) -> Vec<RunRows> {
    (0..RUN_COUNT as i64)
        .map(|seed| {
            let label = format!("run-{}", seed);
            let run = parse_document(document(jobs, seed).as_bytes(), &label, Path::new("bench.json"))
                .expect("bench document parses");
            project(&run)
        })
        .collect()
}

fn parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for jobs in JOB_COUNTS {
        let doc = format!("fio banner\n{}\n", document(jobs, 0));
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::new("document", jobs), &doc, |b, doc| {
            b.iter(|| parse_document(doc.as_bytes(), "bench", Path::new("bench.json")).unwrap());
        });
    }
    group.finish();
}

fn compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");
    for jobs in JOB_COUNTS {
        let tables = tables(jobs);
        group.throughput(Throughput::Elements((jobs * RUN_COUNT) as u64));
        group.bench_with_input(BenchmarkId::new("common_patterns", jobs), &tables, |b, t| {
            b.iter(|| common_patterns(t).unwrap());
        });

        let patterns = common_patterns(&tables).unwrap();
        group.bench_with_input(BenchmarkId::new("pivot_all_metrics", jobs), &tables, |b, t| {
            b.iter(|| {
                MetricKind::ALL
                    .iter()
                    .map(|&kind| build_pivots(&patterns, t, kind).len())
                    .sum::<usize>()
            });
        });
    }
    group.finish();
}

fn glue(c: &mut Criterion) {
    let mut group = c.benchmark_group("glue");
    for samples in [600usize, 3_600, 86_400] {
        let text: String = (0..samples)
            .map(|i| format!("{}, {}, 0, 0\n", i * 1000, 204_800 + i))
            .collect();
        group.throughput(Throughput::Elements(samples as u64));
        group.bench_with_input(BenchmarkId::new("parse_log", samples), &text, |b, text| {
            b.iter(|| parse_log(text));
        });

        let workers: Vec<Vec<LogSample>> = (0..8).map(|_| parse_log(&text)).collect();
        group.bench_with_input(BenchmarkId::new("merge_8_workers", samples), &workers, |b, w| {
            b.iter(|| merge_series(w));
        });
    }
    group.finish();
}

criterion_group!(benches, parse, compare, glue);
criterion_main!(benches);
