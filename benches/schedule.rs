//! Benchmarks for schedule parsing and next-occurrence calculations.

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use minuterie::Schedule;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for (name, expr) in [
        ("wildcard", "* * * * *"),
        ("business_hours", "0,15,30,45 9-17 * * mon-fri"),
        ("last_friday", "0 0 * * l5"),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), expr, |b, expr| {
            b.iter(|| Schedule::parse(expr).unwrap());
        });
    }

    group.finish();
}

fn bench_next_occurrence(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_occurrence");

    let base_time = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 30).unwrap();

    for (name, expr) in [
        ("every_minute", "* * * * *"),
        ("daily", "@daily"),
        ("leap_day", "0 0 29 2 *"),
        ("last_friday", "0 0 * * l5"),
        ("far_year", "0 0 1 1 * 2099"),
    ] {
        let schedule = Schedule::parse(expr).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &schedule, |b, s| {
            b.iter(|| s.next_occurrence(&base_time));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_next_occurrence);

criterion_main!(benches);
