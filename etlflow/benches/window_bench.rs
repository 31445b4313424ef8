//! Benchmarks for window iteration.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use etlflow::core::{BoundaryValue, Step};
use etlflow::pipeline::{Pipeline, Windows};
use etlflow::testing::RecordingStore;
use std::sync::Arc;

fn window_benchmark(c: &mut Criterion) {
    c.bench_function("integer_windows_10k", |b| {
        b.iter(|| {
            let windows = Windows::new(
                BoundaryValue::Integer(0),
                Step::Integer(1),
                BoundaryValue::Integer(black_box(9_999)),
            );
            windows.map(Result::unwrap).count()
        })
    });

    let first = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let last = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    c.bench_function("daily_windows_25y", |b| {
        b.iter(|| {
            let windows = Windows::new(
                BoundaryValue::Date(first),
                Step::days(1),
                BoundaryValue::Date(black_box(last)),
            );
            windows.map(Result::unwrap).count()
        })
    });

    c.bench_function("pipeline_run_1k_windows", |b| {
        b.iter(|| {
            let mut etl = Pipeline::builder()
                .store(Arc::new(RecordingStore::new()))
                .without_logger()
                .build();
            etl.start(|_| Ok(0))
                .step(|_| Ok(1))
                .stop(|_| Ok(black_box(999)))
                .etl(|etl, window| {
                    if let Some(w) = window {
                        etl.query(w.lower())?;
                    }
                    Ok(())
                });
            etl.run().unwrap();
        })
    });
}

criterion_group!(benches, window_benchmark);
criterion_main!(benches);
