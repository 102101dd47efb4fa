use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

use a11y_audit::engine::parse_audit_response;
use a11y_audit::rules::builtin;
use a11y_audit::{Config, RunConfig, ScanResult, ScanTarget, aggregate, discover};

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title>Bench</title></head>
<body>
  <img src="hero.png">
  <form><input type="text" id="q"></form>
</body>
</html>"#;

fn create_page(dir: &Path, relative: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, PAGE).unwrap();
}

fn setup_repository(count: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    for i in 0..count {
        create_page(temp_dir.path(), &format!("src/module_{}/page_{i}.html", i % 10));
        create_page(temp_dir.path(), &format!("node_modules/pkg_{i}/index.html"));
        create_page(temp_dir.path(), &format!("src/module_{}/page_{i}.spec.ts", i % 10));
    }

    temp_dir
}

fn run_config(root: &Path) -> RunConfig {
    let mut config = Config::default();
    config.repo_path = root.to_path_buf();
    config.validate().unwrap()
}

fn synthetic_results(count: usize) -> Vec<ScanResult> {
    let root = Path::new("/repo");
    let outcome = parse_audit_response(&builtin::evaluate(PAGE)).unwrap();
    (0..count)
        .map(|i| {
            let target = ScanTarget::new(root, root.join(format!("page_{i:05}.html")), 512);
            ScanResult::success(target, outcome.clone(), Duration::from_millis(40), 1)
        })
        .collect()
}

fn benchmark_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery");

    for count in [10, 100, 500].iter() {
        let temp_dir = setup_repository(*count);
        let config = run_config(temp_dir.path());

        group.bench_with_input(BenchmarkId::new("files", count), count, |b, _| {
            b.iter(|| {
                let result = discover(black_box(&config));
                black_box(result)
            });
        });
    }

    group.finish();
}

fn benchmark_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let config = Config::default();
    let generated_at = chrono::Utc::now();

    for count in [10, 1000, 10000].iter() {
        let results = synthetic_results(*count);

        group.bench_with_input(BenchmarkId::new("results", count), count, |b, _| {
            b.iter(|| {
                let report = aggregate(black_box(results.clone()), &config, generated_at);
                black_box(report)
            });
        });
    }

    group.finish();
}

fn benchmark_builtin_rules(c: &mut Criterion) {
    c.bench_function("builtin_rules", |b| {
        b.iter(|| {
            let raw = builtin::evaluate(black_box(PAGE));
            black_box(parse_audit_response(&raw))
        });
    });
}

criterion_group!(
    benches,
    benchmark_discovery,
    benchmark_aggregation,
    benchmark_builtin_rules
);
criterion_main!(benches);
