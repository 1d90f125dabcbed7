use criterion::{Criterion, criterion_group, criterion_main};
use rowtree::model::{BuilderConfig, Hierarchy, TreeBuilder};
use rowtree::rows::{Columns, Row, RowFormat, parse_rows};
use std::hint::black_box;

const REGRESSION_SIZES: &[(&str, usize)] = &[("1k", 1_000), ("10k", 10_000)];

const REPORTING_SIZES: &[(&str, usize)] = &[("100k", 100_000)];

/// Rows like `pkg3.mod17.Class42`, branching ten ways per level.
fn dotted_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| Row::new(format!("pkg{}.mod{}.Class{}", i % 10, i % 100, i), (i % 997).to_string()))
        .collect()
}

/// Rows like `src/dir4/file12.vue`.
fn file_path_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| Row::new(format!("src/dir{}/file{}.vue", i % 50, i), (i * 7 % 4096).to_string()))
        .collect()
}

/// Rows like `1.02.03`, three levels of district codes.
fn admin_code_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| Row::new(format!("{}.{:02}.{:02}", i % 7 + 1, i / 7 % 20 + 1, i), "1000"))
        .collect()
}

/// Pairs of rows `p.x{i}.c`, `p.x{i}`; every second row detaches a subtree.
fn truncating_rows(n: usize) -> Vec<Row> {
    (0..n / 2)
        .flat_map(|i| [Row::new(format!("p.x{i}.c"), "1"), Row::new(format!("p.x{i}"), "2")])
        .collect()
}

fn build(rows: &[Row], config: BuilderConfig) -> Hierarchy {
    let mut builder = TreeBuilder::new(config);
    builder.add_rows(rows).unwrap();
    builder.finish()
}

fn tree_building(c: &mut Criterion) {
    for (name, n) in REGRESSION_SIZES {
        let dotted = dotted_rows(*n);
        let file_paths = file_path_rows(*n);
        let admin_codes = admin_code_rows(*n);
        let truncating = truncating_rows(*n);

        c.bench_function(&format!("dotted-{name}"), |b| {
            b.iter(|| build(black_box(&dotted), BuilderConfig::dotted()));
        });
        c.bench_function(&format!("file-path-{name}"), |b| {
            b.iter(|| build(black_box(&file_paths), BuilderConfig::file_path()));
        });
        c.bench_function(&format!("admin-code-{name}"), |b| {
            b.iter(|| build(black_box(&admin_codes), BuilderConfig::admin_code()));
        });
        c.bench_function(&format!("truncating-{name}"), |b| {
            b.iter(|| build(black_box(&truncating), BuilderConfig::dotted()));
        });
    }
}

fn csv_to_tree(c: &mut Criterion) {
    for (name, n) in REPORTING_SIZES {
        let mut csv = String::from("id,value\n");
        for row in dotted_rows(*n) {
            csv.push_str(&format!("{},{}\n", row.path.unwrap_or_default(), row.weight.unwrap_or_default()));
        }

        c.bench_function(&format!("csv-dotted-{name}"), |b| {
            b.iter(|| {
                let rows = parse_rows(black_box(&csv), RowFormat::Csv, &Columns::flare()).unwrap();
                build(&rows, BuilderConfig::dotted())
            });
        });
    }
}

criterion_group!(regression, tree_building);
criterion_group! {
    name = reporting;
    config = Criterion::default().sample_size(10);
    targets = csv_to_tree
}
criterion_main!(regression, reporting);
