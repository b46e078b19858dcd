use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgorm::{SqlBuilder, SqlValue};

/// Build a `SELECT col0, col1, ... FROM t WHERE col0 = $1 AND col1 = $2 ...` query with
/// `n` columns and `n` equality predicates.
fn build_select(n: usize) -> pgorm::QueryBuilder {
    let cols: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let col_refs: Vec<&str> = cols.iter().map(String::as_str).collect();
    let mut qb = pgorm::QueryBuilder::new().from("t").select(&col_refs);
    for i in 0..n {
        qb = qb.and_eq(&format!("col{i}"), i as i64);
    }
    qb
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/to_sql");
    for n in [1, 5, 10, 50, 100] {
        let qb = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.to_sql()));
        });
    }
    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build_and_render");
    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).to_sql()));
        });
    }
    group.finish();
}

fn bench_insert_multi_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/insert_multi_row");
    for rows in [1, 10, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut ib = pgorm::InsertBuilder::new("t").columns(&["a", "b", "c"]);
                for i in 0..rows {
                    ib = ib.values(vec![
                        SqlValue::I64(i as i64),
                        SqlValue::Text(format!("row{i}")),
                        SqlValue::Bool(i % 2 == 0),
                    ]);
                }
                black_box(ib.to_sql())
            });
        });
    }
    group.finish();
}

fn bench_renumber_placeholders(c: &mut Criterion) {
    use pgorm::QueryBuilder;
    let mut group = c.benchmark_group("sql_builder/where_in_growth");
    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let qb = QueryBuilder::new()
                    .from("t")
                    .select(&["id"])
                    .and_in("id", values.clone());
                black_box(qb.to_sql())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_to_sql,
    bench_build_and_render,
    bench_insert_multi_row,
    bench_renumber_placeholders
);
criterion_main!(benches);
