use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nyx_bdd::bdd::{Bdd, BddMgr};
use nyx_bdd::BddConfig;

fn fresh_mgr() -> BddMgr {
    BddMgr::with_config(BddConfig {
        initial_vars: 64,
        cache_size: 1 << 16,
        ..BddConfig::default()
    })
}

/// Conjunction of pairwise products under a good (interleaved) order.
fn bench_interleaved_sum(c: &mut Criterion) {
    c.bench_function("sum_of_products_interleaved", |b| {
        b.iter(|| {
            let mgr = fresh_mgr();
            let mut sum = mgr.zero();
            for i in 0..16 {
                let x = mgr.lit(2 * i + 1);
                let y = mgr.lit(2 * i + 2);
                sum = &sum + &(&x * &y);
            }
            black_box(sum.count_nodes())
        })
    });
}

/// The same function under the hostile order, then one reorder pass.
fn bench_reorder(c: &mut Criterion) {
    c.bench_function("reorder_hostile_order", |b| {
        b.iter(|| {
            let mgr = fresh_mgr();
            let vars: Vec<Bdd> = (1..=16).map(|v| mgr.lit(v)).collect();
            let mut sum = mgr.zero();
            for i in 0..8 {
                sum = &sum + &(&vars[i] * &vars[i + 8]);
            }
            mgr.reorder(false);
            black_box(sum.count_nodes())
        })
    });
}

/// Queens-style constraint merging: heavy on ITE and the AND cache.
fn bench_queens_5(c: &mut Criterion) {
    c.bench_function("queens_5", |b| {
        b.iter(|| {
            let n = 5i32;
            let mgr = fresh_mgr();
            let cell = |r: i32, col: i32| mgr.lit(r * n + col + 1);

            let mut all = mgr.one();
            for r in 0..n {
                let mut row = mgr.zero();
                for col in 0..n {
                    row = &row + &cell(r, col);
                }
                all = &all * &row;
            }
            for r in 0..n {
                for col in 0..n {
                    for r2 in 0..n {
                        for c2 in 0..n {
                            if (r2, c2) <= (r, col) {
                                continue;
                            }
                            let attacks = (r == r2 && col != c2)
                                || (col == c2 && r != r2)
                                || (r != r2 && r + col == r2 + c2)
                                || (r != r2 && r - col == r2 - c2);
                            if attacks {
                                let clash = &cell(r, col) * &cell(r2, c2);
                                all = &all * &!clash;
                            }
                        }
                    }
                }
            }
            black_box(all.one_cube().id())
        })
    });
}

criterion_group!(benches, bench_interleaved_sum, bench_reorder, bench_queens_5);
criterion_main!(benches);
