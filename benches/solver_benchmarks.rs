//! Solver and pipeline benchmarks.
//!
//! Reproducible measurements over seeded synthetic portfolios so runs are
//! comparable across machines and commits.
//!
//! Run with: cargo bench

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use restock::prelude::*;

fn synthetic_problem(n_skus: usize, budget: Option<f64>) -> OptimizationProblem {
    let synthetic = SyntheticConfig {
        seed: 42,
        periods: 24,
        skus: (0..n_skus)
            .map(|i| SyntheticSku {
                sku: format!("SKU-{i:04}"),
                base_level: 50.0 + (i % 17) as f64 * 10.0,
                noise: 0.2,
            })
            .collect(),
    };
    let demand = synthetic.generate().expect("generate demand");
    let forecasts = ForecastModel::new(8)
        .expect("window")
        .forecast_all(&demand)
        .expect("forecast");
    let costs: BTreeMap<String, CostProfile> = forecasts
        .keys()
        .enumerate()
        .map(|(i, sku)| {
            let ov = CostOverride {
                unit_cost: Some(5.0 + (i % 7) as f64),
                shortage_penalty: Some(15.0 + (i % 5) as f64),
                ..CostOverride::default()
            };
            (
                sku.clone(),
                CostProfile::merged(sku, &CostDefaults::default(), Some(&ov)),
            )
        })
        .collect();
    OptimizationProblem::build(forecasts, costs, budget, None).expect("problem")
}

/// Augmented-Lagrangian solve time across portfolio sizes.
fn bench_auglag_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("auglag_solve");
    group.sample_size(50);

    for n in [10, 100, 500] {
        let unconstrained = synthetic_problem(n, None);
        group.bench_with_input(
            BenchmarkId::new("unconstrained", n),
            &unconstrained,
            |b, problem| {
                let solver = AugLagSolver::default();
                b.iter(|| black_box(solver.solve(problem).expect("solve")));
            },
        );

        // Budget at roughly 60% of mean-demand spend, so it binds.
        let spend: f64 = unconstrained
            .terms()
            .iter()
            .map(|t| t.unit_cost * t.mu)
            .sum();
        let constrained = synthetic_problem(n, Some(spend * 0.6));
        group.bench_with_input(
            BenchmarkId::new("binding_budget", n),
            &constrained,
            |b, problem| {
                let solver = AugLagSolver::default();
                b.iter(|| black_box(solver.solve(problem).expect("solve")));
            },
        );
    }

    group.finish();
}

/// Exact LP solve time across portfolio sizes.
#[cfg(feature = "simplex")]
fn bench_simplex_solve(c: &mut Criterion) {
    use restock::solver::SimplexSolver;

    let mut group = c.benchmark_group("simplex_solve");
    group.sample_size(50);

    for n in [10, 100, 500] {
        let spend: f64 = synthetic_problem(n, None)
            .terms()
            .iter()
            .map(|t| t.unit_cost * t.mu)
            .sum();
        let problem = synthetic_problem(n, Some(spend * 0.6));
        group.bench_with_input(BenchmarkId::new("binding_budget", n), &problem, |b, p| {
            let solver = SimplexSolver::new();
            b.iter(|| black_box(solver.solve(p).expect("solve")));
        });
    }

    group.finish();
}

/// Forecasting throughput over the demand table.
fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast");
    group.sample_size(100);

    for n in [100, 1000] {
        let synthetic = SyntheticConfig {
            seed: 7,
            periods: 52,
            skus: (0..n)
                .map(|i| SyntheticSku {
                    sku: format!("SKU-{i:04}"),
                    base_level: 80.0,
                    noise: 0.3,
                })
                .collect(),
        };
        let demand = synthetic.generate().expect("generate demand");
        group.bench_with_input(BenchmarkId::new("forecast_all", n), &demand, |b, table| {
            let model = ForecastModel::new(8).expect("window");
            b.iter(|| black_box(model.forecast_all(table).expect("forecast")));
        });
    }

    group.finish();
}

#[cfg(feature = "simplex")]
criterion_group!(benches, bench_auglag_solve, bench_simplex_solve, bench_forecast);
#[cfg(not(feature = "simplex"))]
criterion_group!(benches, bench_auglag_solve, bench_forecast);
criterion_main!(benches);
