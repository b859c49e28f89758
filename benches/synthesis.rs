//! End-to-end synthesis benchmarks.
//!
//! Plants are square grids with self-loops; a seeded generator removes a share
//! of the corridors to vary the shape.
//!
//! Run with:
//! ```bash
//! cargo bench --bench synthesis
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gr1_rs::config::SynthesisConfig;
use gr1_rs::domain::Domain;
use gr1_rs::expr::Expr;
use gr1_rs::machine::UniformInputs;
use gr1_rs::spec::Specification;
use gr1_rs::synth::{synthesize, Outcome};
use gr1_rs::transition::TransitionSystem;
use gr1_rs::types::NodeId;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// Helpers
// ============================================================================

/// An `n × n` grid; each corridor is kept with probability `density`.
/// Corners are labeled `corner0`..`corner3`.
fn grid(n: usize, density: f64, seed: u64) -> TransitionSystem {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let name = |r: usize, c: usize| format!("g{}_{}", r, c);

    let mut ts = TransitionSystem::new();
    for r in 0..n {
        for c in 0..n {
            ts.add_state(name(r, c)).unwrap();
        }
    }
    ts.add_initial(&name(0, 0)).unwrap();
    for r in 0..n {
        for c in 0..n {
            ts.add_transition(&name(r, c), &name(r, c)).unwrap();
            // Keep the border so every corner stays reachable.
            let border = r == 0 || c == 0 || r == n - 1 || c == n - 1;
            if c + 1 < n && (border || rng.gen_bool(density)) {
                ts.add_transition(&name(r, c), &name(r, c + 1)).unwrap();
                ts.add_transition(&name(r, c + 1), &name(r, c)).unwrap();
            }
            if r + 1 < n && (border || rng.gen_bool(density)) {
                ts.add_transition(&name(r, c), &name(r + 1, c)).unwrap();
                ts.add_transition(&name(r + 1, c), &name(r, c)).unwrap();
            }
        }
    }
    for (i, (r, c)) in [(0, 0), (0, n - 1), (n - 1, n - 1), (n - 1, 0)].into_iter().enumerate() {
        ts.add_label(&name(r, c), format!("corner{}", i)).unwrap();
    }
    ts
}

/// Visit `goals` corners while `signal` lags one step behind `busy`.
fn patrol(goals: usize, moore: bool) -> Specification {
    let mut spec = Specification::new()
        .with_env_var("busy", Domain::Boolean)
        .with_env_prog(Expr::var("busy").not())
        .with_sys_var("signal", Domain::Boolean)
        .with_sys_safe(Expr::var("signal").next().iff(Expr::var("busy")))
        .with_moore(moore);
    for i in 0..goals {
        spec = spec.with_sys_prog(Expr::var(format!("corner{}", i)));
    }
    spec
}

// ============================================================================
// Benchmark: Grid scaling
// ============================================================================

fn bench_grid_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesis/grid_scaling");
    group.sample_size(10);

    for n in [3, 5, 7, 9] {
        let ts = grid(n, 0.7, 42);
        let spec = patrol(4, false);
        group.bench_with_input(BenchmarkId::new("mealy", n), &n, |b, _| {
            b.iter(|| synthesize(black_box(&ts), black_box(&spec), &SynthesisConfig::default()).unwrap());
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Mealy vs. Moore
// ============================================================================

fn bench_semantics(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesis/semantics");
    group.sample_size(10);

    let ts = grid(6, 0.7, 7);
    for moore in [false, true] {
        let spec = patrol(4, moore);
        let label = if moore { "moore" } else { "mealy" };
        group.bench_function(label, |b| {
            b.iter(|| synthesize(black_box(&ts), black_box(&spec), &SynthesisConfig::default()).unwrap());
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Parallel goals
// ============================================================================

fn bench_parallel_goals(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesis/parallel_goals");
    group.sample_size(10);

    let ts = grid(8, 0.8, 3);
    let spec = patrol(4, false);
    for parallel in [false, true] {
        let config = SynthesisConfig::default().with_parallel(parallel);
        group.bench_with_input(BenchmarkId::new("parallel", parallel), &config, |b, config| {
            b.iter(|| synthesize(black_box(&ts), black_box(&spec), config).unwrap());
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Machine minimization and simulation
// ============================================================================

fn bench_machine(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesis/machine");

    let ts = grid(6, 0.7, 11);
    let Outcome::Realizable(machine) = synthesize(&ts, &patrol(4, false), &SynthesisConfig::default()).unwrap() else {
        panic!("benchmark specification is unrealizable");
    };

    group.bench_function("minimize", |b| b.iter(|| black_box(&machine).minimize()));
    group.bench_function("simulate_1000", |b| {
        b.iter(|| {
            machine
                .simulate(NodeId::INIT, 1000, UniformInputs::new(5))
                .unwrap()
                .iter()
                .count()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_grid_scaling, bench_semantics, bench_parallel_goals, bench_machine);
criterion_main!(benches);
