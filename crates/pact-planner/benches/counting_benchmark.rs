//! Benchmarks for the full decomposition -> refinement -> compilation ->
//! execution pipeline, comparing the GYO join-tree fast path (acyclic
//! patterns) against the general relational plan on increasingly dense
//! host graphs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pact_check::generators::random_connected_graph;
use pact_check::naive_solver::NaiveWideSolver;
use pact_check::pipeline::count_via_pipeline_default;
use pact_core::Graph;

fn path(n: usize) -> Graph {
    let mut g = Graph::new(false);
    let vs = g.add_n_vertices(n);
    for w in vs.windows(2) {
        g.add_edge(w[0], w[1]).unwrap();
    }
    g
}

fn cycle(n: usize) -> Graph {
    let mut g = Graph::new(false);
    let vs = g.add_n_vertices(n);
    for w in vs.windows(2) {
        g.add_edge(w[0], w[1]).unwrap();
    }
    g.add_edge(vs[n - 1], vs[0]).unwrap();
    g
}

fn clique(n: usize) -> Graph {
    let mut g = Graph::new(false);
    let vs = g.add_n_vertices(n);
    for i in 0..n {
        for j in (i + 1)..n {
            g.add_edge(vs[i], vs[j]).unwrap();
        }
    }
    g
}

fn bench_acyclic_fast_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_path_pattern_acyclic_fast_path");
    let host = clique(8);

    for len in [2, 3, 4, 5, 6].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(len), len, |b, &len| {
            let pattern = path(len);
            b.iter(|| {
                let total = count_via_pipeline_default(&pattern, &host, &NaiveWideSolver).unwrap();
                black_box(total)
            });
        });
    }

    group.finish();
}

fn bench_cyclic_general_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_cycle_pattern_general_plan");
    let host = clique(8);

    for len in [4, 5, 6].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(len), len, |b, &len| {
            let pattern = cycle(len);
            b.iter(|| {
                let total = count_via_pipeline_default(&pattern, &host, &NaiveWideSolver).unwrap();
                black_box(total)
            });
        });
    }

    group.finish();
}

fn bench_host_density_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_triangle_pattern_by_host_size");
    let pattern = cycle(3);

    for host_size in [6, 8, 10, 12].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(host_size), host_size, |b, &host_size| {
            let mut rng = ChaCha8Rng::seed_from_u64(host_size as u64);
            let extra = host_size * (host_size - 1) / 4;
            let host = random_connected_graph(&mut rng, host_size, extra);
            b.iter(|| {
                let total = count_via_pipeline_default(&pattern, &host, &NaiveWideSolver).unwrap();
                black_box(total)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_acyclic_fast_path, bench_cyclic_general_plan, bench_host_density_scaling);
criterion_main!(benches);
