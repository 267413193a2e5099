use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use std::hint::black_box;
use wgraphs::{algo::*, gens::*, prelude::*};

fn sample(n: NumNodes, directed: bool) -> Graph<Node> {
    let rng = &mut Pcg64Mcg::seed_from_u64(0x5eed);
    Gnp::new()
        .nodes(n)
        .avg_deg(8.0)
        .directed(directed)
        .weights(1.0, 10.0)
        .generate(rng)
}

/// Single-source searches on sparse random graphs of growing size
fn bench_shortest_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_paths");
    for n in [1_000, 10_000, 100_000] {
        let g = sample(n, true);
        group.bench_with_input(BenchmarkId::new("bfs", n), &g, |b, g| {
            b.iter(|| black_box(g.bfs(0).count()));
        });
        group.bench_with_input(BenchmarkId::new("dijkstra", n), &g, |b, g| {
            b.iter(|| black_box(g.dijkstra(&0).unwrap()));
        });
    }
    group.finish();
}

fn bench_centrality(c: &mut Criterion) {
    let mut group = c.benchmark_group("centrality");
    group.sample_size(10);

    let g = sample(2_000, true);
    group.bench_function("betweenness", |b| {
        b.iter(|| black_box(g.betweenness_centrality().unwrap()));
    });
    group.bench_function("pagerank", |b| {
        b.iter(|| black_box(g.pagerank().unwrap()));
    });
    group.bench_function("hits", |b| {
        b.iter(|| black_box(g.hits()));
    });
    group.finish();
}

fn bench_structure(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure");
    group.sample_size(10);

    let directed = sample(50_000, true);
    group.bench_function("tarjan_scc", |b| {
        b.iter(|| black_box(directed.strongly_connected_components().unwrap()));
    });

    let undirected = sample(20_000, false);
    group.bench_function("louvain", |b| {
        let rng = &mut Pcg64Mcg::seed_from_u64(1);
        b.iter(|| black_box(undirected.louvain(rng).unwrap()));
    });
    group.bench_function("kruskal", |b| {
        b.iter(|| black_box(undirected.kruskal_mst().is_ok()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_shortest_paths,
    bench_centrality,
    bench_structure
);
criterion_main!(benches);
