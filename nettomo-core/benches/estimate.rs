use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nettomo_core::{Solver, Topology, estimate::smooth, incidence::IncidenceMatrix};

const SAMPLES: usize = 10_000;
const WIDTH: usize = 200;

fn moving_average(c: &mut Criterion) {
    let samples: Vec<f64> = (0..SAMPLES).map(|i| (i as f64 * 0.01).sin()).collect();

    c.bench_function("smooth", |b| {
        b.iter(|| smooth(black_box(&samples), black_box(WIDTH)))
    });
}

fn solve(c: &mut Criterion) {
    // a chain of 32 nodes where every path starts at node 0
    let paths: String = (1..=32u64)
        .map(|end| {
            let nodes: Vec<String> = (0..=end).map(|node| node.to_string()).collect();
            format!("{end} -> {}\n", nodes.join(" "))
        })
        .collect();
    let topology = Topology::parse(&paths).unwrap();
    let matrix = IncidenceMatrix::build(&topology).unwrap();
    let solver = Solver::new(&matrix).unwrap();
    let observations = vec![1.0; solver.dimension()];

    c.bench_function("solver_apply", |b| {
        b.iter(|| solver.apply(black_box(&observations)))
    });
}

criterion_group!(benches, moving_average, solve);
criterion_main!(benches);
