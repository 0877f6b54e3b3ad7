use std::hint::black_box;

use bmpswarm::prelude::*;
use criterion::{criterion_group, criterion_main, Criterion};

fn setup_problem(land_units: usize) -> BmpProblem<ScenarioData> {
    let mut data = ScenarioData::new()
        .with_unit_cost("PA", 1, 10.0)
        .with_unit_cost("PA", 2, 25.0)
        .with_unit_cost("PA", 3, 18.0)
        .with_efficiency(1, "N", 0.3)
        .with_efficiency(2, "N", 0.6)
        .with_efficiency(3, "N", 0.45)
        .with_target("bench", "N", 500.0)
        .with_target("bench", "budget", 1.0e6);

    let mut groups = Vec::with_capacity(land_units);
    for i in 0..land_units {
        let id = format!("lu-{i}");
        data = data
            .with_land_unit(&id, "PA", 50.0 + i as f64)
            .with_baseline_load(&id, "N", 2.0 + (i % 5) as f64);
        groups.push(DecisionGroup::land(&id, vec![1, 2, 3]));
    }

    BmpProblem::new(data, DecisionLayout::new(groups), "bench", BmpObjectives::CostAndLoad)
        .expect("Failed to build problem")
}

fn setup_config(problem: &BmpProblem<ScenarioData>, parallel: bool) -> PsoConfig {
    PsoConfigBuilder::default()
        .nparts(40)
        .dimension(problem.dimension())
        .nobjs(2)
        .max_iterations(50)
        .seed(Some(1))
        .parallel(parallel)
        .build()
        .expect("Failed to build config")
}

fn benchmark_swarm(c: &mut Criterion) {
    let problem = setup_problem(100);
    let serial = setup_config(&problem, false);
    let parallel = setup_config(&problem, true);
    let position = problem.layout().initial_position(&mut rand::thread_rng());

    c.bench_function("bmp_evaluate", |b| {
        b.iter(|| {
            let _ = black_box(problem.evaluate(black_box(&position)));
        });
    });

    c.bench_function("swarm_run_serial", |b| {
        b.iter(|| {
            let mut swarm = Swarm::new(serial.clone(), &problem).unwrap();
            let _ = black_box(swarm.run());
        });
    });

    c.bench_function("swarm_run_parallel", |b| {
        b.iter(|| {
            let mut swarm = Swarm::new(parallel.clone(), &problem).unwrap();
            let _ = black_box(swarm.run());
        });
    });
}

criterion_group!(benches, benchmark_swarm);
criterion_main!(benches);
