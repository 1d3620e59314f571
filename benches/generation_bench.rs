use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mating_sim::{Population, SimulationConfig};

fn bench_generation(c: &mut Criterion) {
    let config = SimulationConfig {
        seed: Some(1),
        ..SimulationConfig::default()
    };

    c.bench_function("one_generation_default", |b| {
        b.iter_batched(
            || Population::new(config.clone()).unwrap(),
            |mut population| {
                population.run_generation().unwrap();
                black_box(population.agent_count())
            },
            criterion::BatchSize::SmallInput,
        )
    });

    let wide = SimulationConfig {
        number_groups: 16,
        parallel_threshold: 8,
        seed: Some(1),
        ..SimulationConfig::default()
    };

    c.bench_function("one_generation_16_groups_parallel", |b| {
        b.iter_batched(
            || Population::new(wide.clone()).unwrap(),
            |mut population| {
                population.run_generation().unwrap();
                black_box(population.agent_count())
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_generation);
criterion_main!(benches);
