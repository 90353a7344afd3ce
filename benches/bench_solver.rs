use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use breedpath::{
    game::{GameCatalog, GameConstants, Gender, InstanceId, OwnedCreature, SkillId, Species, SpeciesId},
    probability::skill_inheritance_probability,
    solver::{Solver, SolverSettings},
    target::TargetSpec,
};

const SPECIES: u32 = 8;

// A ring of species where neighbours breed into the next one along
fn ring_catalog() -> GameCatalog {
    let mut builder = GameCatalog::builder();
    for id in 1..=SPECIES {
        builder = builder.species(
            Species::new(SpeciesId(id), format!("species-{}", id))
                .with_capture_effort(Duration::from_secs(600)),
        );
    }
    for id in 1..=SPECIES {
        let next = id % SPECIES + 1;
        let child = next % SPECIES + 1;
        builder = builder
            .rule(SpeciesId(id), SpeciesId(next), SpeciesId(child))
            .rule(SpeciesId(id), SpeciesId(id), SpeciesId(id));
    }
    builder.build().expect("ring catalog is valid")
}

fn owned_creatures() -> Vec<OwnedCreature> {
    (1..=SPECIES)
        .flat_map(|id| {
            let gender = if id % 2 == 0 { Gender::Female } else { Gender::Male };
            let skill = SkillId(id as u16);
            [
                OwnedCreature::new(InstanceId(id as u64 * 2), SpeciesId(id), gender).with_skills([skill]),
                OwnedCreature::new(InstanceId(id as u64 * 2 + 1), SpeciesId(id), gender.opposite()),
            ]
        })
        .collect()
}

fn bench_probability(c: &mut Criterion) {
    let constants = GameConstants::default();
    c.bench_function("skill_inheritance_probability", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for available in 0..=8 {
                for desired in 0..=available.min(4) {
                    for num_final in desired..=4 {
                        total += skill_inheritance_probability(
                            black_box(available),
                            black_box(desired),
                            black_box(num_final),
                            &constants,
                        );
                    }
                }
            }
            total
        })
    });
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    let catalog = ring_catalog();
    let target = TargetSpec::new(SpeciesId(5)).with_optional([SkillId(1), SkillId(3)]);

    for threads in [1, 4].iter() {
        let settings = SolverSettings::builder()
            .max_breeding_steps(3)
            .max_wild_participants(1)
            .max_threads(*threads)
            .batch_size(64)
            .build();

        group.bench_with_input(BenchmarkId::new("threads", threads), &settings, |b, settings| {
            b.iter(|| {
                Solver::new(&catalog, settings.clone())
                    .with_owned(owned_creatures())
                    .solve(black_box(&target))
                    .expect("solve succeeds")
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_probability, bench_solve);
criterion_main!(benches);
