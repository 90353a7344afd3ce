#![allow(dead_code)]

use std::time::Duration;

use breedpath::game::{
    GameCatalog, Gender, InstanceId, OwnedCreature, SkillId, Species, SpeciesId,
};

pub const SPARK: SpeciesId = SpeciesId(1);
pub const MOSS: SpeciesId = SpeciesId(2);
pub const EMBER: SpeciesId = SpeciesId(3);
pub const TIDE: SpeciesId = SpeciesId(4);
pub const STORM: SpeciesId = SpeciesId(5);

/// Spark x Moss -> Ember, Ember x Spark -> Tide, Tide (M) x Moss (F) -> Storm.
/// Every species also breeds true with itself. Spark and Moss can be caught.
pub fn catalog() -> GameCatalog {
    let mut builder = GameCatalog::builder()
        .species(
            Species::new(SPARK, "Spark")
                .with_male_probability(0.5)
                .with_capture_effort(Duration::from_secs(600)),
        )
        .species(
            Species::new(MOSS, "Moss")
                .with_male_probability(0.25)
                .with_capture_effort(Duration::from_secs(900)),
        )
        .species(Species::new(EMBER, "Ember"))
        .species(Species::new(TIDE, "Tide").with_male_probability(0.75))
        .species(Species::new(STORM, "Storm"))
        .rule(SPARK, MOSS, EMBER)
        .rule(EMBER, SPARK, TIDE)
        .gendered_rule(TIDE, Gender::Male, MOSS, Gender::Female, STORM);
    for species in [SPARK, MOSS, EMBER, TIDE, STORM] {
        builder = builder.rule(species, species, species);
    }
    builder.build().expect("fixture catalog is valid")
}

pub fn owned(instance: u64, species: SpeciesId, gender: Gender, skills: &[u16]) -> OwnedCreature {
    OwnedCreature::new(InstanceId(instance), species, gender)
        .with_skills(skills.iter().copied().map(SkillId))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
