use std::sync::Arc;
use std::time::Duration;

use breedpath::game::{Gender, InstanceId, IvSet, OwnedCreature, SkillSet, SpeciesId};
use breedpath::pruning::{
    canonicalize, Diversity, MinimumEffort, MinimumReuse, PruningContext, PruningPipeline, PruningRule,
    PruningRuleKind,
};
use breedpath::reference::{BredParams, CandidateRef, FarmSettings, SharedRef};
use breedpath::solver::SolverControl;
use breedpath::target::TargetSpec;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

const A: SpeciesId = SpeciesId(1);
const B: SpeciesId = SpeciesId(2);
const C: SpeciesId = SpeciesId(3);

const FARM: FarmSettings = FarmSettings {
    effort_per_attempt: Duration::from_secs(300),
    cost_per_attempt: 1,
    parallel: false,
};

fn owned(instance: u64, species: SpeciesId, gender: Gender) -> SharedRef {
    let creature = OwnedCreature::new(InstanceId(instance), species, gender);
    Arc::new(CandidateRef::owned(Arc::new(creature), &TargetSpec::new(C)))
}

fn bred_with(first: &SharedRef, second: &SharedRef, probability: f64, reversals: usize) -> SharedRef {
    Arc::new(CandidateRef::bred(BredParams {
        parents: [first.clone(), second.clone()],
        child: C,
        child_male_probability: 0.5,
        skills: SkillSet::empty(),
        ivs: IvSet::random(),
        probability,
        reversals,
        farm: FARM,
    }))
}

fn bred(first: &SharedRef, second: &SharedRef, probability: f64) -> SharedRef {
    bred_with(first, second, probability, 0)
}

fn hashes(candidates: &[SharedRef]) -> Vec<u64> {
    candidates.iter().map(|c| c.structural_hash()).collect()
}

struct Fixture {
    a1: SharedRef,
    a2: SharedRef,
    b3: SharedRef,
    b4: SharedRef,
}

fn fixture() -> Fixture {
    Fixture {
        a1: owned(1, A, Gender::Male),
        a2: owned(2, A, Gender::Male),
        b3: owned(3, B, Gender::Female),
        b4: owned(4, B, Gender::Female),
    }
}

#[test]
fn test_equivalent_lineages_collapse() {
    let f = fixture();
    let forward = bred(&f.a1, &f.b3, 0.5);
    let backward = bred(&f.b3, &f.a1, 0.5);
    let other = bred(&f.a2, &f.b4, 0.5);

    assert_eq!(forward.structural_hash(), backward.structural_hash());
    assert_eq!(forward.canonical_key(), other.canonical_key());
    assert_eq!(forward.effort(), Duration::from_secs(600));

    let baseline = canonicalize(vec![forward.clone(), backward.clone(), other.clone()]);
    assert_eq!(baseline.len(), 1);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        let mut input = vec![forward.clone(), backward.clone(), other.clone()];
        input.shuffle(&mut rng);
        assert_eq!(hashes(&canonicalize(input)), hashes(&baseline));
    }
}

#[test]
fn test_fewer_reversals_survive_dedup() {
    let f = fixture();
    let aided = bred_with(&f.a1, &f.b3, 0.5, 1);
    let plain = bred(&f.a2, &f.b4, 0.5);
    assert_eq!(aided.effort(), plain.effort());

    let pipeline = PruningPipeline::from_kinds(&PruningRuleKind::default_order());
    let kept = pipeline.prune_group(vec![aided, plain.clone()], &PruningContext::detached());
    assert_eq!(hashes(&kept), hashes(&[plain]));
}

#[test]
fn test_pipeline_is_idempotent_and_order_free() {
    let f = fixture();
    let group = vec![
        bred(&f.a1, &f.b3, 0.5),
        bred(&f.a2, &f.b4, 0.5),
        bred(&f.a1, &f.b4, 0.25),
        bred(&f.a2, &f.b3, 1.0),
        bred(&f.b3, &f.a2, 1.0),
    ];
    let pipeline = PruningPipeline::from_kinds(&PruningRuleKind::default_order());
    let context = PruningContext::detached();

    let once = pipeline.prune_group(group.clone(), &context);
    assert_eq!(once.len(), 1);
    assert_eq!(once[0].effort(), Duration::from_secs(300));
    let twice = pipeline.prune_group(once.clone(), &context);
    assert_eq!(hashes(&once), hashes(&twice));

    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..10 {
        let mut shuffled = group.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(hashes(&pipeline.prune_group(shuffled, &context)), hashes(&once));
    }
}

#[test]
fn test_minimum_reuse_prefers_distinct_creatures() {
    let f = fixture();
    let parent = bred(&f.a1, &f.b3, 0.5);
    let reusing = bred(&parent, &f.a1, 0.5);
    let fresh = bred(&parent, &f.a2, 0.5);
    assert_eq!(reusing.stats().instance_reuse(), 1);
    assert_eq!(fresh.stats().instance_reuse(), 0);

    let kept = MinimumReuse.apply(vec![reusing, fresh.clone()], &PruningContext::detached());
    assert_eq!(hashes(&kept), hashes(&[fresh]));
}

#[test]
fn test_diversity_drops_lookalikes() {
    let f = fixture();
    let parent = bred(&f.a1, &f.b3, 0.5);
    let first = bred(&parent, &f.a1, 0.5);
    let second = bred(&parent, &f.a2, 0.25);
    let context = PruningContext::detached();

    let strict = Diversity::new(0.5).apply(vec![first.clone(), second.clone()], &context);
    assert_eq!(hashes(&strict), hashes(&[first.clone()]));

    let lenient = Diversity::new(1.0).apply(vec![first, second], &context);
    assert_eq!(lenient.len(), 2);
}

#[test]
fn test_cancelled_rules_return_subsets() {
    let f = fixture();
    let group = vec![bred(&f.a1, &f.b3, 0.5), bred(&f.a1, &f.b4, 0.25)];
    let control = SolverControl::new();
    control.cancel();
    let context = PruningContext::new(&control);

    let effort = MinimumEffort.apply(group.clone(), &context);
    assert_eq!(hashes(&effort), hashes(&group));

    let diverse = Diversity::new(0.0).apply(group.clone(), &context);
    assert!(diverse.len() <= group.len());

    let pipeline = PruningPipeline::from_kinds(&PruningRuleKind::default_order());
    assert_eq!(pipeline.prune_group(group.clone(), &context).len(), 2);
}
