use breedpath::game::{GameConstants, IvSet, IvValue, SkillId, Stat, StatMask, SKILL_CAPACITY};
use breedpath::probability::{
    choose, expected_attempts, probability_inherited_target_ivs, probability_inherited_target_skills,
    skill_inheritance_probability,
};

const EPSILON: f64 = 1e-9;

#[test]
fn test_binomials_are_symmetric() {
    for n in 0..=33 {
        for k in 0..=n {
            assert_eq!(choose(n, k), choose(n, n - k), "C({}, {})", n, k);
        }
    }
    // beyond the precomputed table
    assert_eq!(choose(40, 38), choose(40, 2));
    assert_eq!(choose(40, 2), 780);
}

#[test]
fn test_final_counts_form_a_distribution() {
    let constants = GameConstants::default();
    for available in 0..=2 * SKILL_CAPACITY {
        let total: f64 = (0..=SKILL_CAPACITY)
            .map(|num_final| skill_inheritance_probability(available, 0, num_final, &constants))
            .sum();
        assert!((total - 1.0).abs() < EPSILON, "pool {}: total {}", available, total);
    }
}

#[test]
fn test_wanting_more_never_helps() {
    let constants = GameConstants::default();
    for available in 1..=2 * SKILL_CAPACITY {
        for num_final in 0..=SKILL_CAPACITY {
            for desired in 0..available.min(num_final) {
                let fewer = skill_inheritance_probability(available, desired, num_final, &constants);
                let more = skill_inheritance_probability(available, desired + 1, num_final, &constants);
                assert!(more <= fewer + EPSILON, "pool {} final {} desired {}", available, num_final, desired);
            }
        }
    }
}

#[test]
fn test_exact_two_skill_pool() {
    let constants = GameConstants::default();
    // both pool skills pass whenever at least two are requested, then nothing random
    let expected: f64 = constants.direct_skill_probability[2..].iter().sum::<f64>() * constants.random_skill_probability[0];
    let p = skill_inheritance_probability(2, 2, 2, &constants);
    assert!((p - expected).abs() < EPSILON);
    assert!((p - 0.24).abs() < EPSILON);
}

#[test]
fn test_target_skills_must_be_in_pool() {
    let constants = GameConstants::default();
    let pool = [SkillId(1), SkillId(2), SkillId(3)];
    assert_eq!(probability_inherited_target_skills(&pool, &[SkillId(9)], 1, &constants), 0.0);

    let p = probability_inherited_target_skills(&pool, &[SkillId(2)], 1, &constants);
    let expected = skill_inheritance_probability(3, 1, 1, &constants);
    assert_eq!(p, expected);
    assert!(p > 0.0);
}

#[test]
fn test_iv_inheritance() {
    let constants = GameConstants::default();
    let relevant = IvSet::new([IvValue::Relevant(25), IvValue::Random, IvValue::Random]);
    let missing = IvSet::random();
    let hp = StatMask::NONE.with(Stat::Hp);

    // one wanted stat out of three: 0.3 * 1/3 + 0.4 * 2/3 + 0.3 * 1
    let both = probability_inherited_target_ivs(&relevant, &relevant, hp, &constants);
    assert!((both - 2.0 / 3.0).abs() < EPSILON);

    let one = probability_inherited_target_ivs(&relevant, &missing, hp, &constants);
    assert!((one - both / 2.0).abs() < EPSILON);

    assert_eq!(probability_inherited_target_ivs(&missing, &missing, hp, &constants), 0.0);
    assert_eq!(probability_inherited_target_ivs(&missing, &missing, StatMask::NONE, &constants), 1.0);
}

#[test]
fn test_expected_attempts() {
    assert_eq!(expected_attempts(1.0), 1);
    assert_eq!(expected_attempts(0.5), 2);
    assert_eq!(expected_attempts(0.4), 3);
    assert_eq!(expected_attempts(0.3), 4);
    assert_eq!(expected_attempts(0.0), u64::MAX);
    assert_eq!(expected_attempts(f64::NAN), u64::MAX);
}
