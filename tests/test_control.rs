mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use breedpath::{
    game::Gender,
    reference::CanonicalKey,
    solver::{SolveOutcome, Solver, SolverControl, SolverPhase, SolverSettings},
    target::TargetSpec,
};
use common::{catalog, owned, EMBER, MOSS, SPARK};

fn settings(steps: usize) -> SolverSettings {
    SolverSettings::builder()
        .max_breeding_steps(steps)
        .include_wild(false)
        .max_threads(2)
        .batch_size(1)
        .build()
}

fn solve_plain(steps: usize) -> SolveOutcome {
    let catalog = catalog();
    Solver::new(&catalog, settings(steps))
        .with_owned([
            owned(1, SPARK, Gender::Male, &[]),
            owned(2, MOSS, Gender::Female, &[]),
        ])
        .solve(&TargetSpec::new(EMBER))
        .unwrap()
}

fn keys(outcome: &SolveOutcome) -> Vec<CanonicalKey> {
    outcome.results.iter().map(|r| r.canonical_key()).collect()
}

#[test]
fn test_cancel_before_solve() {
    let catalog = catalog();
    let control = SolverControl::new();
    control.cancel();

    let outcome = Solver::new(&catalog, settings(3))
        .with_owned([
            owned(1, SPARK, Gender::Male, &[]),
            owned(2, MOSS, Gender::Female, &[]),
        ])
        .with_control(control)
        .solve(&TargetSpec::new(EMBER))
        .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.generations_run, 0);
    assert!(outcome.results.is_empty());
}

#[test]
fn test_cancel_keeps_committed_generations() {
    let catalog = catalog();
    let control = SolverControl::new();
    let handle = control.clone();

    let outcome = Solver::new(&catalog, settings(2))
        .with_owned([
            owned(1, SPARK, Gender::Male, &[]),
            owned(2, MOSS, Gender::Female, &[]),
        ])
        .with_control(control)
        .on_status(move |status| {
            if status.phase == SolverPhase::Breeding && status.current_generation == 2 {
                handle.cancel();
            }
        })
        .solve(&TargetSpec::new(EMBER))
        .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.generations_run, 1);
    assert_eq!(keys(&outcome), keys(&solve_plain(1)));
}

#[test]
fn test_pause_then_resume_matches_uninterrupted() {
    let catalog = catalog();
    let control = SolverControl::new();
    let handle = control.clone();
    let was_paused = Arc::new(AtomicBool::new(false));
    let seen = was_paused.clone();

    let outcome = Solver::new(&catalog, settings(2))
        .with_owned([
            owned(1, SPARK, Gender::Male, &[]),
            owned(2, MOSS, Gender::Female, &[]),
        ])
        .with_control(control)
        .on_status(move |status| {
            if status.phase == SolverPhase::Breeding && status.current_generation == 1 {
                handle.pause();
                seen.store(handle.is_paused(), Ordering::SeqCst);
                let resumer = handle.clone();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(30));
                    resumer.resume();
                });
            }
        })
        .solve(&TargetSpec::new(EMBER))
        .unwrap();

    assert!(was_paused.load(Ordering::SeqCst));
    assert!(!outcome.cancelled);
    assert_eq!(keys(&outcome), keys(&solve_plain(2)));
}

#[test]
fn test_cancel_wakes_paused_run() {
    let catalog = catalog();
    let control = SolverControl::new();
    let handle = control.clone();

    let outcome = Solver::new(&catalog, settings(2))
        .with_owned([
            owned(1, SPARK, Gender::Male, &[]),
            owned(2, MOSS, Gender::Female, &[]),
        ])
        .with_control(control)
        .on_status(move |status| {
            if status.phase == SolverPhase::Breeding {
                handle.pause();
                let canceller = handle.clone();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(20));
                    canceller.cancel();
                });
            }
        })
        .solve(&TargetSpec::new(EMBER))
        .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.generations_run, 0);
}

#[test]
fn test_status_sequence() {
    let catalog = catalog();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let outcome = Solver::new(&catalog, settings(2))
        .with_owned([
            owned(1, SPARK, Gender::Male, &[]),
            owned(2, MOSS, Gender::Female, &[]),
        ])
        .on_status(move |status| sink.lock().unwrap().push(*status))
        .solve(&TargetSpec::new(EMBER))
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.first().map(|s| s.phase), Some(SolverPhase::Initializing));
    assert_eq!(events.last().map(|s| s.phase), Some(SolverPhase::Finished));
    assert_eq!(events.last().map(|s| s.current_generation), Some(outcome.generations_run));
    assert!(events.iter().all(|s| s.target_generations == 2 && !s.cancelled));

    let breeding: Vec<usize> = events
        .iter()
        .filter(|s| s.phase == SolverPhase::Breeding)
        .map(|s| s.current_generation)
        .collect();
    assert_eq!(breeding, (1..=breeding.len()).collect::<Vec<_>>());
    assert!(!breeding.is_empty());
}
