//! Tests for the archive

use super::*;
use crate::config::{FeedbackDirectedSampling, SecondaryObjective};
use crate::fitness::{EvaluatedIndividual, FitnessValue, TargetId};
use evotest_genes::{Action, Gene, Individual, Randomness};

fn create_individual(size: usize, value: i64) -> Individual {
    Individual::new(
        (0..size)
            .map(|_| Action::new("call", vec![Gene::integer("x", value, 0, 1000).unwrap()]).unwrap())
            .collect(),
    )
}

fn evaluated(index: u64, size: usize, scores: &[(TargetId, f64)]) -> EvaluatedIndividual {
    let mut fitness = FitnessValue::new(size);
    for &(t, s) in scores {
        fitness.update_target(t, s, Some(0)).unwrap();
    }
    EvaluatedIndividual::new(create_individual(size, index as i64), fitness, index)
}

fn create_archive() -> Archive {
    Archive::new(
        SecondaryObjective::TestLengthMin,
        FeedbackDirectedSampling::Last,
    )
}

#[test]
fn test_first_candidate_is_admitted() {
    let mut archive = create_archive();
    assert!(archive.is_empty());
    assert_eq!(archive.target_state(1), TargetState::Unreached);

    let admission = archive.add_if_needed(&evaluated(1, 1, &[(1, 0.3), (2, 0.0)]), 5);
    assert!(admission.added);
    assert!(admission.improved);
    assert_eq!(archive.target_state(1), TargetState::ReachedPartial);
    assert_eq!(archive.target_state(2), TargetState::Unreached);
    assert_eq!(archive.number_of_reached_targets(), 1);
    assert_eq!(archive.times_not_improved(1), 0);
}

#[test]
fn test_population_bounded_by_limit() {
    let mut archive = create_archive();
    for i in 0..20 {
        archive.add_if_needed(&evaluated(i, 1, &[(1, 0.01 * (i + 1) as f64)]), 3);
        assert!(archive.population(1).len() <= 3);
    }
    assert!((archive.best_score(1) - 0.2).abs() < 1e-9);
}

#[test]
fn test_worse_candidate_rejected_when_full() {
    let mut archive = create_archive();
    archive.add_if_needed(&evaluated(1, 1, &[(1, 0.5)]), 2);
    archive.add_if_needed(&evaluated(2, 1, &[(1, 0.6)]), 2);

    let admission = archive.add_if_needed(&evaluated(3, 1, &[(1, 0.4)]), 2);
    assert!(!admission.added);
    assert_eq!(archive.times_not_improved(1), 1);

    let admission = archive.add_if_needed(&evaluated(4, 1, &[(1, 0.55)]), 2);
    assert!(admission.added);
    assert!(admission.improved);
    assert_eq!(archive.times_not_improved(1), 0);
    let indices: Vec<u64> = archive.population(1).iter().map(|e| e.index).collect();
    assert!(!indices.contains(&1));
}

#[test]
fn test_equivalent_candidate_replaces_worst() {
    let mut archive = create_archive();
    archive.add_if_needed(&evaluated(1, 1, &[(1, 0.5)]), 1);
    let admission = archive.add_if_needed(&evaluated(2, 1, &[(1, 0.5)]), 1);
    assert!(admission.added);
    assert!(!admission.improved);
    assert_eq!(archive.population(1)[0].index, 2);
}

#[test]
fn test_shorter_candidate_wins_tie() {
    let mut archive = create_archive();
    archive.add_if_needed(&evaluated(1, 3, &[(1, 0.5)]), 1);
    let admission = archive.add_if_needed(&evaluated(2, 1, &[(1, 0.5)]), 1);
    assert!(admission.improved);
    assert_eq!(archive.population(1)[0].size(), 1);

    let admission = archive.add_if_needed(&evaluated(3, 4, &[(1, 0.5)]), 1);
    assert!(!admission.added);
}

#[test]
fn test_covering_candidate_clears_population() {
    let mut archive = create_archive();
    for i in 0..4 {
        archive.add_if_needed(&evaluated(i, 1, &[(1, 0.2)]), 5);
    }
    assert_eq!(archive.population(1).len(), 4);

    archive.add_if_needed(&evaluated(10, 2, &[(1, 1.0)]), 5);
    assert_eq!(archive.population(1).len(), 1);
    assert!(archive.is_covered(1));
    assert_eq!(archive.target_state(1), TargetState::Covered);
    assert_eq!(archive.covered_targets(), vec![1]);
    assert!(archive.not_covered_targets().is_empty());
}

#[test]
fn test_covered_target_never_regresses() {
    let mut archive = create_archive();
    archive.add_if_needed(&evaluated(1, 2, &[(1, 1.0)]), 5);

    let admission = archive.add_if_needed(&evaluated(2, 1, &[(1, 0.9)]), 5);
    assert!(!admission.added);
    assert_eq!(archive.best_score(1), 1.0);
    assert_eq!(archive.population(1).len(), 1);

    // same length, more collateral coverage
    let admission = archive.add_if_needed(&evaluated(3, 2, &[(1, 1.0), (2, 0.4)]), 5);
    assert!(admission.added);
    assert_eq!(archive.population(1)[0].index, 3);

    // shorter
    archive.add_if_needed(&evaluated(4, 1, &[(1, 1.0)]), 5);
    assert_eq!(archive.population(1)[0].index, 4);

    // longer
    let admission = archive.add_if_needed(&evaluated(5, 3, &[(1, 1.0), (3, 1.0)]), 5);
    assert_eq!(archive.population(1)[0].index, 4);
    assert!(admission.added);
    assert!(archive.is_covered(3));
}

#[test]
fn test_would_reach_new_target() {
    let mut archive = create_archive();
    archive.add_if_needed(&evaluated(1, 1, &[(1, 0.5)]), 5);
    assert!(!archive.would_reach_new_target(&evaluated(2, 1, &[(1, 0.1)])));
    assert!(archive.would_reach_new_target(&evaluated(3, 1, &[(1, 0.1), (7, 0.1)])));
    assert!(!archive.would_reach_new_target(&evaluated(4, 1, &[(7, 0.0)])));
}

#[test]
fn test_sampling_empty_archive_fails() {
    let mut archive = create_archive();
    let mut rng = Randomness::new(1);
    assert!(matches!(
        archive.sample_individual(&mut rng, SearchPhase::Exploration, 5),
        Err(crate::error::SearchError::EmptyArchive)
    ));
}

#[test]
fn test_sampling_returns_copy_and_counts_attempts() {
    let mut archive = create_archive();
    let mut rng = Randomness::new(4);
    archive.add_if_needed(&evaluated(1, 1, &[(1, 0.5)]), 5);

    let sampled = archive
        .sample_individual(&mut rng, SearchPhase::Exploration, 5)
        .unwrap();
    assert_eq!(sampled.population_origin, Some(1));
    assert_eq!(sampled.index, 1);
    assert_eq!(archive.times_not_improved(1), 1);
    assert!(archive.population(1)[0].population_origin.is_none());
}

#[test]
fn test_focused_sampling_skips_covered_targets() {
    let mut archive = create_archive();
    let mut rng = Randomness::new(8);
    archive.add_if_needed(&evaluated(1, 1, &[(1, 1.0)]), 5);
    archive.add_if_needed(&evaluated(2, 1, &[(2, 0.3)]), 5);

    for _ in 0..50 {
        let sampled = archive
            .sample_individual(&mut rng, SearchPhase::Focused, 1)
            .unwrap();
        assert_eq!(sampled.population_origin, Some(2));
    }
}

#[test]
fn test_focused_last_prefers_fewest_attempts() {
    let mut archive = create_archive();
    let mut rng = Randomness::new(2);
    archive.add_if_needed(&evaluated(1, 1, &[(1, 0.3)]), 5);
    archive.add_if_needed(&evaluated(2, 1, &[(2, 0.3)]), 5);

    let mut origins = Vec::new();
    for _ in 0..4 {
        let sampled = archive
            .sample_individual(&mut rng, SearchPhase::Focused, 5)
            .unwrap();
        origins.push(sampled.population_origin.unwrap());
    }
    assert_eq!(origins, vec![1, 2, 1, 2]);
}

#[test]
fn test_focused_quickest_sticks_with_last_target() {
    let mut archive = Archive::new(
        SecondaryObjective::TestLengthMin,
        FeedbackDirectedSampling::FocusedQuickest,
    );
    let mut rng = Randomness::new(2);

    // target 1 improves after three failed attempts, target 2 immediately
    archive.add_if_needed(&evaluated(1, 1, &[(1, 0.1)]), 1);
    for i in 2..5 {
        archive.add_if_needed(&evaluated(i, 1, &[(1, 0.05)]), 1);
    }
    assert_eq!(archive.times_not_improved(1), 3);
    archive.add_if_needed(&evaluated(5, 1, &[(1, 0.5)]), 1);
    archive.add_if_needed(&evaluated(6, 1, &[(2, 0.3)]), 1);

    let mut origins = Vec::new();
    for _ in 0..7 {
        let sampled = archive
            .sample_individual(&mut rng, SearchPhase::Focused, 1)
            .unwrap();
        origins.push(sampled.population_origin.unwrap());
    }
    assert_eq!(origins, vec![1, 1, 1, 1, 1, 1, 2]);
}

#[test]
fn test_exploration_prefers_least_covered_targets() {
    let mut archive = create_archive();
    let mut rng = Randomness::new(13);
    archive.add_if_needed(&evaluated(1, 1, &[(1, 1.0)]), 5);
    archive.add_if_needed(&evaluated(2, 1, &[(2, 0.05)]), 5);

    let mut low = 0;
    for _ in 0..200 {
        let sampled = archive
            .sample_individual(&mut rng, SearchPhase::Exploration, 5)
            .unwrap();
        if sampled.population_origin == Some(2) {
            low += 1;
        }
    }
    assert!(low > 100, "least covered target sampled only {low} times");
}

#[test]
fn test_extract_solution_deduplicates() {
    let mut archive = create_archive();
    archive.add_if_needed(&evaluated(1, 1, &[(1, 1.0), (2, 1.0)]), 5);
    archive.add_if_needed(&evaluated(2, 1, &[(3, 0.4)]), 5);
    archive.add_if_needed(&evaluated(3, 1, &[(3, 0.2)]), 5);

    let solution = archive.extract_solution(TerminationReason::BudgetExhausted);
    let indices: Vec<u64> = solution.individuals.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(solution.coverage.reached, 3);
    assert_eq!(solution.coverage.covered, 2);
    assert_eq!(solution.coverage.best_scores.get(&3), Some(&0.4));
    assert_eq!(solution.termination, TerminationReason::BudgetExhausted);

    archive.clear();
    assert!(archive.is_empty());
    assert_eq!(archive.coverage_summary(), CoverageSummary::default());
}
