//! Fitness contracts between the search and the system under test

use crate::config::SecondaryObjective;
use crate::error::{SearchError, SearchResult};
use async_trait::async_trait;
use evotest_genes::{GenePath, Individual};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Identifier of a testing objective
pub type TargetId = u32;

/// Score reached on one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetScore {
    /// Heuristic score in `[0, 1]`; 1 means covered
    pub score: f64,
    /// Main action responsible for the score, if known
    pub action_index: Option<usize>,
}

/// Targets whose score changed between two evaluations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessDelta {
    /// Targets whose score differs, including newly reached ones
    pub impacted: Vec<TargetId>,
    /// Targets whose score went up
    pub improved: Vec<TargetId>,
}

impl FitnessDelta {
    /// Whether anything changed
    pub fn has_impact(&self) -> bool {
        !self.impacted.is_empty()
    }
}

/// Result of evaluating one individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessValue {
    targets: BTreeMap<TargetId, TargetScore>,
    size: usize,
}

/// `Greater` when a test of length `a` beats one of length `b`
fn compare_secondary(a: usize, b: usize, objective: SecondaryObjective) -> Ordering {
    match objective {
        SecondaryObjective::TestLengthMin => b.cmp(&a),
    }
}

impl FitnessValue {
    /// Empty fitness for an individual of `size` main actions
    pub fn new(size: usize) -> Self {
        Self {
            targets: BTreeMap::new(),
            size,
        }
    }

    /// Record a score for `target`, keeping the highest one seen
    pub fn update_target(
        &mut self,
        target: TargetId,
        score: f64,
        action_index: Option<usize>,
    ) -> SearchResult<()> {
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(SearchError::InvalidScore { target, score });
        }
        match self.targets.get(&target) {
            Some(current) if current.score >= score => {}
            _ => {
                self.targets.insert(
                    target,
                    TargetScore {
                        score,
                        action_index,
                    },
                );
            }
        }
        Ok(())
    }

    /// Score on `target`; 0 when never reached
    pub fn score(&self, target: TargetId) -> f64 {
        self.targets.get(&target).map_or(0.0, |t| t.score)
    }

    /// Action responsible for the score on `target`
    pub fn action_index(&self, target: TargetId) -> Option<usize> {
        self.targets.get(&target).and_then(|t| t.action_index)
    }

    /// Whether `target` is fully covered
    pub fn does_cover(&self, target: TargetId) -> bool {
        self.score(target) >= 1.0
    }

    /// Targets with score 1
    pub fn covered_targets(&self) -> Vec<TargetId> {
        self.targets
            .iter()
            .filter(|(_, t)| t.score >= 1.0)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Targets with a positive score
    pub fn reached_targets(&self) -> Vec<TargetId> {
        self.targets
            .iter()
            .filter(|(_, t)| t.score > 0.0)
            .map(|(id, _)| *id)
            .collect()
    }

    /// All recorded scores
    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &TargetScore)> {
        self.targets.iter().map(|(id, t)| (*id, t))
    }

    /// Sum of all scores
    pub fn compute_fitness_score(&self) -> f64 {
        self.targets.values().map(|t| t.score).sum()
    }

    /// Number of main actions of the evaluated individual
    pub fn size(&self) -> usize {
        self.size
    }

    /// Higher score on `target`, or same score and better secondary objective
    pub fn better_than(
        &self,
        target: TargetId,
        other: &FitnessValue,
        objective: SecondaryObjective,
    ) -> bool {
        let (a, b) = (self.score(target), other.score(target));
        a > b || (a == b && compare_secondary(self.size, other.size, objective).is_gt())
    }

    /// Same score on `target` and same secondary objective
    pub fn equivalent(
        &self,
        target: TargetId,
        other: &FitnessValue,
        objective: SecondaryObjective,
    ) -> bool {
        self.score(target) == other.score(target)
            && compare_secondary(self.size, other.size, objective).is_eq()
    }

    /// At least as good as `other` on every target of `targets`, with ties
    /// decided by the secondary objective
    pub fn subsumes(
        &self,
        other: &FitnessValue,
        targets: &[TargetId],
        objective: SecondaryObjective,
    ) -> bool {
        targets.iter().all(|&t| {
            let (a, b) = (self.score(t), other.score(t));
            a > b || (a == b && compare_secondary(self.size, other.size, objective).is_ge())
        })
    }

    /// Targets that changed relative to `previous`
    pub fn diff(&self, previous: &FitnessValue) -> FitnessDelta {
        let mut delta = FitnessDelta::default();
        let ids: BTreeSet<TargetId> = self
            .targets
            .keys()
            .chain(previous.targets.keys())
            .copied()
            .collect();
        for id in ids {
            let (now, before) = (self.score(id), previous.score(id));
            if now != before {
                delta.impacted.push(id);
            }
            if now > before {
                delta.improved.push(id);
            }
        }
        delta
    }
}

/// An individual together with how it scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedIndividual {
    /// Evaluated test
    pub individual: Individual,
    /// Its fitness
    pub fitness: FitnessValue,
    /// Evaluation counter value when it was scored; higher is more recent
    pub index: u64,
    /// Target whose population the parent was sampled from
    pub population_origin: Option<TargetId>,
    /// Genes changed to produce this individual from its parent
    pub mutated_genes: Vec<GenePath>,
}

impl EvaluatedIndividual {
    /// Freshly sampled individual
    pub fn new(individual: Individual, fitness: FitnessValue, index: u64) -> Self {
        Self {
            individual,
            fitness,
            index,
            population_origin: None,
            mutated_genes: Vec::new(),
        }
    }

    /// Number of main actions
    pub fn size(&self) -> usize {
        self.individual.size()
    }
}

/// Scores individuals against the system under test.
///
/// An `Err` means the evaluation failed: the individual is discarded and no
/// information is gained, but the evaluation still consumes budget.
#[async_trait]
pub trait FitnessFunction: Send {
    /// Evaluate one individual
    async fn evaluate(&mut self, individual: &Individual) -> SearchResult<FitnessValue>;
}
