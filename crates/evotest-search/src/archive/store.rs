//! Core archive implementation

use crate::{
    config::{FeedbackDirectedSampling, SearchConfig, SecondaryObjective},
    error::{SearchError, SearchResult},
    fitness::{EvaluatedIndividual, TargetId},
};
use evotest_genes::Randomness;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use super::types::{
    Admission, CoverageSummary, SearchPhase, Solution, TargetEntry, TargetState,
    TerminationReason,
};

/// Added to `1 - best score` so covered targets keep a small sampling weight
const EXPLORATION_WEIGHT_FLOOR: f64 = 0.05;

/// Attempts granted to a target that never improved before focused quickest
/// sampling moves on
const QUICKEST_DEFAULT_IMPROVEMENT: u64 = 10;

/// Per-target bounded populations of elite individuals
#[derive(Debug, Clone)]
pub struct Archive {
    /// Populations by target
    targets: BTreeMap<TargetId, TargetEntry>,
    /// Tie-breaker for equal scores
    objective: SecondaryObjective,
    /// Target choice in focused search
    feedback: FeedbackDirectedSampling,
    /// Target chosen by the last sampling
    last_chosen: Option<TargetId>,
}

impl Archive {
    /// Create an empty archive
    pub fn new(objective: SecondaryObjective, feedback: FeedbackDirectedSampling) -> Self {
        Self {
            targets: BTreeMap::new(),
            objective,
            feedback,
            last_chosen: None,
        }
    }

    /// Empty archive using the configured objective and sampling strategy
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.secondary_objective, config.feedback_directed_sampling)
    }

    /// Offer an evaluated individual for every target it reaches.
    ///
    /// `limit` is the current population size bound per target.
    pub fn add_if_needed(&mut self, ei: &EvaluatedIndividual, limit: usize) -> Admission {
        let limit = limit.max(1);
        let mut admission = Admission::default();

        for (target, score) in ei.fitness.iter() {
            if score.score <= 0.0 {
                continue;
            }
            let objective = self.objective;
            let entry = self.targets.entry(target).or_default();

            let outcome = admit(entry, ei, target, limit, objective);
            debug_assert!(outcome.is_ok(), "{outcome:?}");
            let outcome = outcome.unwrap_or_else(|err| {
                tracing::warn!(target_id = target, error = %err, "rejected archive admission");
                Admission::default()
            });

            if outcome.improved {
                entry.report_improvement();
            } else {
                entry.times_not_improved += 1;
            }
            admission.added |= outcome.added;
            admission.improved |= outcome.improved;
        }

        if admission.improved {
            tracing::debug!(
                index = ei.index,
                reached = self.number_of_reached_targets(),
                covered = self.covered_targets().len(),
                "archive improved"
            );
        }
        admission
    }

    /// Whether `ei` reaches a target no archived individual reaches
    pub fn would_reach_new_target(&self, ei: &EvaluatedIndividual) -> bool {
        ei.fitness.reached_targets().into_iter().any(|t| {
            self.targets
                .get(&t)
                .map_or(true, |entry| entry.population.is_empty())
        })
    }

    /// Copy of an elite individual of a target chosen for the given phase
    pub fn sample_individual(
        &mut self,
        rng: &mut Randomness,
        phase: SearchPhase,
        limit: usize,
    ) -> SearchResult<EvaluatedIndividual> {
        let target = self.choose_target(rng, phase)?;
        self.last_chosen = Some(target);

        let objective = self.objective;
        let entry = self
            .targets
            .get_mut(&target)
            .ok_or(SearchError::EmptyArchive)?;
        entry.times_not_improved += 1;
        sort_and_shrink(&mut entry.population, target, limit.max(1), objective);

        let chosen = rng
            .choose(&entry.population)
            .ok_or_else(|| SearchError::ArchiveInconsistency {
                target,
                reason: "sampled target has an empty population".to_string(),
            })?;

        let mut copy = chosen.clone();
        copy.population_origin = Some(target);
        copy.mutated_genes.clear();
        tracing::debug!(target_id = target, index = copy.index, ?phase, "sampled elite");
        Ok(copy)
    }

    fn choose_target(&self, rng: &mut Randomness, phase: SearchPhase) -> SearchResult<TargetId> {
        let reached: Vec<TargetId> = self
            .targets
            .iter()
            .filter(|(_, e)| !e.population.is_empty())
            .map(|(t, _)| *t)
            .collect();
        if reached.is_empty() {
            return Err(SearchError::EmptyArchive);
        }

        match phase {
            SearchPhase::Exploration => {
                let weights: Vec<f64> = reached
                    .iter()
                    .map(|t| {
                        let not_improved = self.times_not_improved(*t) as f64;
                        (1.0 - self.best_score(*t) + EXPLORATION_WEIGHT_FLOOR)
                            / (1.0 + not_improved)
                    })
                    .collect();
                let idx = rng.choose_weighted(&weights).unwrap_or(0);
                Ok(reached[idx])
            }
            SearchPhase::Focused => {
                let mut candidates = self.not_covered_targets();
                if candidates.is_empty() {
                    candidates = reached;
                }
                Ok(self.choose_focused(rng, &candidates))
            }
        }
    }

    fn choose_focused(&self, rng: &mut Randomness, candidates: &[TargetId]) -> TargetId {
        let counter = |t: &TargetId| self.times_not_improved(*t);
        let fewest_attempts = || {
            candidates
                .iter()
                .copied()
                .min_by_key(counter)
                .unwrap_or(candidates[0])
        };

        match self.feedback {
            FeedbackDirectedSampling::Last => fewest_attempts(),
            FeedbackDirectedSampling::None => rng.choose(candidates).copied().unwrap_or(candidates[0]),
            FeedbackDirectedSampling::FocusedQuickest => {
                let last_improvement = |t: &TargetId| {
                    self.targets.get(t).and_then(|e| e.last_improvement)
                };

                if let Some(lc) = self.last_chosen.filter(|lc| candidates.contains(lc)) {
                    let allowed = last_improvement(&lc).unwrap_or(QUICKEST_DEFAULT_IMPROVEMENT) * 2;
                    if counter(&lc) < allowed {
                        return lc;
                    }
                }

                candidates
                    .iter()
                    .copied()
                    .filter_map(|t| last_improvement(&t).map(|li| (t, li)))
                    .filter(|(t, li)| counter(t) < li * 2)
                    .min_by_key(|(_, li)| *li)
                    .map(|(t, _)| t)
                    .unwrap_or_else(fewest_attempts)
            }
        }
    }

    /// Coverage state of `target`
    pub fn target_state(&self, target: TargetId) -> TargetState {
        let best = self.best_score(target);
        if best >= 1.0 {
            TargetState::Covered
        } else if best > 0.0 {
            TargetState::ReachedPartial
        } else {
            TargetState::Unreached
        }
    }

    /// Whether `target` is covered by its single archived individual
    pub fn is_covered(&self, target: TargetId) -> bool {
        self.targets
            .get(&target)
            .map_or(false, |e| is_covered(&e.population, target))
    }

    /// Best archived score on `target`; 0 when unreached
    pub fn best_score(&self, target: TargetId) -> f64 {
        self.targets.get(&target).map_or(0.0, |e| {
            e.population
                .iter()
                .map(|ei| ei.fitness.score(target))
                .fold(0.0, f64::max)
        })
    }

    /// Attempts on `target` since its last improvement
    pub fn times_not_improved(&self, target: TargetId) -> u64 {
        self.targets.get(&target).map_or(0, |e| e.times_not_improved)
    }

    /// Covered targets in ascending order
    pub fn covered_targets(&self) -> Vec<TargetId> {
        self.targets
            .keys()
            .copied()
            .filter(|t| self.is_covered(*t))
            .collect()
    }

    /// Reached but not covered targets in ascending order
    pub fn not_covered_targets(&self) -> Vec<TargetId> {
        self.targets
            .iter()
            .filter(|(t, e)| !e.population.is_empty() && !is_covered(&e.population, **t))
            .map(|(t, _)| *t)
            .collect()
    }

    /// Number of targets with at least one archived individual
    pub fn number_of_reached_targets(&self) -> usize {
        self.targets
            .values()
            .filter(|e| !e.population.is_empty())
            .count()
    }

    /// Archived individuals for `target`
    pub fn population(&self, target: TargetId) -> &[EvaluatedIndividual] {
        self.targets
            .get(&target)
            .map(|e| e.population.as_slice())
            .unwrap_or_default()
    }

    /// Reached, covered and best score per target
    pub fn coverage_summary(&self) -> CoverageSummary {
        let best_scores: BTreeMap<TargetId, f64> = self
            .targets
            .iter()
            .filter(|(_, e)| !e.population.is_empty())
            .map(|(t, _)| (*t, self.best_score(*t)))
            .collect();
        CoverageSummary {
            reached: best_scores.len(),
            covered: best_scores.values().filter(|s| **s >= 1.0).count(),
            best_scores,
        }
    }

    /// Best individual of every reached target, each listed once
    pub fn extract_solution(&self, termination: TerminationReason) -> Solution {
        let mut seen = BTreeSet::new();
        let mut individuals = Vec::new();

        for (target, entry) in &self.targets {
            let best = entry
                .population
                .iter()
                .max_by(|a, b| compare_members(a, b, *target, self.objective));
            if let Some(best) = best {
                if seen.insert(best.index) {
                    individuals.push(best.clone());
                }
            }
        }
        individuals.sort_by_key(|ei| ei.index);

        Solution {
            individuals,
            coverage: self.coverage_summary(),
            termination,
        }
    }

    /// Remove every individual and all bookkeeping
    pub fn clear(&mut self) {
        self.targets.clear();
        self.last_chosen = None;
    }

    /// Whether no individual is archived
    pub fn is_empty(&self) -> bool {
        self.targets.values().all(|e| e.population.is_empty())
    }
}

fn is_covered(population: &[EvaluatedIndividual], target: TargetId) -> bool {
    population.len() == 1 && population[0].fitness.does_cover(target)
}

/// `Greater` when `a` is the better member for `target`: higher score, then
/// secondary objective, then more recent
fn compare_members(
    a: &EvaluatedIndividual,
    b: &EvaluatedIndividual,
    target: TargetId,
    objective: SecondaryObjective,
) -> Ordering {
    let (sa, sb) = (a.fitness.score(target), b.fitness.score(target));
    sa.total_cmp(&sb)
        .then_with(|| {
            if a.fitness.better_than(target, &b.fitness, objective) {
                Ordering::Greater
            } else if b.fitness.better_than(target, &a.fitness, objective) {
                Ordering::Less
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.index.cmp(&b.index))
}

/// Sort worst first and drop the worst members beyond `limit`
fn sort_and_shrink(
    population: &mut Vec<EvaluatedIndividual>,
    target: TargetId,
    limit: usize,
    objective: SecondaryObjective,
) {
    population.sort_by(|a, b| compare_members(a, b, target, objective));
    if population.len() > limit {
        let excess = population.len() - limit;
        population.drain(..excess);
    }
}

fn admit(
    entry: &mut TargetEntry,
    ei: &EvaluatedIndividual,
    target: TargetId,
    limit: usize,
    objective: SecondaryObjective,
) -> SearchResult<Admission> {
    let population = &mut entry.population;
    let candidate_covers = ei.fitness.does_cover(target);

    if population.is_empty() {
        population.push(ei.clone());
        return Ok(Admission {
            added: true,
            improved: true,
        });
    }

    if is_covered(population, target) {
        if !candidate_covers {
            return Ok(Admission::default());
        }
        let current = &population[0];
        let shorter = ei.size() < current.size();
        let same_length_higher_score = ei.size() == current.size()
            && ei.fitness.compute_fitness_score() > current.fitness.compute_fitness_score();
        if shorter || same_length_higher_score {
            replace(population, 0, ei, target)?;
            return Ok(Admission {
                added: true,
                improved: true,
            });
        }
        return Ok(Admission::default());
    }

    if candidate_covers {
        population.clear();
        population.push(ei.clone());
        return Ok(Admission {
            added: true,
            improved: true,
        });
    }

    sort_and_shrink(population, target, limit, objective);

    let worst = &population[0];
    let better = ei.fitness.better_than(target, &worst.fitness, objective);
    let equivalent = ei.fitness.equivalent(target, &worst.fitness, objective);

    if population.len() < limit {
        population.push(ei.clone());
        return Ok(Admission {
            added: true,
            improved: better,
        });
    }

    if better || equivalent {
        replace(population, 0, ei, target)?;
        return Ok(Admission {
            added: true,
            improved: better,
        });
    }

    Ok(Admission::default())
}

/// Overwrite a member, refusing to lower the score of a covered target
fn replace(
    population: &mut [EvaluatedIndividual],
    idx: usize,
    ei: &EvaluatedIndividual,
    target: TargetId,
) -> SearchResult<()> {
    let covered = is_covered(population, target);
    if covered && !ei.fitness.does_cover(target) {
        return Err(SearchError::ArchiveInconsistency {
            target,
            reason: format!(
                "candidate {} would regress a covered target to {}",
                ei.index,
                ei.fitness.score(target)
            ),
        });
    }
    population[idx] = ei.clone();
    Ok(())
}
