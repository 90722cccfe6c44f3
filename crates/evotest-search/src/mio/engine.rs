//! MIO search engine implementation

use crate::{
    archive::{Admission, Archive, SearchPhase, Solution, TerminationReason},
    budget::SearchTimeController,
    config::SearchConfig,
    control::AdaptiveParameterControl,
    error::SearchResult,
    fitness::{EvaluatedIndividual, FitnessFunction, TargetId},
    impact::ImpactStore,
    metrics::SearchStatistics,
    mutator::{MutationInput, Mutator, StandardMutator},
    sampler::{Sampler, StructureMutator},
};
use evotest_genes::{Individual, MutationContext, Randomness};
use std::collections::BTreeSet;

/// MIO search over individuals produced by `S`, scored by `F` and
/// structurally mutated by `M`
pub struct MioAlgorithm<S, F, M> {
    config: SearchConfig,
    sampler: S,
    fitness: F,
    structure_mutator: M,
    mutator: Box<dyn Mutator>,
    control: AdaptiveParameterControl,
    archive: Archive,
    impacts: ImpactStore,
    budget: SearchTimeController,
    rng: Randomness,
    statistics: SearchStatistics,
    evaluation_index: u64,
}

impl<S, F, M> MioAlgorithm<S, F, M>
where
    S: Sampler,
    F: FitnessFunction,
    M: StructureMutator,
{
    /// Create a new search
    pub fn new(
        config: SearchConfig,
        sampler: S,
        fitness: F,
        structure_mutator: M,
    ) -> SearchResult<Self> {
        config.validate()?;

        Ok(Self {
            mutator: Box::new(StandardMutator::from_config(&config)),
            control: AdaptiveParameterControl::from_config(&config),
            archive: Archive::from_config(&config),
            impacts: ImpactStore::new(),
            budget: SearchTimeController::from_config(&config),
            rng: Randomness::new(config.seed),
            statistics: SearchStatistics::default(),
            evaluation_index: 0,
            config,
            sampler,
            fitness,
            structure_mutator,
        })
    }

    /// Replace the mutation operator
    pub fn with_mutator(mut self, mutator: impl Mutator + 'static) -> Self {
        self.mutator = Box::new(mutator);
        self
    }

    /// Replace the parameter schedules
    pub fn with_parameter_control(mut self, control: AdaptiveParameterControl) -> Self {
        self.control = control;
        self
    }

    /// Run a complete search from a clean state
    pub async fn search(&mut self) -> SearchResult<Solution> {
        self.archive.clear();
        self.impacts.reset();
        self.budget.reset();
        self.rng.reset(self.config.seed);
        self.statistics = SearchStatistics::default();
        self.evaluation_index = 0;

        tracing::info!(
            seed = self.config.seed,
            budget = self.config.budget,
            criterion = ?self.config.stopping_criterion,
            "starting MIO search"
        );

        let termination = loop {
            if !self.budget.should_continue_search() {
                break TerminationReason::BudgetExhausted;
            }
            if self.config.stop_when_all_targets_covered && self.all_targets_covered() {
                break TerminationReason::AllTargetsCovered;
            }
            self.search_once().await?;
        };

        self.statistics.elapsed = self.budget.elapsed();
        let solution = self.archive.extract_solution(termination);
        tracing::info!(
            ?termination,
            evaluations = self.statistics.evaluations,
            reached = solution.coverage.reached,
            covered = solution.coverage.covered,
            tests = solution.individuals.len(),
            "MIO search finished"
        );
        Ok(solution)
    }

    /// One iteration: either sample a new individual or mutate an elite
    pub async fn search_once(&mut self) -> SearchResult<()> {
        let used = self.budget.percentage_used_budget();
        let phase = if self.control.is_focused(used) {
            SearchPhase::Focused
        } else {
            SearchPhase::Exploration
        };
        let p_random = self.control.probability_of_random_sampling(used);

        if self.archive.is_empty() || self.rng.next_bool_with(p_random) {
            let individual = self.sampler.sample_at_random(&mut self.rng)?;
            individual.verify_validity()?;
            self.statistics.random_samples += 1;
            if let Some(ei) = self.evaluate(individual).await {
                self.offer(&ei);
            }
            return Ok(());
        }

        let limit = self.control.archive_target_limit(used);
        let parent = self.archive.sample_individual(&mut self.rng, phase, limit)?;
        self.statistics.elite_samples += 1;
        let k = self.control.max_mutations(used);
        self.mutate_and_save(k, parent).await
    }

    /// Chain up to `k` mutations from `parent`, offering every new running
    /// best to the archive
    pub async fn mutate_and_save(
        &mut self,
        k: usize,
        parent: EvaluatedIndividual,
    ) -> SearchResult<()> {
        let objective = self.config.secondary_objective;
        let mut current = parent;

        for _ in 0..k {
            if !self.budget.should_continue_search() {
                break;
            }

            let used = self.budget.percentage_used_budget();
            let mut input = MutationInput {
                rng: &mut self.rng,
                impacts: &self.impacts,
                sampler: &mut self.sampler,
                structure_mutator: &mut self.structure_mutator,
                gene_context: MutationContext {
                    max_delta_exponent: self.control.delta_exponent(used),
                    probability_of_randomization: self.config.probability_of_gene_randomization,
                },
            };
            let mutated = self.mutator.mutate(&current, &mut input)?;
            self.statistics.mutations += 1;
            if mutated.structural {
                self.statistics.structural_mutations += 1;
            }

            let Some(mut mutant) = self.evaluate(mutated.individual).await else {
                continue;
            };
            mutant.population_origin = current.population_origin;
            mutant.mutated_genes = mutated.mutated_genes;

            if !mutant.mutated_genes.is_empty() {
                let delta = mutant.fitness.diff(&current.fitness);
                self.impacts.record(&mutant.mutated_genes, &delta);
            }

            let reach_new = self.archive.would_reach_new_target(&mutant);
            let targets: Vec<TargetId> = current
                .fitness
                .reached_targets()
                .into_iter()
                .chain(mutant.fitness.reached_targets())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let not_worse =
                reach_new || !current.fitness.subsumes(&mutant.fitness, &targets, objective);

            if not_worse {
                self.offer(&mutant);
                current = mutant;
            }
        }
        Ok(())
    }

    /// Score one individual; failed evaluations are logged and discarded
    async fn evaluate(&mut self, individual: Individual) -> Option<EvaluatedIndividual> {
        self.budget.report_executed_individual();
        self.evaluation_index += 1;
        self.statistics.evaluations += 1;
        let index = self.evaluation_index;

        let result = self.fitness.evaluate(&individual).await;
        self.log_progress();

        match result {
            Ok(fitness) => Some(EvaluatedIndividual::new(individual, fitness, index)),
            Err(err) => {
                self.statistics.failed_evaluations += 1;
                tracing::warn!(index, error = %err, "fitness evaluation failed, discarding");
                None
            }
        }
    }

    fn offer(&mut self, ei: &EvaluatedIndividual) -> Admission {
        let limit = self
            .control
            .archive_target_limit(self.budget.percentage_used_budget());
        let admission = self.archive.add_if_needed(ei, limit);
        if admission.improved {
            self.statistics.archive_improvements += 1;
        }
        self.budget
            .report_covered_targets(self.archive.covered_targets().len());
        admission
    }

    fn log_progress(&self) {
        let interval = self.config.logging.log_interval;
        if interval == 0 || self.statistics.evaluations % interval != 0 {
            return;
        }
        tracing::info!(
            evaluations = self.statistics.evaluations,
            used_budget = self.budget.percentage_used_budget(),
            reached = self.archive.number_of_reached_targets(),
            covered = self.archive.covered_targets().len(),
            "search progress"
        );
    }

    fn all_targets_covered(&self) -> bool {
        !self.archive.is_empty() && self.archive.not_covered_targets().is_empty()
    }

    /// Configuration of this search
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Archive of the current or last search
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Impact history of the current or last search
    pub fn impacts(&self) -> &ImpactStore {
        &self.impacts
    }

    /// Statistics of the current or last search
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Budget accounting of the current or last search
    pub fn budget(&self) -> &SearchTimeController {
        &self.budget
    }
}
