//! Standard mutation operator

use super::selection::{selector_for, GeneSelector};
use crate::config::SearchConfig;
use crate::error::SearchResult;
use crate::fitness::EvaluatedIndividual;
use crate::impact::ImpactStore;
use crate::sampler::{Sampler, StructureMutator};
use evotest_genes::{GenePath, Individual, MutationContext, Randomness};

/// Everything a mutation may read or drive besides the parent itself
pub struct MutationInput<'a> {
    /// Search randomness
    pub rng: &'a mut Randomness,
    /// Impact history of the current search
    pub impacts: &'a ImpactStore,
    /// Source of fresh actions for structural mutation
    pub sampler: &'a mut dyn Sampler,
    /// Action list mutation
    pub structure_mutator: &'a mut dyn StructureMutator,
    /// Bounds of local value mutation
    pub gene_context: MutationContext,
}

/// A mutated copy of a parent, not yet evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct MutatedIndividual {
    /// The copy
    pub individual: Individual,
    /// Genes whose value was mutated; empty for structural mutations
    pub mutated_genes: Vec<GenePath>,
    /// Whether the action list was changed
    pub structural: bool,
}

/// Produces a mutant from an evaluated parent
pub trait Mutator: Send + Sync {
    /// Mutate a copy of `parent`; the parent is never modified
    fn mutate(
        &self,
        parent: &EvaluatedIndividual,
        input: &mut MutationInput<'_>,
    ) -> SearchResult<MutatedIndividual>;
}

/// Structure mutation with a fixed probability, value mutation otherwise.
///
/// Structural results longer than `max_test_size` main actions are dropped
/// and a value mutation of the parent is made instead.
pub struct StandardMutator {
    selector: Box<dyn GeneSelector>,
    probability_of_structure_mutation: f64,
    max_test_size: usize,
}

impl StandardMutator {
    /// Create a mutator with an explicit selector
    pub fn new(selector: Box<dyn GeneSelector>, probability_of_structure_mutation: f64) -> Self {
        Self {
            selector,
            probability_of_structure_mutation,
            max_test_size: SearchConfig::default().max_test_size,
        }
    }

    /// Set the largest accepted number of main actions
    pub fn with_max_test_size(mut self, max_test_size: usize) -> Self {
        self.max_test_size = max_test_size;
        self
    }

    /// Mutator using the configured selection strategy and size bound
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            selector_for(config.gene_selection_strategy),
            config.probability_of_structure_mutation,
        )
        .with_max_test_size(config.max_test_size)
    }
}

impl Mutator for StandardMutator {
    fn mutate(
        &self,
        parent: &EvaluatedIndividual,
        input: &mut MutationInput<'_>,
    ) -> SearchResult<MutatedIndividual> {
        let mut individual = parent.individual.clone();

        if input.rng.next_bool_with(self.probability_of_structure_mutation)
            && input.structure_mutator.mutate_structure(
                &mut individual,
                &mut *input.sampler,
                &mut *input.rng,
            )?
        {
            if individual.size() <= self.max_test_size {
                individual.verify_validity()?;
                return Ok(MutatedIndividual {
                    individual,
                    mutated_genes: Vec::new(),
                    structural: true,
                });
            }
            tracing::debug!(
                index = parent.index,
                size = individual.size(),
                max_test_size = self.max_test_size,
                "structural mutation exceeds size bound, mutating values instead"
            );
            individual = parent.individual.clone();
        }

        let candidates = individual.mutable_gene_paths();
        if candidates.is_empty() {
            tracing::trace!(index = parent.index, "no mutable genes, returning copy");
            return Ok(MutatedIndividual {
                individual,
                mutated_genes: Vec::new(),
                structural: false,
            });
        }

        let selected = self.selector.select(&candidates, input.impacts, input.rng);
        for path in &selected {
            individual
                .gene_mut(path)?
                .mutate(input.rng, &input.gene_context)?;
        }
        individual.verify_validity()?;

        tracing::trace!(
            index = parent.index,
            candidates = candidates.len(),
            selected = selected.len(),
            "value mutation"
        );
        Ok(MutatedIndividual {
            individual,
            mutated_genes: selected,
            structural: false,
        })
    }
}
