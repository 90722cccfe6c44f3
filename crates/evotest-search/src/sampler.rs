//! Collaborators that create individuals and change their action lists

use crate::config::SearchConfig;
use crate::error::SearchResult;
use evotest_genes::{Action, Individual, Randomness};

/// Creates brand-new individuals
pub trait Sampler: Send {
    /// Sample a new individual at random
    fn sample_at_random(&mut self, rng: &mut Randomness) -> SearchResult<Individual>;

    /// Sample a single fresh main action, used by structural mutation
    fn sample_action(&mut self, _rng: &mut Randomness) -> Option<Action> {
        None
    }
}

/// Changes the action list of an individual
pub trait StructureMutator: Send {
    /// Mutate the structure in place; returns whether anything changed
    fn mutate_structure(
        &mut self,
        individual: &mut Individual,
        sampler: &mut dyn Sampler,
        rng: &mut Randomness,
    ) -> SearchResult<bool>;
}

/// Structure mutator that never changes anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStructureMutation;

impl StructureMutator for NoStructureMutation {
    fn mutate_structure(
        &mut self,
        _individual: &mut Individual,
        _sampler: &mut dyn Sampler,
        _rng: &mut Randomness,
    ) -> SearchResult<bool> {
        Ok(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceEdit {
    Insert,
    Remove,
    Swap,
    Duplicate,
}

/// Inserts, removes, swaps and duplicates main actions, keeping the size in
/// `[1, max_test_size]`
#[derive(Debug, Clone)]
pub struct ActionSequenceMutator {
    max_test_size: usize,
}

impl ActionSequenceMutator {
    /// Create a mutator bounded by `max_test_size` main actions
    pub fn new(max_test_size: usize) -> Self {
        Self {
            max_test_size: max_test_size.max(1),
        }
    }

    /// Mutator bounded by the configured `max_test_size`
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.max_test_size)
    }

    fn apply(
        &self,
        edit: SequenceEdit,
        individual: &mut Individual,
        sampler: &mut dyn Sampler,
        rng: &mut Randomness,
    ) -> SearchResult<bool> {
        let size = individual.size();
        match edit {
            SequenceEdit::Insert => match sampler.sample_action(rng) {
                Some(action) => {
                    let idx = rng.next_usize(0, size);
                    individual.insert_action(idx, action)?;
                    Ok(true)
                }
                None => Ok(false),
            },
            SequenceEdit::Remove => {
                let idx = rng.next_usize(0, size - 1);
                individual.remove_action(idx)?;
                Ok(true)
            }
            SequenceEdit::Swap => {
                let i = rng.next_usize(0, size - 1);
                let mut j = rng.next_usize(0, size - 2);
                if j >= i {
                    j += 1;
                }
                individual.swap_actions(i, j)?;
                Ok(true)
            }
            SequenceEdit::Duplicate => {
                let idx = rng.next_usize(0, size - 1);
                let copy = individual.main_actions()[idx].clone();
                individual.insert_action(idx + 1, copy)?;
                Ok(true)
            }
        }
    }
}

impl StructureMutator for ActionSequenceMutator {
    fn mutate_structure(
        &mut self,
        individual: &mut Individual,
        sampler: &mut dyn Sampler,
        rng: &mut Randomness,
    ) -> SearchResult<bool> {
        let size = individual.size();
        let mut edits = Vec::with_capacity(4);
        if size < self.max_test_size {
            edits.push(SequenceEdit::Insert);
            if size > 0 {
                edits.push(SequenceEdit::Duplicate);
            }
        }
        if size > 1 {
            edits.push(SequenceEdit::Remove);
            edits.push(SequenceEdit::Swap);
        }
        rng.shuffle(&mut edits);

        for edit in edits {
            if self.apply(edit, individual, sampler, rng)? {
                tracing::trace!(?edit, size = individual.size(), "structural mutation");
                return Ok(true);
            }
        }
        Ok(false)
    }
}
