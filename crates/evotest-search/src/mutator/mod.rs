//! Mutation of evaluated individuals
//!
//! A mutation either edits the action list through the injected
//! [`StructureMutator`](crate::sampler::StructureMutator) or changes the values
//! of a subset of the mutable genes. Which genes are picked is decided by a
//! [`GeneSelector`], one implementation per
//! [`GeneSelectionStrategy`](crate::config::GeneSelectionStrategy).

mod selection;
mod standard;

pub use selection::{selector_for, GeneSelector, ImpactWeightedGeneSelector, UniformGeneSelector};
pub use standard::{MutatedIndividual, MutationInput, Mutator, StandardMutator};
