//! Actions: named steps submitted to the fitness function

use crate::error::{GeneError, GeneResult};
use crate::gene::Gene;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One irreducible step of a test, owning its genes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    name: String,
    genes: Vec<Gene>,
}

impl Action {
    /// Create an action from its top-level genes.
    ///
    /// Gene names must be unique within the action: gene paths address
    /// top-level genes by name.
    pub fn new(name: impl Into<String>, genes: Vec<Gene>) -> GeneResult<Self> {
        let name = name.into();
        if let Some(duplicate) = first_duplicate_name(&genes) {
            return Err(GeneError::InvalidStructure {
                reason: format!("action {name} has duplicate gene name {duplicate}"),
            });
        }
        Ok(Self { name, genes })
    }

    /// Action name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level genes
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Mutable top-level genes
    pub fn genes_mut(&mut self) -> &mut [Gene] {
        &mut self.genes
    }

    /// Whether no two top-level genes share a name
    pub fn has_unique_gene_names(&self) -> bool {
        first_duplicate_name(&self.genes).is_none()
    }

    /// Top-level gene by name
    pub fn gene(&self, name: &str) -> Option<&Gene> {
        self.genes.iter().find(|g| g.name() == name)
    }

    /// Sum of the mutation weights of the top-level genes
    pub fn mutation_weight(&self) -> f64 {
        self.genes.iter().map(Gene::mutation_weight).sum()
    }

    /// Same name and pairwise same gene values
    pub fn contains_same_value_as(&self, other: &Action) -> bool {
        self.name == other.name
            && self.genes.len() == other.genes.len()
            && self
                .genes
                .iter()
                .zip(other.genes.iter())
                .all(|(a, b)| a.contains_same_value_as(b))
    }

    /// Whether gene names are unique and every gene lies inside its domain
    pub fn is_locally_valid(&self) -> bool {
        self.has_unique_gene_names() && self.genes.iter().all(Gene::is_locally_valid)
    }
}

fn first_duplicate_name(genes: &[Gene]) -> Option<&str> {
    let mut seen = BTreeSet::new();
    genes
        .iter()
        .map(Gene::name)
        .find(|name| !seen.insert(*name))
}
