//! Sentinel genes that never change value

use super::{GeneValue, MutationContext};
use crate::error::{GeneError, GeneResult};
use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

// Variants do not know the name of the gene wrapping them
const HOLDER_LABEL: &str = "immutable holder";
const CYCLE_LABEL: &str = "cycle placeholder";

/// Snapshot of a value that is materialized elsewhere, e.g. a resolved foreign key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmutableHolderGene {
    value: String,
}

impl ImmutableHolderGene {
    pub(crate) fn new(value: String) -> Self {
        Self { value }
    }

    /// Held value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl GeneValue for ImmutableHolderGene {
    fn randomize(&mut self, _rng: &mut Randomness, _force_new_value: bool) -> GeneResult<()> {
        Err(GeneError::ImmutableGene {
            name: HOLDER_LABEL.to_string(),
        })
    }

    fn mutate(&mut self, _rng: &mut Randomness, _ctx: &MutationContext) -> GeneResult<()> {
        Err(GeneError::ImmutableGene {
            name: HOLDER_LABEL.to_string(),
        })
    }

    fn mutation_weight(&self) -> f64 {
        0.0
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.value == other.value
    }

    fn is_locally_valid(&self) -> bool {
        true
    }

    fn value_string(&self) -> GeneResult<String> {
        Ok(self.value.clone())
    }
}

/// Marks a reference that would close a cycle in the data model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleGene {
    target: String,
}

impl CycleGene {
    pub(crate) fn new(target: String) -> Self {
        Self { target }
    }

    /// Name of the type the cycle points back to
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl GeneValue for CycleGene {
    fn randomize(&mut self, _rng: &mut Randomness, _force_new_value: bool) -> GeneResult<()> {
        Err(GeneError::CycleMaterialization {
            name: CYCLE_LABEL.to_string(),
        })
    }

    fn mutate(&mut self, _rng: &mut Randomness, _ctx: &MutationContext) -> GeneResult<()> {
        Err(GeneError::CycleMaterialization {
            name: CYCLE_LABEL.to_string(),
        })
    }

    fn mutation_weight(&self) -> f64 {
        0.0
    }

    fn contains_same_value_as(&self, other: &Self) -> bool {
        self.target == other.target
    }

    fn is_locally_valid(&self) -> bool {
        true
    }

    fn value_string(&self) -> GeneResult<String> {
        Err(GeneError::CycleMaterialization {
            name: CYCLE_LABEL.to_string(),
        })
    }
}
