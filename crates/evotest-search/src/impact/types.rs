//! Type definitions for impact tracking

use crate::fitness::{FitnessDelta, TargetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mutation history of one gene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactRecord {
    /// Times the gene was mutated and the mutant evaluated
    pub times_selected: u64,
    /// Times the mutant's fitness differed from its parent's
    pub times_with_impact: u64,
    /// Times the mutant's fitness was identical to its parent's
    pub times_no_impact: u64,
    /// Consecutive mutations that improved no target
    pub times_no_improvement: u64,
    /// Impacts counted per target
    pub impact_per_target: BTreeMap<TargetId, u64>,
}

impl ImpactRecord {
    /// Account for one evaluated mutation
    pub fn record(&mut self, delta: &FitnessDelta) {
        self.times_selected += 1;

        if delta.has_impact() {
            self.times_with_impact += 1;
            for target in &delta.impacted {
                *self.impact_per_target.entry(*target).or_insert(0) += 1;
            }
        } else {
            self.times_no_impact += 1;
        }

        if delta.improved.is_empty() {
            self.times_no_improvement += 1;
        } else {
            self.times_no_improvement = 0;
        }
    }

    /// Fraction of mutations that had an impact
    pub fn degree(&self) -> f64 {
        if self.times_selected == 0 {
            0.0
        } else {
            self.times_with_impact as f64 / self.times_selected as f64
        }
    }

    /// Impacts recorded for one target
    pub fn impacts_on(&self, target: TargetId) -> u64 {
        self.impact_per_target.get(&target).copied().unwrap_or(0)
    }
}
