//! Search statistics

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters collected during one search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Fitness evaluations started, failed ones included
    pub evaluations: u64,
    /// Evaluations that returned an error
    pub failed_evaluations: u64,
    /// Individuals sampled at random
    pub random_samples: u64,
    /// Elites sampled from the archive
    pub elite_samples: u64,
    /// Mutants produced
    pub mutations: u64,
    /// Mutants produced by structural mutation
    pub structural_mutations: u64,
    /// Archive offers that improved at least one target
    pub archive_improvements: u64,
    /// Wall-clock time of the search
    pub elapsed: Duration,
}

impl SearchStatistics {
    /// Evaluations that produced a fitness value
    pub fn successful_evaluations(&self) -> u64 {
        self.evaluations - self.failed_evaluations
    }

    /// Fraction of evaluations that failed
    pub fn failure_rate(&self) -> f64 {
        if self.evaluations == 0 {
            0.0
        } else {
            self.failed_evaluations as f64 / self.evaluations as f64
        }
    }
}
