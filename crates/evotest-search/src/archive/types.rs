//! Type definitions for the archive

use crate::fitness::{EvaluatedIndividual, TargetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coverage state of one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    /// No archived individual has a positive score
    Unreached,
    /// Best score in `(0, 1)`
    ReachedPartial,
    /// Best score is 1; the target is frozen
    Covered,
}

/// Phase of the search, driving target selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPhase {
    /// Exploration: every reached target may be sampled
    Exploration,
    /// Focused search: only not covered targets are sampled
    Focused,
}

/// Outcome of offering an individual to the archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Admission {
    /// Stored in at least one target population
    pub added: bool,
    /// Improved at least one target
    pub improved: bool,
}

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The configured budget was used up
    BudgetExhausted,
    /// Every reached target is covered
    AllTargetsCovered,
}

/// Coverage statistics of an archive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Targets with a positive best score
    pub reached: usize,
    /// Targets with best score 1
    pub covered: usize,
    /// Best score per reached target
    pub best_scores: BTreeMap<TargetId, f64>,
}

/// Final snapshot of the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Best individual of every reached target, deduplicated, oldest first
    pub individuals: Vec<EvaluatedIndividual>,
    /// Coverage statistics
    pub coverage: CoverageSummary,
    /// Why the search stopped
    pub termination: TerminationReason,
}

/// Per-target population and sampling bookkeeping
#[derive(Debug, Clone, Default)]
pub(crate) struct TargetEntry {
    /// Sorted worst first once shrunk
    pub population: Vec<EvaluatedIndividual>,
    /// Attempts since the last improvement
    pub times_not_improved: u64,
    /// Value of `times_not_improved` when the last improvement happened
    pub last_improvement: Option<u64>,
}

impl TargetEntry {
    pub fn report_improvement(&mut self) {
        self.last_improvement = Some(self.times_not_improved);
        self.times_not_improved = 0;
    }
}
