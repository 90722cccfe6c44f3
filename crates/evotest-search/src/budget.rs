//! Search budget accounting

use crate::config::{SearchConfig, StoppingCriterion};
use std::time::{Duration, Instant};

/// Tracks how much of the search budget has been used
#[derive(Debug, Clone)]
pub struct SearchTimeController {
    criterion: StoppingCriterion,
    budget: u64,
    evaluated_individuals: u64,
    covered_targets: usize,
    start: Instant,
}

impl SearchTimeController {
    /// Create a controller for `budget` units of `criterion`
    pub fn new(criterion: StoppingCriterion, budget: u64) -> Self {
        Self {
            criterion,
            budget,
            evaluated_individuals: 0,
            covered_targets: 0,
            start: Instant::now(),
        }
    }

    /// Controller matching the configured stopping criterion
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.stopping_criterion, config.budget)
    }

    /// Restart counting from zero
    pub fn reset(&mut self) {
        self.evaluated_individuals = 0;
        self.covered_targets = 0;
        self.start = Instant::now();
    }

    /// Account for one fitness evaluation, failed or not
    pub fn report_executed_individual(&mut self) {
        self.evaluated_individuals += 1;
    }

    /// Update the number of covered targets
    pub fn report_covered_targets(&mut self, covered: usize) {
        self.covered_targets = covered;
    }

    /// Whether another evaluation may start
    pub fn should_continue_search(&self) -> bool {
        match self.criterion {
            StoppingCriterion::Evaluations => self.evaluated_individuals < self.budget,
            StoppingCriterion::Time => self.elapsed() < Duration::from_secs(self.budget),
            StoppingCriterion::TargetCoverage => (self.covered_targets as u64) < self.budget,
        }
    }

    /// Used fraction of the budget in `[0, 1]`
    pub fn percentage_used_budget(&self) -> f64 {
        if self.budget == 0 {
            return 1.0;
        }
        let used = match self.criterion {
            StoppingCriterion::Evaluations => self.evaluated_individuals as f64,
            StoppingCriterion::Time => self.elapsed().as_secs_f64(),
            StoppingCriterion::TargetCoverage => self.covered_targets as f64,
        };
        (used / self.budget as f64).clamp(0.0, 1.0)
    }

    /// Evaluations performed since the last reset
    pub fn evaluated_individuals(&self) -> u64 {
        self.evaluated_individuals
    }

    /// Time since the last reset
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
