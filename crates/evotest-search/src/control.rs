//! Adaptive parameter control
//!
//! Search parameters move from exploration values to focused-search values as
//! the budget is consumed. Progress is the used budget divided by the focused
//! search activation fraction, clamped to `[0, 1]`; at 1 the search is focused
//! and every parameter sits at its final value.

use crate::config::SearchConfig;

/// A parameter value as a function of search progress in `[0, 1]`
pub trait Schedule: Send + Sync {
    /// Value at `progress`
    fn value_at(&self, progress: f64) -> f64;
}

impl<F> Schedule for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn value_at(&self, progress: f64) -> f64 {
        self(progress)
    }
}

/// Straight line from `start` at progress 0 to `end` at progress 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSchedule {
    start: f64,
    end: f64,
}

impl LinearSchedule {
    /// Create a linear schedule
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Schedule that never changes
    pub fn constant(value: f64) -> Self {
        Self::new(value, value)
    }
}

impl Schedule for LinearSchedule {
    fn value_at(&self, progress: f64) -> f64 {
        self.start + (self.end - self.start) * progress.clamp(0.0, 1.0)
    }
}

/// Computes the current search parameters from budget usage
pub struct AdaptiveParameterControl {
    focused_activation_fraction: f64,
    random_sampling: Box<dyn Schedule>,
    mutations: Box<dyn Schedule>,
    archive_limit: Box<dyn Schedule>,
    delta_exponent: Box<dyn Schedule>,
}

impl AdaptiveParameterControl {
    /// Linear schedules between the configured start and focused values
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            focused_activation_fraction: config.focused_search_activation_fraction,
            random_sampling: Box::new(LinearSchedule::new(
                config.initial_probability_of_random_sampling,
                config.min_probability_of_random_sampling,
            )),
            mutations: Box::new(LinearSchedule::new(
                1.0,
                config.max_mutations_per_individual as f64,
            )),
            archive_limit: Box::new(LinearSchedule::new(
                config.population_size_per_target as f64,
                config.focused_population_size_per_target as f64,
            )),
            delta_exponent: Box::new(LinearSchedule::constant(
                config.max_delta_exponent as f64,
            )),
        }
    }

    /// Replace the random sampling probability schedule
    pub fn with_random_sampling_schedule(mut self, schedule: impl Schedule + 'static) -> Self {
        self.random_sampling = Box::new(schedule);
        self
    }

    /// Replace the mutation count schedule
    pub fn with_mutations_schedule(mut self, schedule: impl Schedule + 'static) -> Self {
        self.mutations = Box::new(schedule);
        self
    }

    /// Replace the archive population limit schedule
    pub fn with_archive_limit_schedule(mut self, schedule: impl Schedule + 'static) -> Self {
        self.archive_limit = Box::new(schedule);
        self
    }

    /// Replace the numeric delta exponent schedule
    pub fn with_delta_exponent_schedule(mut self, schedule: impl Schedule + 'static) -> Self {
        self.delta_exponent = Box::new(schedule);
        self
    }

    /// Progress in `[0, 1]` given the used fraction of the budget
    pub fn progress(&self, used_budget: f64) -> f64 {
        if self.focused_activation_fraction <= 0.0 {
            return 1.0;
        }
        (used_budget / self.focused_activation_fraction).clamp(0.0, 1.0)
    }

    /// Whether focused search has started
    pub fn is_focused(&self, used_budget: f64) -> bool {
        self.progress(used_budget) >= 1.0
    }

    /// Probability of sampling a new individual instead of mutating an elite
    pub fn probability_of_random_sampling(&self, used_budget: f64) -> f64 {
        self.random_sampling
            .value_at(self.progress(used_budget))
            .clamp(0.0, 1.0)
    }

    /// Length of the mutation chain applied to a sampled elite
    pub fn max_mutations(&self, used_budget: f64) -> usize {
        round_at_least_one(self.mutations.value_at(self.progress(used_budget)))
    }

    /// Population limit per target
    pub fn archive_target_limit(&self, used_budget: f64) -> usize {
        round_at_least_one(self.archive_limit.value_at(self.progress(used_budget)))
    }

    /// Largest exponent of the power-of-two numeric mutation step
    pub fn delta_exponent(&self, used_budget: f64) -> u32 {
        let value = self.delta_exponent.value_at(self.progress(used_budget));
        if value.is_finite() && value > 0.0 {
            value.round().min(u32::MAX as f64) as u32
        } else {
            0
        }
    }
}

fn round_at_least_one(value: f64) -> usize {
    if value.is_finite() && value > 1.0 {
        value.round() as usize
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> AdaptiveParameterControl {
        let config = SearchConfig {
            population_size_per_target: 10,
            focused_population_size_per_target: 2,
            focused_search_activation_fraction: 0.5,
            max_mutations_per_individual: 9,
            initial_probability_of_random_sampling: 1.0,
            min_probability_of_random_sampling: 0.2,
            ..SearchConfig::default()
        };
        AdaptiveParameterControl::from_config(&config)
    }

    #[test]
    fn test_linear_schedule() {
        let s = LinearSchedule::new(1.0, 3.0);
        assert_eq!(s.value_at(0.0), 1.0);
        assert_eq!(s.value_at(0.5), 2.0);
        assert_eq!(s.value_at(2.0), 3.0);
        assert_eq!(LinearSchedule::constant(4.0).value_at(0.7), 4.0);
    }

    #[test]
    fn test_progress_and_phase() {
        let c = control();
        assert_eq!(c.progress(0.0), 0.0);
        assert_eq!(c.progress(0.25), 0.5);
        assert_eq!(c.progress(0.9), 1.0);
        assert!(!c.is_focused(0.49));
        assert!(c.is_focused(0.5));
    }

    #[test]
    fn test_parameters_move_monotonically() {
        let c = control();
        assert_eq!(c.probability_of_random_sampling(0.0), 1.0);
        assert!((c.probability_of_random_sampling(0.25) - 0.6).abs() < 1e-9);
        assert!((c.probability_of_random_sampling(1.0) - 0.2).abs() < 1e-9);

        assert_eq!(c.max_mutations(0.0), 1);
        assert_eq!(c.max_mutations(0.25), 5);
        assert_eq!(c.max_mutations(0.8), 9);

        assert_eq!(c.archive_target_limit(0.0), 10);
        assert_eq!(c.archive_target_limit(0.5), 2);
        assert_eq!(c.delta_exponent(0.3), 30);
    }

    #[test]
    fn test_closures_are_schedules() {
        let c = control()
            .with_mutations_schedule(|p: f64| if p < 1.0 { 2.0 } else { 4.0 })
            .with_delta_exponent_schedule(LinearSchedule::new(20.0, 4.0));
        assert_eq!(c.max_mutations(0.1), 2);
        assert_eq!(c.max_mutations(0.6), 4);
        assert_eq!(c.delta_exponent(1.0), 4);
    }

    #[test]
    fn test_zero_activation_fraction_starts_focused() {
        let config = SearchConfig {
            focused_search_activation_fraction: 0.0,
            ..SearchConfig::default()
        };
        let c = AdaptiveParameterControl::from_config(&config);
        assert!(c.is_focused(0.0));
        assert_eq!(
            c.probability_of_random_sampling(0.0),
            config.min_probability_of_random_sampling
        );
    }
}
