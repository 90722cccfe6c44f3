//! Configuration for the MIO search

use crate::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};

/// What the search budget is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoppingCriterion {
    /// Budget is a number of fitness evaluations
    Evaluations,
    /// Budget is wall-clock seconds
    Time,
    /// Budget is a number of covered targets
    TargetCoverage,
}

/// Tie-breaker used when two individuals score the same on a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryObjective {
    /// Prefer shorter individuals
    TestLengthMin,
}

/// How genes are chosen for value mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneSelectionStrategy {
    /// Every mutable gene with the same probability
    Uniform,
    /// Genes that changed fitness before are preferred
    ImpactWeighted,
}

/// Target choice while in focused search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackDirectedSampling {
    /// Target with the fewest attempts since its last improvement
    Last,
    /// Stick with the last target while it keeps improving quickly
    FocusedQuickest,
    /// Uniform among not covered targets
    None,
}

/// MIO search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Elite population size per target at the start of the search
    pub population_size_per_target: usize,
    /// Elite population size per target once focused search starts
    pub focused_population_size_per_target: usize,
    /// Fraction of the budget after which focused search starts
    pub focused_search_activation_fraction: f64,
    /// Largest number of chained mutations per sampled elite
    pub max_mutations_per_individual: usize,
    /// Probability of random sampling at the start of the search
    pub initial_probability_of_random_sampling: f64,
    /// Probability of random sampling once focused search starts
    pub min_probability_of_random_sampling: f64,
    /// Probability that a mutation changes the action list
    pub probability_of_structure_mutation: f64,
    /// Probability that a selected gene is fully re-randomized
    pub probability_of_gene_randomization: f64,
    /// Largest exponent of the power-of-two numeric mutation step
    pub max_delta_exponent: u32,
    /// Largest number of main actions structural mutation may produce
    pub max_test_size: usize,
    /// Unit of the budget
    pub stopping_criterion: StoppingCriterion,
    /// Budget in units of `stopping_criterion`
    pub budget: u64,
    /// Tie-breaker for equal scores
    pub secondary_objective: SecondaryObjective,
    /// Gene selection strategy
    pub gene_selection_strategy: GeneSelectionStrategy,
    /// Target choice in focused search
    pub feedback_directed_sampling: FeedbackDirectedSampling,
    /// Stop early once every reached target is covered
    pub stop_when_all_targets_covered: bool,
    /// Random seed
    pub seed: u64,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size_per_target: 10,
            focused_population_size_per_target: 1,
            focused_search_activation_fraction: 0.5,
            max_mutations_per_individual: 10,
            initial_probability_of_random_sampling: 1.0,
            min_probability_of_random_sampling: 0.0,
            probability_of_structure_mutation: 0.5,
            probability_of_gene_randomization: 0.05,
            max_delta_exponent: 30,
            max_test_size: 10,
            stopping_criterion: StoppingCriterion::Evaluations,
            budget: 1000,
            secondary_objective: SecondaryObjective::TestLengthMin,
            gene_selection_strategy: GeneSelectionStrategy::Uniform,
            feedback_directed_sampling: FeedbackDirectedSampling::Last,
            stop_when_all_targets_covered: true,
            seed: 42,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log a progress line every N evaluations; 0 disables
    pub log_interval: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_interval: 100 }
    }
}

fn invalid(message: impl Into<String>) -> SearchError {
    SearchError::InvalidConfiguration {
        message: message.into(),
    }
}

fn check_probability(name: &str, p: f64) -> SearchResult<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(invalid(format!("{name} must be in [0, 1], got {p}")));
    }
    Ok(())
}

impl SearchConfig {
    /// Validate configuration
    pub fn validate(&self) -> SearchResult<()> {
        if self.population_size_per_target == 0 {
            return Err(invalid("Population size per target must be greater than 0"));
        }
        if self.focused_population_size_per_target == 0 {
            return Err(invalid(
                "Focused population size per target must be greater than 0",
            ));
        }
        if self.focused_population_size_per_target > self.population_size_per_target {
            return Err(invalid(
                "Focused population size cannot exceed the population size per target",
            ));
        }
        if self.max_mutations_per_individual == 0 {
            return Err(invalid("Max mutations per individual must be greater than 0"));
        }
        if self.max_test_size == 0 {
            return Err(invalid("Max test size must be greater than 0"));
        }
        if self.budget == 0 {
            return Err(invalid("Budget must be greater than 0"));
        }

        check_probability(
            "focused_search_activation_fraction",
            self.focused_search_activation_fraction,
        )?;
        check_probability(
            "initial_probability_of_random_sampling",
            self.initial_probability_of_random_sampling,
        )?;
        check_probability(
            "min_probability_of_random_sampling",
            self.min_probability_of_random_sampling,
        )?;
        check_probability(
            "probability_of_structure_mutation",
            self.probability_of_structure_mutation,
        )?;
        check_probability(
            "probability_of_gene_randomization",
            self.probability_of_gene_randomization,
        )?;

        if self.min_probability_of_random_sampling > self.initial_probability_of_random_sampling {
            return Err(invalid(
                "Min probability of random sampling cannot exceed the initial probability",
            ));
        }

        Ok(())
    }

    /// Create a builder for the configuration
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }
}

/// Builder for SearchConfig
#[derive(Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Set population size per target
    pub fn population_size_per_target(mut self, size: usize) -> Self {
        self.config.population_size_per_target = size;
        self
    }

    /// Set focused population size per target
    pub fn focused_population_size_per_target(mut self, size: usize) -> Self {
        self.config.focused_population_size_per_target = size;
        self
    }

    /// Set focused search activation fraction
    pub fn focused_search_activation_fraction(mut self, fraction: f64) -> Self {
        self.config.focused_search_activation_fraction = fraction;
        self
    }

    /// Set max mutations per individual
    pub fn max_mutations_per_individual(mut self, k: usize) -> Self {
        self.config.max_mutations_per_individual = k;
        self
    }

    /// Set the random sampling probabilities at start and in focused search
    pub fn probability_of_random_sampling(mut self, initial: f64, min: f64) -> Self {
        self.config.initial_probability_of_random_sampling = initial;
        self.config.min_probability_of_random_sampling = min;
        self
    }

    /// Set probability of structure mutation
    pub fn probability_of_structure_mutation(mut self, p: f64) -> Self {
        self.config.probability_of_structure_mutation = p;
        self
    }

    /// Set max delta exponent
    pub fn max_delta_exponent(mut self, exponent: u32) -> Self {
        self.config.max_delta_exponent = exponent;
        self
    }

    /// Set max test size
    pub fn max_test_size(mut self, size: usize) -> Self {
        self.config.max_test_size = size;
        self
    }

    /// Set stopping criterion and budget
    pub fn budget(mut self, criterion: StoppingCriterion, budget: u64) -> Self {
        self.config.stopping_criterion = criterion;
        self.config.budget = budget;
        self
    }

    /// Set gene selection strategy
    pub fn gene_selection_strategy(mut self, strategy: GeneSelectionStrategy) -> Self {
        self.config.gene_selection_strategy = strategy;
        self
    }

    /// Set feedback-directed sampling
    pub fn feedback_directed_sampling(mut self, sampling: FeedbackDirectedSampling) -> Self {
        self.config.feedback_directed_sampling = sampling;
        self
    }

    /// Enable/disable early stop when every reached target is covered
    pub fn stop_when_all_targets_covered(mut self, enabled: bool) -> Self {
        self.config.stop_when_all_targets_covered = enabled;
        self
    }

    /// Set seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set progress log interval
    pub fn log_interval(mut self, interval: u64) -> Self {
        self.config.logging.log_interval = interval;
        self
    }

    /// Build the configuration
    pub fn build(self) -> SearchResult<SearchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
