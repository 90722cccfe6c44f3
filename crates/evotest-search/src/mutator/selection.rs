//! Gene selection strategies

use crate::config::GeneSelectionStrategy;
use crate::impact::ImpactStore;
use evotest_genes::{GenePath, Randomness};

/// Lowest selection weight of a gene whose mutations never had an impact
const MIN_IMPACT_WEIGHT: f64 = 0.01;

/// Chooses which genes a value mutation changes
pub trait GeneSelector: Send + Sync {
    /// Non-empty subset of `candidates` (empty only when `candidates` is)
    fn select(
        &self,
        candidates: &[GenePath],
        impacts: &ImpactStore,
        rng: &mut Randomness,
    ) -> Vec<GenePath>;
}

/// Selector for the configured strategy
pub fn selector_for(strategy: GeneSelectionStrategy) -> Box<dyn GeneSelector> {
    match strategy {
        GeneSelectionStrategy::Uniform => Box::new(UniformGeneSelector),
        GeneSelectionStrategy::ImpactWeighted => Box::new(ImpactWeightedGeneSelector),
    }
}

/// Keep each candidate with its own probability until at least one is kept
fn select_independently(
    candidates: &[GenePath],
    probabilities: &[f64],
    rng: &mut Randomness,
) -> Vec<GenePath> {
    if candidates.is_empty() {
        return Vec::new();
    }
    loop {
        let selected: Vec<GenePath> = candidates
            .iter()
            .zip(probabilities)
            .filter(|(_, p)| rng.next_bool_with(**p))
            .map(|(path, _)| path.clone())
            .collect();
        if !selected.is_empty() {
            return selected;
        }
    }
}

/// Every gene is selected with probability `1/n`
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformGeneSelector;

impl GeneSelector for UniformGeneSelector {
    fn select(
        &self,
        candidates: &[GenePath],
        _impacts: &ImpactStore,
        rng: &mut Randomness,
    ) -> Vec<GenePath> {
        let p = 1.0 / candidates.len().max(1) as f64;
        select_independently(candidates, &vec![p; candidates.len()], rng)
    }
}

/// Genes that changed fitness before are more likely to be selected.
///
/// A gene's weight is its impact degree, floored at [`MIN_IMPACT_WEIGHT`];
/// genes without history get the uniform weight `1/n`. Probabilities are the
/// normalized weights, so one gene is selected on average. With an empty
/// impact store this behaves exactly like [`UniformGeneSelector`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactWeightedGeneSelector;

impl GeneSelector for ImpactWeightedGeneSelector {
    fn select(
        &self,
        candidates: &[GenePath],
        impacts: &ImpactStore,
        rng: &mut Randomness,
    ) -> Vec<GenePath> {
        if impacts.is_empty() {
            return UniformGeneSelector.select(candidates, impacts, rng);
        }

        let uniform = 1.0 / candidates.len().max(1) as f64;
        let weights: Vec<f64> = candidates
            .iter()
            .map(|path| match impacts.degree(path) {
                Some(degree) => degree.max(MIN_IMPACT_WEIGHT),
                None => uniform,
            })
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return UniformGeneSelector.select(candidates, impacts, rng);
        }

        let probabilities: Vec<f64> = weights.iter().map(|w| w / total).collect();
        select_independently(candidates, &probabilities, rng)
    }
}
