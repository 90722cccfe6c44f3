//! Shared fixtures for search integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use evotest_genes::{Action, Gene, Individual, Randomness};
use evotest_search::{FitnessFunction, FitnessValue, Sampler, SearchResult, TargetId};

/// Route search logs to the test output; honors `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Single `submit(x, token)` call with `x` in `[0, 1000]` and an immutable token
pub struct SubmitSampler;

impl Sampler for SubmitSampler {
    fn sample_at_random(&mut self, rng: &mut Randomness) -> SearchResult<Individual> {
        Ok(Individual::new(vec![submit(rng.next_i64(0, 1000))?]))
    }

    fn sample_action(&mut self, rng: &mut Randomness) -> Option<Action> {
        submit(rng.next_i64(0, 1000)).ok()
    }
}

pub fn submit(x: i64) -> SearchResult<Action> {
    Ok(Action::new(
        "submit",
        vec![
            Gene::integer("x", x, 0, 1000)?,
            Gene::immutable_holder("token", "t-42"),
        ],
    )?)
}

/// Value of `x` in the first main action
pub fn x_of(individual: &Individual) -> Option<i64> {
    individual
        .main_actions()
        .first()
        .and_then(|a| a.gene("x"))
        .and_then(Gene::as_i64)
}

/// `1 / (1 + |x - goal|)`, the usual branch-distance heuristic
pub fn closeness(x: i64, goal: i64) -> f64 {
    1.0 / (1.0 + (x - goal).unsigned_abs() as f64)
}

/// Fitness computed from `x` by a plain function
pub struct ScoreFitness<F> {
    score: F,
    pub calls: u64,
}

impl<F> ScoreFitness<F>
where
    F: Fn(i64) -> Vec<(TargetId, f64)> + Send,
{
    pub fn new(score: F) -> Self {
        Self { score, calls: 0 }
    }
}

#[async_trait]
impl<F> FitnessFunction for ScoreFitness<F>
where
    F: Fn(i64) -> Vec<(TargetId, f64)> + Send,
{
    async fn evaluate(&mut self, individual: &Individual) -> SearchResult<FitnessValue> {
        self.calls += 1;
        let mut fitness = FitnessValue::new(individual.size());
        for (idx, action) in individual.main_actions().iter().enumerate() {
            if let Some(x) = action.gene("x").and_then(Gene::as_i64) {
                for (target, score) in (self.score)(x) {
                    fitness.update_target(target, score, Some(idx))?;
                }
            }
        }
        Ok(fitness)
    }
}
