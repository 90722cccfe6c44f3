//! Error types for the search engine

use crate::fitness::TargetId;
use evotest_genes::GeneError;
use thiserror::Error;

/// Search engine error types
#[derive(Debug, Error)]
pub enum SearchError {
    /// A gene invariant was violated; the run cannot continue safely
    #[error("Gene invariant violated: {0}")]
    Gene(#[from] GeneError),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// An operation needed at least one archived individual
    #[error("Archive is empty")]
    EmptyArchive,

    /// The fitness function could not score an individual
    #[error("Evaluation failed: {reason}")]
    EvaluationFailed { reason: String },

    /// The sampler could not produce an individual
    #[error("Sampling failed: {reason}")]
    SamplingFailed { reason: String },

    /// A fitness score outside `[0, 1]`
    #[error("Invalid score {score} for target {target}")]
    InvalidScore { target: TargetId, score: f64 },

    /// An admission would have broken an archive invariant
    #[error("Archive inconsistency on target {target}: {reason}")]
    ArchiveInconsistency { target: TargetId, reason: String },

    /// Other errors
    #[error("Search error: {0}")]
    Other(String),
}

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;
