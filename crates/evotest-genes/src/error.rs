//! Gene model error types

use thiserror::Error;

/// Errors raised while building, randomizing or mutating gene trees.
///
/// Every variant signals a programmer error in a collaborator or in a mutation
/// strategy; the search treats them as fatal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneError {
    /// Randomize or mutate was requested on a gene flagged immutable
    #[error("Gene {name} is immutable and cannot be changed")]
    ImmutableGene { name: String },

    /// A reference-cycle placeholder was asked to produce or change a value
    #[error("Gene {name} is a cycle placeholder and cannot be materialized")]
    CycleMaterialization { name: String },

    /// Domain bounds of a gene are inconsistent
    #[error("Invalid domain for gene {name}: {reason}")]
    InvalidDomain { name: String, reason: String },

    /// An individual or action would violate a structural invariant
    #[error("Invalid structure: {reason}")]
    InvalidStructure { reason: String },

    /// No gene lives at the given structural path
    #[error("No gene found at path {path}")]
    GeneNotFound { path: String },

    /// Two genes of different kinds were compared or combined
    #[error("Gene kind mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
}

/// Result type for gene operations
pub type GeneResult<T> = Result<T, GeneError>;
