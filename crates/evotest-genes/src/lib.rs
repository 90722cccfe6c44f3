//! Test representation for search-based test generation
//!
//! This crate provides the mutable, tree-shaped encoding of test cases:
//! - Genes: bounded values, optionals, collections, objects, choices and placeholders
//! - Actions: named steps owning their genes
//! - Individuals: setup actions plus main actions, addressable by gene path
//!
//! Every stochastic decision goes through the seeded [`Randomness`] service.

#![warn(missing_docs)]

pub mod action;
pub mod error;
pub mod gene;
pub mod individual;
pub mod path;
pub mod randomness;

pub use action::Action;
pub use error::{GeneError, GeneResult};
pub use gene::{Gene, GeneKind, GeneValue, MutationContext};
pub use individual::Individual;
pub use path::{ActionScope, GenePath};
pub use randomness::Randomness;
