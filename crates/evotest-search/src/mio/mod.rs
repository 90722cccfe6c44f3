//! Many Independent Objective (MIO) search
//!
//! The loop alternates between sampling brand-new individuals and mutating
//! elites taken from the per-target archive. Early on it mostly explores
//! with random sampling and large populations; once the focused search
//! activation point is reached it only exploits, with a single elite per
//! target and longer mutation chains.

mod engine;

pub use engine::MioAlgorithm;
