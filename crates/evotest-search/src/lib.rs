//! Search engine for search-based test generation
//!
//! This crate provides the Many Independent Objective (MIO) search:
//! - Archive: bounded elite populations per testing target
//! - Mutator: structural and value mutation with impact-guided gene selection
//! - Adaptive parameter control: exploration to focused-search schedules
//! - Budget accounting by evaluations, time or covered targets
//!
//! The system under test is reached only through the [`Sampler`],
//! [`FitnessFunction`] and [`StructureMutator`] traits.

#![warn(missing_docs)]

pub mod archive;
pub mod budget;
pub mod config;
pub mod control;
pub mod error;
pub mod fitness;
pub mod impact;
pub mod metrics;
pub mod mio;
pub mod mutator;
pub mod sampler;

pub use archive::{Archive, CoverageSummary, SearchPhase, Solution, TargetState, TerminationReason};
pub use budget::SearchTimeController;
pub use config::{
    FeedbackDirectedSampling, GeneSelectionStrategy, LoggingConfig, SearchConfig,
    SecondaryObjective, StoppingCriterion,
};
pub use control::{AdaptiveParameterControl, LinearSchedule, Schedule};
pub use error::{SearchError, SearchResult};
pub use fitness::{EvaluatedIndividual, FitnessFunction, FitnessValue, TargetId};
pub use impact::{ImpactRecord, ImpactStore};
pub use metrics::SearchStatistics;
pub use mio::MioAlgorithm;
pub use mutator::{Mutator, StandardMutator};
pub use sampler::{ActionSequenceMutator, NoStructureMutation, Sampler, StructureMutator};
