//! Process-scoped store of impact records

use super::types::ImpactRecord;
use crate::fitness::FitnessDelta;
use evotest_genes::GenePath;
use std::collections::BTreeMap;

/// Impact records keyed by gene path.
///
/// Owned by the search and cleared with [`ImpactStore::reset`] when a new
/// search starts.
#[derive(Debug, Clone, Default)]
pub struct ImpactStore {
    records: BTreeMap<GenePath, ImpactRecord>,
}

impl ImpactStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit every gene in `paths` with the outcome of one evaluated mutation
    pub fn record(&mut self, paths: &[GenePath], delta: &FitnessDelta) {
        for path in paths {
            self.records.entry(path.clone()).or_default().record(delta);
        }
        tracing::trace!(
            genes = paths.len(),
            impacted = delta.impacted.len(),
            "recorded mutation impact"
        );
    }

    /// Record of one gene, if it was ever mutated
    pub fn get(&self, path: &GenePath) -> Option<&ImpactRecord> {
        self.records.get(path)
    }

    /// Impact degree of one gene, if it was ever mutated
    pub fn degree(&self, path: &GenePath) -> Option<f64> {
        self.records.get(path).map(ImpactRecord::degree)
    }

    /// Number of genes with a record
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no gene has been mutated yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in path order
    pub fn iter(&self) -> impl Iterator<Item = (&GenePath, &ImpactRecord)> {
        self.records.iter()
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.records.clear();
    }
}
