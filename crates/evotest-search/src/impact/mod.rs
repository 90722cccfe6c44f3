//! Impact tracking
//!
//! Learns, from search history, which genes are worth mutating. Every
//! evaluated mutant is compared with its parent; the genes that were changed
//! to produce it are credited with an impact when the comparison shows a
//! changed score on a reached target or a newly reached target.

mod store;
mod types;

pub use store::ImpactStore;
pub use types::ImpactRecord;
