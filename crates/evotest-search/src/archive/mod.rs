//! Per-target elite archive
//!
//! Every target owns a small population of the best individuals seen for it.
//! A target moves from unreached to partially reached to covered; once covered
//! its population holds a single individual that can only be replaced by a
//! shorter one that still covers it.

mod store;
mod types;

pub use store::Archive;
pub use types::{
    Admission, CoverageSummary, SearchPhase, Solution, TargetState, TerminationReason,
};

#[cfg(test)]
mod tests;
