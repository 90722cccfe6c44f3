//! Structural identifiers of top-level genes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which action list of an individual a gene lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionScope {
    /// Setup actions, not counted by the individual size
    Init,
    /// Main actions
    Main,
}

impl fmt::Display for ActionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionScope::Init => write!(f, "init"),
            ActionScope::Main => write!(f, "main"),
        }
    }
}

/// Location of a top-level gene inside an individual.
///
/// Paths are structural, so the same path designates the corresponding gene
/// in every copy of an individual. Printed as
/// `{scope}[{action index}]:{action name}/{gene name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenePath {
    scope: ActionScope,
    action_index: usize,
    action_name: String,
    gene_name: String,
}

impl GenePath {
    /// Build a path from its parts
    pub fn new(
        scope: ActionScope,
        action_index: usize,
        action_name: impl Into<String>,
        gene_name: impl Into<String>,
    ) -> Self {
        Self {
            scope,
            action_index,
            action_name: action_name.into(),
            gene_name: gene_name.into(),
        }
    }

    /// Path of a gene in a main action
    pub fn main(action_index: usize, action_name: &str, gene_name: &str) -> Self {
        Self::new(ActionScope::Main, action_index, action_name, gene_name)
    }

    /// Path of a gene in an initialization action
    pub fn init(action_index: usize, action_name: &str, gene_name: &str) -> Self {
        Self::new(ActionScope::Init, action_index, action_name, gene_name)
    }

    /// Action list
    pub fn scope(&self) -> ActionScope {
        self.scope
    }

    /// Index of the action inside its list
    pub fn action_index(&self) -> usize {
        self.action_index
    }

    /// Name of the owning action
    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    /// Name of the gene
    pub fn gene_name(&self) -> &str {
        &self.gene_name
    }
}

impl fmt::Display for GenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]:{}/{}",
            self.scope, self.action_index, self.action_name, self.gene_name
        )
    }
}
