//! Candidate test cases

use crate::action::Action;
use crate::error::{GeneError, GeneResult};
use crate::gene::Gene;
use crate::path::{ActionScope, GenePath};
use serde::{Deserialize, Serialize};

/// A candidate test: setup actions followed by main actions.
///
/// Initialization actions live in their own list, so they always run before
/// every main action regardless of structural mutation. Only main actions
/// count towards [`Individual::size`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Individual {
    initialization: Vec<Action>,
    main: Vec<Action>,
}

impl Individual {
    /// Individual made of main actions only
    pub fn new(main_actions: Vec<Action>) -> Self {
        Self {
            initialization: Vec::new(),
            main: main_actions,
        }
    }

    /// Individual with setup actions
    pub fn with_initialization(initialization: Vec<Action>, main_actions: Vec<Action>) -> Self {
        Self {
            initialization,
            main: main_actions,
        }
    }

    /// Number of main actions
    pub fn size(&self) -> usize {
        self.main.len()
    }

    /// Main actions in execution order
    pub fn main_actions(&self) -> &[Action] {
        &self.main
    }

    /// Setup actions in execution order
    pub fn initialization_actions(&self) -> &[Action] {
        &self.initialization
    }

    fn actions(&self, scope: ActionScope) -> &[Action] {
        match scope {
            ActionScope::Init => &self.initialization,
            ActionScope::Main => &self.main,
        }
    }

    fn actions_mut(&mut self, scope: ActionScope) -> &mut Vec<Action> {
        match scope {
            ActionScope::Init => &mut self.initialization,
            ActionScope::Main => &mut self.main,
        }
    }

    /// Every top-level gene with its path, setup actions first
    pub fn see_genes(&self) -> Vec<(GenePath, &Gene)> {
        let mut out = Vec::new();
        for scope in [ActionScope::Init, ActionScope::Main] {
            for (idx, action) in self.actions(scope).iter().enumerate() {
                for gene in action.genes() {
                    out.push((
                        GenePath::new(scope, idx, action.name(), gene.name()),
                        gene,
                    ));
                }
            }
        }
        out
    }

    /// Paths of the genes the mutator may select
    pub fn mutable_gene_paths(&self) -> Vec<GenePath> {
        self.see_genes()
            .into_iter()
            .filter(|(_, gene)| gene.is_mutable())
            .map(|(path, _)| path)
            .collect()
    }

    /// Gene at `path`
    pub fn gene(&self, path: &GenePath) -> GeneResult<&Gene> {
        self.actions(path.scope())
            .get(path.action_index())
            .filter(|a| a.name() == path.action_name())
            .and_then(|a| a.gene(path.gene_name()))
            .ok_or_else(|| GeneError::GeneNotFound {
                path: path.to_string(),
            })
    }

    /// Mutable gene at `path`
    pub fn gene_mut(&mut self, path: &GenePath) -> GeneResult<&mut Gene> {
        self.actions_mut(path.scope())
            .get_mut(path.action_index())
            .filter(|a| a.name() == path.action_name())
            .and_then(|a| {
                a.genes_mut()
                    .iter_mut()
                    .find(|g| g.name() == path.gene_name())
            })
            .ok_or_else(|| GeneError::GeneNotFound {
                path: path.to_string(),
            })
    }

    /// Insert a main action at `index` (`index == size()` appends)
    pub fn insert_action(&mut self, index: usize, action: Action) -> GeneResult<()> {
        if index > self.main.len() {
            return Err(GeneError::InvalidStructure {
                reason: format!(
                    "cannot insert at {index} in a test of size {}",
                    self.main.len()
                ),
            });
        }
        self.main.insert(index, action);
        Ok(())
    }

    /// Remove the main action at `index`; a test keeps at least one main action
    pub fn remove_action(&mut self, index: usize) -> GeneResult<Action> {
        if self.main.len() <= 1 {
            return Err(GeneError::InvalidStructure {
                reason: "cannot remove the last main action".to_string(),
            });
        }
        if index >= self.main.len() {
            return Err(GeneError::InvalidStructure {
                reason: format!(
                    "no action at {index} in a test of size {}",
                    self.main.len()
                ),
            });
        }
        Ok(self.main.remove(index))
    }

    /// Swap two main actions
    pub fn swap_actions(&mut self, i: usize, j: usize) -> GeneResult<()> {
        let len = self.main.len();
        if i >= len || j >= len {
            return Err(GeneError::InvalidStructure {
                reason: format!("cannot swap {i} and {j} in a test of size {len}"),
            });
        }
        self.main.swap(i, j);
        Ok(())
    }

    /// Append a setup action
    pub fn add_initialization_action(&mut self, action: Action) {
        self.initialization.push(action);
    }

    /// Fails on the first action with duplicate gene names or the first gene
    /// outside its domain
    pub fn verify_validity(&self) -> GeneResult<()> {
        if let Some(action) = self
            .initialization
            .iter()
            .chain(self.main.iter())
            .find(|a| !a.has_unique_gene_names())
        {
            return Err(GeneError::InvalidStructure {
                reason: format!("action {} has duplicate gene names", action.name()),
            });
        }
        match self.see_genes().into_iter().find(|(_, g)| !g.is_locally_valid()) {
            Some((path, _)) => Err(GeneError::InvalidStructure {
                reason: format!("gene {path} is outside its domain"),
            }),
            None => Ok(()),
        }
    }

    /// Same actions with the same gene values
    pub fn contains_same_value_as(&self, other: &Individual) -> bool {
        fn same(a: &[Action], b: &[Action]) -> bool {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| x.contains_same_value_as(y))
        }
        same(&self.initialization, &other.initialization) && same(&self.main, &other.main)
    }

    /// Same main action names in the same order, ignoring gene values
    pub fn same_actions(&self, other: &Individual) -> bool {
        self.main.len() == other.main.len()
            && self
                .main
                .iter()
                .zip(other.main.iter())
                .all(|(a, b)| a.name() == b.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_individual() -> Individual {
        Individual::with_initialization(
            vec![Action::new("insert", vec![Gene::immutable_holder("pk", "1")]).unwrap()],
            vec![
                Action::new("create", vec![Gene::integer("x", 0, 0, 10).unwrap()]).unwrap(),
                Action::new(
                    "query",
                    vec![
                        Gene::boolean("flag", false),
                        Gene::string("q", "", 0, 8).unwrap().immutable(),
                    ],
                )
                .unwrap(),
            ],
        )
    }

    #[test]
    fn test_see_genes_lists_setup_first() {
        let ind = create_individual();
        let paths: Vec<String> = ind.see_genes().iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "init[0]:insert/pk",
                "main[0]:create/x",
                "main[1]:query/flag",
                "main[1]:query/q"
            ]
        );
        assert_eq!(ind.size(), 2);
    }

    #[test]
    fn test_mutable_paths_skip_immutable_genes() {
        let ind = create_individual();
        let paths = ind.mutable_gene_paths();
        assert_eq!(
            paths,
            vec![GenePath::main(0, "create", "x"), GenePath::main(1, "query", "flag")]
        );
    }

    #[test]
    fn test_paths_resolve_in_copies() {
        let ind = create_individual();
        let mut copy = ind.clone();
        let path = GenePath::main(0, "create", "x");
        copy.gene_mut(&path).unwrap().set_i64(5).unwrap();
        assert_eq!(ind.gene(&path).unwrap().as_i64(), Some(0));
        assert_eq!(copy.gene(&path).unwrap().as_i64(), Some(5));
        assert!(!ind.contains_same_value_as(&copy));
        assert!(ind.same_actions(&copy));

        let missing = GenePath::main(0, "query", "x");
        assert!(matches!(
            ind.gene(&missing),
            Err(GeneError::GeneNotFound { .. })
        ));
    }

    #[test]
    fn test_structural_operations() {
        let mut ind = create_individual();
        ind.swap_actions(0, 1).unwrap();
        assert_eq!(ind.main_actions()[0].name(), "query");

        ind.insert_action(2, Action::new("delete", vec![]).unwrap()).unwrap();
        assert_eq!(ind.size(), 3);
        assert!(ind.insert_action(9, Action::new("bad", vec![]).unwrap()).is_err());

        ind.remove_action(0).unwrap();
        ind.remove_action(0).unwrap();
        assert_eq!(ind.size(), 1);
        assert!(matches!(
            ind.remove_action(0),
            Err(GeneError::InvalidStructure { .. })
        ));

        ind.add_initialization_action(Action::new("seed", vec![]).unwrap());
        assert_eq!(ind.initialization_actions().len(), 2);
        assert_eq!(ind.size(), 1);
        assert!(ind.verify_validity().is_ok());
    }

    #[test]
    fn test_deserialized_duplicate_gene_names_invalid() {
        let ind = Individual::new(vec![Action::new(
            "call",
            vec![
                Gene::immutable_holder("left", "1"),
                Gene::integer("right", 0, 0, 10).unwrap(),
            ],
        )
        .unwrap()]);
        let json = serde_json::to_string(&ind)
            .unwrap()
            .replace("\"name\":\"right\"", "\"name\":\"left\"");
        let restored: Individual = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            restored.verify_validity(),
            Err(GeneError::InvalidStructure { .. })
        ));
    }
}
