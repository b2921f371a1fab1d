use std::collections::BTreeSet;

use crate::record::BuildId;
use crate::tree::{ProjectNode, ProjectTree};

/// Aggregate selection of the builds under a node. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    None,
    All,
    Partial,
}

/// The set of chosen build ids.
///
/// Ids that are not in the current tree ("orphaned") are kept: the build may come
/// back on a later refresh. Only `toggle_build` and `deselect_all` remove them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionStore {
    selected: BTreeSet<BuildId>,
    revision: u64,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn node_state(&self, node: &ProjectNode) -> NodeState {
        let leaves = node.leaves();
        let chosen = leaves
            .iter()
            .filter(|build| self.selected.contains(build.id.as_str()))
            .count();
        if chosen == 0 {
            NodeState::None
        } else if chosen == leaves.len() {
            NodeState::All
        } else {
            NodeState::Partial
        }
    }

    pub fn toggle_build(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        self.revision += 1;
    }

    /// `All` clears every leaf under the node; `None` and `Partial` select them all.
    /// Returns the node's state afterwards.
    pub fn toggle_node(&mut self, node: &ProjectNode) -> NodeState {
        let leaves = node.leaves();
        match self.node_state(node) {
            NodeState::All => {
                for build in leaves {
                    self.selected.remove(build.id.as_str());
                }
            }
            NodeState::None | NodeState::Partial => {
                for build in leaves {
                    self.selected.insert(build.id.clone());
                }
            }
        }
        self.revision += 1;
        self.node_state(node)
    }

    /// Adds every build in the tree. Orphaned ids stay selected.
    pub fn select_all(&mut self, tree: &ProjectTree) {
        for build in tree.root().leaves() {
            self.selected.insert(build.id.clone());
        }
        self.revision += 1;
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
        self.revision += 1;
    }

    /// Wholesale replacement used while loading; it does not count as an edit.
    pub fn replace<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = BuildId>,
    {
        self.selected = ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
    }

    /// Persistable payload, sorted by id.
    pub fn snapshot(&self) -> Vec<BuildId> {
        self.selected.iter().cloned().collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Number of user edits applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Selected ids absent from `tree`.
    pub fn orphaned<'a>(&'a self, tree: &ProjectTree) -> Vec<&'a str> {
        self.ids().filter(|id| !tree.contains_build(id)).collect()
    }

    pub fn resolvable_count(&self, tree: &ProjectTree) -> usize {
        self.ids().filter(|id| tree.contains_build(id)).count()
    }
}
