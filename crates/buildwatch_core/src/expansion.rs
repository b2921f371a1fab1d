use std::collections::BTreeSet;

use crate::tree::{NodePath, ProjectTree};

/// Which nodes the operator has opened. Presentation state only; never persisted remotely.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpansionSet {
    expanded: BTreeSet<NodePath>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, path: &NodePath) -> bool {
        self.expanded.contains(path)
    }

    /// Returns whether the node is expanded afterwards.
    pub fn toggle(&mut self, path: NodePath) -> bool {
        if self.expanded.remove(&path) {
            false
        } else {
            self.expanded.insert(path);
            true
        }
    }

    pub fn expand_all(&mut self, tree: &ProjectTree) {
        self.expanded = tree.node_paths().into_iter().collect();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Drops paths that no longer exist after a refresh.
    pub fn retain_existing(&mut self, tree: &ProjectTree) {
        self.expanded.retain(|path| tree.find(path).is_some());
    }

    /// Expansion to use while a search is active: everything recorded plus every
    /// node of the filtered view, so each match is reachable.
    pub fn with_search_view(&self, filtered: &ProjectTree) -> ExpansionSet {
        let mut expanded = self.expanded.clone();
        expanded.extend(filtered.node_paths());
        ExpansionSet { expanded }
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}
