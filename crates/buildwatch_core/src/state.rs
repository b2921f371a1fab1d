use crate::dashboard;
use crate::expansion::ExpansionSet;
use crate::record::{BuildId, BuildRecord};
use crate::search;
use crate::selection::{NodeState, SelectionStore};
use crate::sync::{SaveOutcome, SelectionSource};
use crate::tree::{NodePath, ProjectNode, ProjectTree, TreeBuilder};
use crate::view_model::{DashboardViewModel, SelectionSummary, TreeRowView};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InventoryStatus {
    #[default]
    Loading,
    Ready,
    /// Last refresh failed; the tree shown is the last one that loaded.
    Degraded { reason: String },
}

/// Everything the dashboard knows between two events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardState {
    builder: TreeBuilder,
    tree: ProjectTree,
    selection: SelectionStore,
    expansion: ExpansionSet,
    search_term: String,
    inventory: InventoryStatus,
    selection_source: Option<SelectionSource>,
    last_save: Option<SaveOutcome>,
    dirty: bool,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: TreeBuilder) -> Self {
        Self {
            builder,
            ..Self::default()
        }
    }

    pub fn tree(&self) -> &ProjectTree {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn expansion(&self) -> &ExpansionSet {
        &self.expansion
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn inventory(&self) -> &InventoryStatus {
        &self.inventory
    }

    pub fn node_state(&self, path: &NodePath) -> Option<NodeState> {
        self.tree.find(path).map(|node| self.selection.node_state(node))
    }

    /// Returns true once after any visible change, then resets.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn apply_inventory(&mut self, records: Vec<BuildRecord>) {
        self.tree = self.builder.build(records);
        self.expansion.retain_existing(&self.tree);
        self.inventory = InventoryStatus::Ready;
        self.mark_dirty();
    }

    pub(crate) fn mark_inventory_degraded(&mut self, reason: String) {
        self.inventory = InventoryStatus::Degraded { reason };
        self.mark_dirty();
    }

    /// A load that found nothing because the remote was down keeps any selection
    /// already in place; only the first load may start from nothing.
    pub(crate) fn restore_selection(&mut self, ids: Vec<BuildId>, source: SelectionSource) {
        if source == SelectionSource::Unavailable && self.selection_source.is_some() {
            return;
        }
        self.selection.replace(ids);
        self.selection_source = Some(source);
        self.mark_dirty();
    }

    pub(crate) fn toggle_build(&mut self, id: &str) {
        self.selection.toggle_build(id);
        self.mark_dirty();
    }

    /// `None` when the path is not in the current tree.
    pub(crate) fn toggle_node(&mut self, path: &NodePath) -> Option<NodeState> {
        let node = self.tree.find(path)?;
        let state = self.selection.toggle_node(node);
        self.dirty = true;
        Some(state)
    }

    pub(crate) fn select_all(&mut self) {
        self.selection.select_all(&self.tree);
        self.mark_dirty();
    }

    pub(crate) fn deselect_all(&mut self) {
        self.selection.deselect_all();
        self.mark_dirty();
    }

    pub(crate) fn set_search_term(&mut self, term: String) {
        if self.search_term != term {
            self.search_term = term;
            self.mark_dirty();
        }
    }

    pub(crate) fn toggle_expanded(&mut self, path: NodePath) {
        if path.is_root() || self.tree.find(&path).is_none() {
            return;
        }
        self.expansion.toggle(path);
        self.mark_dirty();
    }

    pub(crate) fn expand_all(&mut self) {
        self.expansion.expand_all(&self.tree);
        self.mark_dirty();
    }

    pub(crate) fn collapse_all(&mut self) {
        self.expansion.collapse_all();
        self.mark_dirty();
    }

    pub(crate) fn record_save(&mut self, outcome: SaveOutcome) {
        self.last_save = Some(outcome);
        self.mark_dirty();
    }

    pub fn view(&self) -> DashboardViewModel {
        let filtered = search::filter(&self.tree, &self.search_term);
        let searching = !self.search_term.trim().is_empty();
        let mut rows = Vec::new();
        if let Some(view_tree) = filtered.as_deref() {
            let expansion = if searching {
                self.expansion.with_search_view(view_tree)
            } else {
                self.expansion.clone()
            };
            self.push_rows(view_tree.root(), &NodePath::root(), &expansion, &mut rows);
        }

        DashboardViewModel {
            inventory: self.inventory.clone(),
            rows,
            search_term: self.search_term.clone(),
            search_has_matches: filtered.is_some(),
            summary: SelectionSummary {
                selected: self.selection.len(),
                resolvable: self.selection.resolvable_count(&self.tree),
                orphaned: self
                    .selection
                    .orphaned(&self.tree)
                    .into_iter()
                    .map(ToOwned::to_owned)
                    .collect(),
                total_builds: self.tree.total_builds(),
            },
            selection_source: self.selection_source,
            last_save: self.last_save.clone(),
            dashboard: dashboard::project(&self.tree, &self.selection),
            dirty: self.dirty,
        }
    }

    /// Node rows carry the state of the full node, not of the search view, so the
    /// checkbox matches what a toggle would act on.
    fn push_rows(
        &self,
        node: &ProjectNode,
        path: &NodePath,
        expansion: &ExpansionSet,
        rows: &mut Vec<TreeRowView>,
    ) {
        for child in &node.children {
            let child_path = path.child(&child.name);
            let expanded = expansion.is_expanded(&child_path);
            let full = self.tree.find(&child_path).unwrap_or(child);
            rows.push(TreeRowView::Node {
                depth: path.depth(),
                name: child.name.clone(),
                state: self.selection.node_state(full),
                expanded,
                build_count: full.build_count(),
                path: child_path.clone(),
            });
            if expanded {
                self.push_rows(child, &child_path, expansion, rows);
            }
        }
        for build in &node.builds {
            rows.push(TreeRowView::Build {
                depth: path.depth(),
                id: build.id.clone(),
                name: build.display_name.clone(),
                selected: self.selection.is_selected(&build.id),
                status: build.display_status(),
            });
        }
    }
}
