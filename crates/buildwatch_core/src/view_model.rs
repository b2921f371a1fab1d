use crate::dashboard::DashboardView;
use crate::record::{BuildId, DisplayStatus};
use crate::selection::NodeState;
use crate::state::InventoryStatus;
use crate::sync::{SaveOutcome, SelectionSource};
use crate::tree::NodePath;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSummary {
    pub selected: usize,
    pub resolvable: usize,
    pub orphaned: Vec<BuildId>,
    pub total_builds: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardViewModel {
    pub inventory: InventoryStatus,
    /// Visible tree rows in display order: sub-projects first, then builds.
    pub rows: Vec<TreeRowView>,
    pub search_term: String,
    pub search_has_matches: bool,
    pub summary: SelectionSummary,
    pub selection_source: Option<SelectionSource>,
    pub last_save: Option<SaveOutcome>,
    pub dashboard: DashboardView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeRowView {
    Node {
        path: NodePath,
        depth: usize,
        name: String,
        state: NodeState,
        expanded: bool,
        build_count: usize,
    },
    Build {
        depth: usize,
        id: BuildId,
        name: String,
        selected: bool,
        status: DisplayStatus,
    },
}
