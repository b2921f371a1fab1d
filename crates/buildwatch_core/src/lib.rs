//! Buildwatch core: build classification, tri-state selection and the pure dashboard state machine.
mod classify;
mod dashboard;
mod effect;
mod expansion;
mod msg;
mod record;
mod search;
mod selection;
mod state;
mod sync;
mod tree;
mod update;
mod view_model;

pub use classify::{
    default_rules, humanize, Classifier, Matcher, PathTemplate, RootSegment, Rule, OTHER,
    SEGMENT_SEPARATOR,
};
pub use dashboard::{project as project_dashboard, DashboardColumn, DashboardView, ProjectGroup, StatusTotals};
pub use effect::Effect;
pub use expansion::ExpansionSet;
pub use msg::Msg;
pub use record::{BuildId, BuildRecord, BuildStatus, DisplayStatus, RunState};
pub use search::filter;
pub use selection::{NodeState, SelectionStore};
pub use state::{DashboardState, InventoryStatus};
pub use sync::{
    reconcile_selection, DebounceTimer, SaveOutcome, SaveRequest, SelectionSource, SyncCoordinator,
    SyncEffect, SyncPhase, SyncSettings, DEFAULT_DEBOUNCE,
};
pub use tree::{GroupingMode, NodePath, ProjectNode, ProjectTree, TreeBuilder, PROJECT_NAME_SEPARATOR};
pub use update::update;
pub use view_model::{DashboardViewModel, SelectionSummary, TreeRowView};
