use crate::record::{BuildId, BuildRecord};
use crate::sync::{SaveOutcome, SelectionSource};
use crate::tree::NodePath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A fresh inventory arrived; the tree is rebuilt from it.
    InventoryLoaded(Vec<BuildRecord>),
    /// Inventory refresh failed; the last known tree stays.
    InventoryFailed { reason: String },
    /// Startup or reload selection, already reconciled between remote and cache.
    SelectionLoaded {
        ids: Vec<BuildId>,
        source: SelectionSource,
    },
    ToggleBuild(BuildId),
    ToggleNode(NodePath),
    SelectAll,
    DeselectAll,
    /// Search box contents.
    SearchChanged(String),
    ToggleExpanded(NodePath),
    ExpandAll,
    CollapseAll,
    /// The sync worker finished a save.
    SaveSettled(SaveOutcome),
    /// Operator asked for a full reload.
    ReloadRequested,
    NoOp,
}
