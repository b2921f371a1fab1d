use crate::record::BuildId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Selection changed; hand the new state to the sync coordinator.
    PersistSelection { ids: Vec<BuildId> },
    /// Fetch the build inventory again.
    ReloadInventory,
    /// Load the stored selection again, replacing the current one.
    ReloadSelection,
}
