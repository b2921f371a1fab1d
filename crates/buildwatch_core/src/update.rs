use crate::{DashboardState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every selection edit yields exactly one `Effect::PersistSelection`. Loading a
/// selection never does.
pub fn update(mut state: DashboardState, msg: Msg) -> (DashboardState, Vec<Effect>) {
    let effects = match msg {
        Msg::InventoryLoaded(records) => {
            state.apply_inventory(records);
            Vec::new()
        }
        Msg::InventoryFailed { reason } => {
            state.mark_inventory_degraded(reason);
            Vec::new()
        }
        Msg::SelectionLoaded { ids, source } => {
            state.restore_selection(ids, source);
            Vec::new()
        }
        Msg::ToggleBuild(id) => {
            let id = id.trim();
            if id.is_empty() {
                return (state, Vec::new());
            }
            state.toggle_build(id);
            persist(&state)
        }
        Msg::ToggleNode(path) => {
            if state.toggle_node(&path).is_none() {
                return (state, Vec::new());
            }
            persist(&state)
        }
        Msg::SelectAll => {
            state.select_all();
            persist(&state)
        }
        Msg::DeselectAll => {
            state.deselect_all();
            persist(&state)
        }
        Msg::SearchChanged(term) => {
            state.set_search_term(term);
            Vec::new()
        }
        Msg::ToggleExpanded(path) => {
            state.toggle_expanded(path);
            Vec::new()
        }
        Msg::ExpandAll => {
            state.expand_all();
            Vec::new()
        }
        Msg::CollapseAll => {
            state.collapse_all();
            Vec::new()
        }
        Msg::SaveSettled(outcome) => {
            state.record_save(outcome);
            Vec::new()
        }
        Msg::ReloadRequested => vec![Effect::ReloadInventory, Effect::ReloadSelection],
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn persist(state: &DashboardState) -> Vec<Effect> {
    vec![Effect::PersistSelection {
        ids: state.selection().snapshot(),
    }]
}
