use buildwatch_core::{Effect, Msg};
use buildwatch_engine::{EngineConfig, EngineEvent, EngineHandle};
use watch_logging::{watch_debug, watch_info};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig) -> anyhow::Result<Self> {
        watch_info!("Connecting to {}", config.base_url);
        let engine = EngineHandle::new(config)?;
        Ok(Self { engine })
    }

    /// Initial inventory and selection load.
    pub fn start(&self) {
        self.engine.load_inventory();
        self.engine.load_selection();
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistSelection { ids } => {
                    watch_debug!("PersistSelection count={}", ids.len());
                    self.engine.persist(ids);
                }
                Effect::ReloadInventory => self.engine.load_inventory(),
                Effect::ReloadSelection => self.engine.load_selection(),
            }
        }
    }

    pub fn drain(&self) -> Vec<Msg> {
        let mut inbox = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            inbox.push(map_event(event));
        }
        inbox
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::InventoryLoaded(Ok(records)) => Msg::InventoryLoaded(records),
        EngineEvent::InventoryLoaded(Err(err)) => Msg::InventoryFailed {
            reason: err.to_string(),
        },
        EngineEvent::SelectionLoaded { ids, source } => Msg::SelectionLoaded { ids, source },
        EngineEvent::SaveSettled { outcome, .. } => Msg::SaveSettled(outcome),
    }
}
