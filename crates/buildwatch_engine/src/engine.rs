use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use buildwatch_core::{reconcile_selection, BuildId, SelectionSource};
use tokio_util::sync::CancellationToken;
use watch_logging::{watch_info, watch_warn};

use crate::sync_worker::SyncHandle;
use crate::{
    ChannelEventSink, EngineConfig, EngineError, EngineEvent, EventSink, FileCache, HttpInventorySource,
    HttpSelectionBackend, InventorySource, LocalCache, SelectionBackend,
};

enum EngineCommand {
    LoadInventory,
    LoadSelection,
    Persist(Vec<BuildId>),
    Shutdown,
}

/// Owns the background thread that performs all network and disk work.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let inventory = Arc::new(HttpInventorySource::new(&config)?);
        let backend = Arc::new(HttpSelectionBackend::new(&config)?);
        let cache = Arc::new(FileCache::new(config.cache_dir.clone(), &config.cache_key));
        Self::with_parts(&config, inventory, backend, cache)
    }

    pub fn with_parts(
        config: &EngineConfig,
        inventory: Arc<dyn InventorySource>,
        backend: Arc<dyn SelectionBackend>,
        cache: Arc<dyn LocalCache>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let parts = Parts {
            settings: config.sync_settings(),
            save_timeout: config.save_timeout,
            inventory,
            backend,
            cache,
            sink: Arc::new(ChannelEventSink::new(event_tx)),
        };

        let worker = thread::Builder::new()
            .name("buildwatch-engine".to_string())
            .spawn(move || parts.serve(runtime, cmd_rx))?;

        Ok(Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        })
    }

    pub fn load_inventory(&self) {
        let _ = self.cmd_tx.send(EngineCommand::LoadInventory);
    }

    pub fn load_selection(&self) {
        let _ = self.cmd_tx.send(EngineCommand::LoadSelection);
    }

    pub fn persist(&self, ids: Vec<BuildId>) {
        let _ = self.cmd_tx.send(EngineCommand::Persist(ids));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

struct Parts {
    settings: buildwatch_core::SyncSettings,
    save_timeout: Duration,
    inventory: Arc<dyn InventorySource>,
    backend: Arc<dyn SelectionBackend>,
    cache: Arc<dyn LocalCache>,
    sink: Arc<dyn EventSink>,
}

impl Parts {
    fn serve(self, runtime: tokio::runtime::Runtime, cmd_rx: mpsc::Receiver<EngineCommand>) {
        let cancel = CancellationToken::new();
        let sync = {
            let _guard = runtime.enter();
            SyncHandle::spawn(
                self.settings,
                self.save_timeout,
                self.backend.clone(),
                self.cache.clone(),
                self.sink.clone(),
            )
        };

        while let Ok(command) = cmd_rx.recv() {
            match command {
                EngineCommand::LoadInventory => {
                    let inventory = self.inventory.clone();
                    let sink = self.sink.clone();
                    let cancel = cancel.clone();
                    runtime.spawn(async move {
                        tokio::select! {
                            _ = cancel.cancelled() => {}
                            result = inventory.fetch() => {
                                if let Err(err) = &result {
                                    watch_warn!("Inventory refresh failed: {err}");
                                }
                                sink.emit(EngineEvent::InventoryLoaded(result));
                            }
                        }
                    });
                }
                EngineCommand::LoadSelection => {
                    let backend = self.backend.clone();
                    let cache = self.cache.clone();
                    let sink = self.sink.clone();
                    let cancel = cancel.clone();
                    runtime.spawn(async move {
                        tokio::select! {
                            _ = cancel.cancelled() => {}
                            event = load_selection(backend.as_ref(), cache.as_ref()) => sink.emit(event),
                        }
                    });
                }
                EngineCommand::Persist(ids) => sync.persist(ids),
                EngineCommand::Shutdown => break,
            }
        }

        cancel.cancel();
        runtime.block_on(sync.shutdown());
    }
}

/// Remote first, then the local cache, then nothing.
pub async fn load_selection(backend: &dyn SelectionBackend, cache: &dyn LocalCache) -> EngineEvent {
    let remote = match backend.load().await {
        Ok(ids) => Some(ids),
        Err(err) => {
            watch_warn!("Remote selection unavailable: {err}");
            None
        }
    };
    let (ids, source) = reconcile_selection(remote, || match cache.get() {
        Ok(ids) => ids,
        Err(err) => {
            watch_warn!("Local selection cache unreadable: {err}");
            None
        }
    });
    if source == SelectionSource::Unavailable {
        watch_warn!("No selection available; keeping the current one");
    } else {
        watch_info!("Restored {} selected builds from {:?}", ids.len(), source);
    }
    EngineEvent::SelectionLoaded { ids, source }
}

/// `$XDG_CACHE_HOME/buildwatch`, else `~/.cache/buildwatch`, else `./.buildwatch`.
pub fn default_cache_dir() -> PathBuf {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
        .map(|base| base.join("buildwatch"))
        .unwrap_or_else(|| PathBuf::from(".buildwatch"))
}
