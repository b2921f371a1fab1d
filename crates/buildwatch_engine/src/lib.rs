//! Buildwatch engine: inventory fetching, selection persistence and the background worker.
mod backend;
mod cache;
mod config;
mod engine;
mod http;
mod inventory;
mod sink;
mod sync_worker;
mod types;
mod wire;

pub use backend::{HttpSelectionBackend, SelectionBackend};
pub use cache::{CacheError, FileCache, LocalCache, MemoryCache};
pub use config::{EngineConfig, DEFAULT_CACHE_KEY};
pub use engine::{default_cache_dir, load_selection, EngineHandle};
pub use inventory::{HttpInventorySource, InventorySource};
pub use sink::{ChannelEventSink, EventSink};
pub use sync_worker::SyncHandle;
pub use types::{EngineError, EngineEvent, FailureKind, FetchError};
