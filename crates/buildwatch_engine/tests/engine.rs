use std::sync::Arc;
use std::time::Duration;

use buildwatch_core::{update, DashboardState, Msg, SaveOutcome, SelectionSource};
use buildwatch_engine::{
    load_selection, EngineConfig, EngineEvent, EngineHandle, FailureKind, FetchError, FileCache,
    LocalCache, MemoryCache, SelectionBackend, DEFAULT_CACHE_KEY,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FixedBackend(Result<Vec<String>, FetchError>);

#[async_trait::async_trait]
impl SelectionBackend for FixedBackend {
    async fn load(&self) -> Result<Vec<String>, FetchError> {
        self.0.clone()
    }

    async fn save(&self, _ids: &[String]) -> Result<(), FetchError> {
        Ok(())
    }
}

fn unreachable() -> FixedBackend {
    FixedBackend(Err(FetchError {
        kind: FailureKind::Network,
        message: "connection refused".to_string(),
    }))
}

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn remote_selection_wins_over_cache() {
    let backend = FixedBackend(Ok(ids(&["remote"])));
    let cache = MemoryCache::with_ids(ids(&["local"]));
    assert_eq!(
        load_selection(&backend, &cache).await,
        EngineEvent::SelectionLoaded {
            ids: ids(&["remote"]),
            source: SelectionSource::Remote,
        }
    );
}

#[tokio::test]
async fn empty_remote_selection_defers_to_cache() {
    let backend = FixedBackend(Ok(Vec::new()));
    let cache = MemoryCache::with_ids(ids(&["local"]));
    assert_eq!(
        load_selection(&backend, &cache).await,
        EngineEvent::SelectionLoaded {
            ids: ids(&["local"]),
            source: SelectionSource::LocalCache,
        }
    );
}

#[tokio::test]
async fn unreachable_remote_and_corrupt_cache_are_unavailable() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path().to_path_buf(), "slot");
    std::fs::write(cache.path(), "garbage").unwrap();

    assert_eq!(
        load_selection(&unreachable(), &cache).await,
        EngineEvent::SelectionLoaded {
            ids: Vec::new(),
            source: SelectionSource::Unavailable,
        }
    );
}

#[tokio::test]
async fn failed_reload_does_not_wipe_remote_selection() {
    let cache = MemoryCache::default();
    let first = load_selection(&FixedBackend(Ok(ids(&["a", "b"]))), &cache).await;
    let reload = load_selection(&unreachable(), &cache).await;

    let (state, _) = update(DashboardState::new(), to_msg(first));
    let (state, effects) = update(state, to_msg(reload));

    assert!(effects.is_empty());
    assert_eq!(state.selection().snapshot(), ids(&["a", "b"]));
}

#[tokio::test]
async fn reachable_empty_remote_is_reported_as_empty() {
    let event = load_selection(&FixedBackend(Ok(Vec::new())), &MemoryCache::default()).await;
    assert_eq!(
        event,
        EngineEvent::SelectionLoaded {
            ids: Vec::new(),
            source: SelectionSource::Empty,
        }
    );
}

fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SelectionLoaded { ids, source } => Msg::SelectionLoaded { ids, source },
        other => panic!("unexpected event: {other:?}"),
    }
}

async fn next_event(engine: &EngineHandle) -> EngineEvent {
    for _ in 0..500 {
        if let Some(event) = engine.try_recv() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no engine event within 5s");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn engine_loads_inventory_and_saves_coalesced_selection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/builds/tree"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "builds": [
                { "buildTypeId": "A_B", "name": "one" },
                { "buildTypeId": "A_C", "name": "two" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/builds/tree/selection"))
        .and(body_json(json!({ "selectedBuilds": ["A_B", "A_C"] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = EngineConfig {
        debounce: Duration::from_millis(100),
        cache_dir: temp.path().to_path_buf(),
        ..EngineConfig::default().with_base_url(server.uri())
    };
    let engine = EngineHandle::new(config).expect("engine starts");

    engine.load_inventory();
    match next_event(&engine).await {
        EngineEvent::InventoryLoaded(Ok(records)) => assert_eq!(records.len(), 2),
        other => panic!("unexpected event: {other:?}"),
    }

    engine.persist(ids(&["A_B"]));
    engine.persist(ids(&["A_B", "A_C"]));
    match next_event(&engine).await {
        EngineEvent::SaveSettled { outcome, .. } => assert_eq!(outcome, SaveOutcome::Saved),
        other => panic!("unexpected event: {other:?}"),
    }

    let cache = FileCache::new(temp.path().to_path_buf(), DEFAULT_CACHE_KEY);
    assert_eq!(cache.get().unwrap(), Some(ids(&["A_B", "A_C"])));
    drop(engine);
}

#[test]
fn engine_with_injected_parts_restores_from_cache() {
    let cache = Arc::new(MemoryCache::with_ids(ids(&["cached"])));
    let engine = EngineHandle::with_parts(
        &EngineConfig::default(),
        Arc::new(NoInventory),
        Arc::new(unreachable()),
        cache,
    )
    .expect("engine starts");

    engine.load_selection();
    assert_eq!(
        engine.recv_timeout(Duration::from_secs(5)),
        Some(EngineEvent::SelectionLoaded {
            ids: ids(&["cached"]),
            source: SelectionSource::LocalCache,
        })
    );
}

struct NoInventory;

#[async_trait::async_trait]
impl buildwatch_engine::InventorySource for NoInventory {
    async fn fetch(&self) -> Result<Vec<buildwatch_core::BuildRecord>, FetchError> {
        Ok(Vec::new())
    }
}

#[test]
fn dropping_the_engine_keeps_an_unsaved_edit() {
    for round in 0..50 {
        let cache = Arc::new(MemoryCache::default());
        let engine = EngineHandle::with_parts(
            &EngineConfig::default(),
            Arc::new(NoInventory),
            Arc::new(unreachable()),
            cache.clone(),
        )
        .expect("engine starts");

        engine.persist(ids(&["a"]));
        drop(engine);

        assert_eq!(cache.get().unwrap(), Some(ids(&["a"])), "round {round}");
    }
}
