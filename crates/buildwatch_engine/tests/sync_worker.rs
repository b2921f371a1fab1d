use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use buildwatch_core::{SaveOutcome, SyncSettings};
use buildwatch_engine::{
    EngineEvent, EventSink, FailureKind, FetchError, LocalCache, MemoryCache, SelectionBackend,
    SyncHandle,
};
use pretty_assertions::assert_eq;
use tokio::time::{sleep, Instant};

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Default)]
struct RecordingBackend {
    delay: Duration,
    fail: bool,
    saves: Mutex<Vec<(Instant, Vec<String>)>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl RecordingBackend {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn saves(&self) -> Vec<(Instant, Vec<String>)> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SelectionBackend for RecordingBackend {
    async fn load(&self) -> Result<Vec<String>, FetchError> {
        Ok(Vec::new())
    }

    async fn save(&self, ids: &[String]) -> Result<(), FetchError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        self.saves.lock().unwrap().push((Instant::now(), ids.to_vec()));
        sleep(self.delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        if self.fail {
            Err(FetchError {
                kind: FailureKind::HttpStatus(500),
                message: "boom".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|id| id.to_string()).collect()
}

struct Harness {
    backend: Arc<RecordingBackend>,
    cache: Arc<MemoryCache>,
    sink: Arc<TestSink>,
    sync: SyncHandle,
}

fn start(backend: RecordingBackend, save_timeout: Duration) -> Harness {
    let backend = Arc::new(backend);
    let cache = Arc::new(MemoryCache::default());
    let sink = Arc::new(TestSink::default());
    let sync = SyncHandle::spawn(
        SyncSettings {
            debounce: Duration::from_millis(1000),
        },
        save_timeout,
        backend.clone(),
        cache.clone(),
        sink.clone(),
    );
    Harness {
        backend,
        cache,
        sink,
        sync,
    }
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_is_saved_once_after_quiet_period() {
    let start_at = Instant::now();
    let h = start(RecordingBackend::default(), Duration::from_secs(10));

    h.sync.persist(ids(&["a"]));
    sleep(Duration::from_millis(200)).await;
    h.sync.persist(ids(&["a", "b"]));
    sleep(Duration::from_millis(200)).await;
    h.sync.persist(ids(&["a", "b", "c"]));
    sleep(Duration::from_secs(3)).await;

    let saves = h.backend.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].1, ids(&["a", "b", "c"]));
    let fired_after = saves[0].0 - start_at;
    assert!(fired_after >= Duration::from_millis(1400), "{fired_after:?}");
    assert!(fired_after < Duration::from_millis(1450), "{fired_after:?}");

    assert_eq!(h.cache.get().unwrap(), Some(ids(&["a", "b", "c"])));
    assert_eq!(
        h.sink.take(),
        vec![EngineEvent::SaveSettled {
            generation: 1,
            outcome: SaveOutcome::Saved,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn edit_during_save_waits_for_it_to_settle() {
    let start_at = Instant::now();
    let h = start(
        RecordingBackend::with_delay(Duration::from_secs(3)),
        Duration::from_secs(10),
    );

    h.sync.persist(ids(&["a"]));
    sleep(Duration::from_millis(1500)).await;
    h.sync.persist(ids(&["a", "b"]));
    sleep(Duration::from_secs(10)).await;

    let saves = h.backend.saves();
    assert_eq!(saves.len(), 2);
    assert_eq!(saves[0].1, ids(&["a"]));
    assert_eq!(saves[1].1, ids(&["a", "b"]));
    assert!(saves[1].0 - start_at >= Duration::from_millis(4000));
    assert_eq!(h.backend.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(h.cache.get().unwrap(), Some(ids(&["a", "b"])));
}

#[tokio::test(start_paused = true)]
async fn failed_save_falls_back_to_local_cache() {
    let h = start(RecordingBackend::failing(), Duration::from_secs(10));

    h.sync.persist(ids(&["x"]));
    sleep(Duration::from_secs(2)).await;

    assert_eq!(h.cache.get().unwrap(), Some(ids(&["x"])));
    match h.sink.take().as_slice() {
        [EngineEvent::SaveSettled {
            generation: 1,
            outcome: SaveOutcome::FellBackToCache { reason },
        }] => assert!(reason.contains("500"), "{reason}"),
        other => panic!("unexpected events: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn hung_save_is_abandoned_after_timeout() {
    let h = start(
        RecordingBackend::with_delay(Duration::from_secs(60)),
        Duration::from_secs(5),
    );

    h.sync.persist(ids(&["slow"]));
    sleep(Duration::from_millis(6500)).await;

    assert_eq!(h.cache.get().unwrap(), Some(ids(&["slow"])));
    assert_eq!(
        h.sink.take(),
        vec![EngineEvent::SaveSettled {
            generation: 1,
            outcome: SaveOutcome::FellBackToCache {
                reason: "timeout".to_string(),
            },
        }]
    );

    h.sync.persist(ids(&["slow", "next"]));
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(h.backend.saves().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_keeps_unsaved_edits_locally() {
    let h = start(RecordingBackend::default(), Duration::from_secs(10));

    h.sync.persist(ids(&["pending"]));
    sleep(Duration::from_millis(100)).await;
    h.sync.shutdown().await;

    assert!(h.backend.saves().is_empty());
    assert_eq!(h.cache.get().unwrap(), Some(ids(&["pending"])));
}

#[tokio::test(start_paused = true)]
async fn edit_sent_right_before_shutdown_is_kept_locally() {
    let h = start(RecordingBackend::default(), Duration::from_secs(10));

    h.sync.persist(ids(&["first"]));
    h.sync.persist(ids(&["first", "last"]));
    h.sync.shutdown().await;

    assert!(h.backend.saves().is_empty());
    assert_eq!(h.cache.get().unwrap(), Some(ids(&["first", "last"])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_race_never_drops_the_last_edit() {
    for round in 0..50 {
        let h = start(RecordingBackend::default(), Duration::from_secs(10));
        h.sync.persist(ids(&["a"]));
        h.sync.shutdown().await;
        assert_eq!(h.cache.get().unwrap(), Some(ids(&["a"])), "round {round}");
    }
}
