//! Drives the debounced save cycle against the real clock and network.

use std::sync::Arc;
use std::time::Duration;

use buildwatch_core::{BuildId, SaveOutcome, SaveRequest, SyncCoordinator, SyncEffect, SyncPhase, SyncSettings};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use watch_logging::{watch_debug, watch_error, watch_info, watch_warn};

use crate::{EngineEvent, EventSink, FailureKind, LocalCache, SelectionBackend};

/// Handle to a running sync worker. Must be spawned inside a tokio runtime.
pub struct SyncHandle {
    tx: mpsc::UnboundedSender<Vec<BuildId>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SyncHandle {
    pub fn spawn(
        settings: SyncSettings,
        save_timeout: Duration,
        backend: Arc<dyn SelectionBackend>,
        cache: Arc<dyn LocalCache>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let worker = SyncWorker {
            coordinator: SyncCoordinator::new(settings),
            save_timeout,
            backend,
            cache,
            sink,
            last_seen: None,
        };
        let task = tokio::spawn(worker.run(rx, cancel.clone()));
        Self { tx, cancel, task }
    }

    /// Queues the full selection after an edit.
    pub fn persist(&self, ids: Vec<BuildId>) {
        let _ = self.tx.send(ids);
    }

    /// Stops the worker. Unsaved edits are written to the local cache first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

struct SyncWorker {
    coordinator: SyncCoordinator,
    save_timeout: Duration,
    backend: Arc<dyn SelectionBackend>,
    cache: Arc<dyn LocalCache>,
    sink: Arc<dyn EventSink>,
    last_seen: Option<Vec<BuildId>>,
}

impl SyncWorker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Vec<BuildId>>, cancel: CancellationToken) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(SaveRequest, SaveOutcome)>();
        loop {
            let deadline = self.coordinator.next_deadline();
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(ids) => self.record(ids),
                    None => break,
                },
                _ = cancel.cancelled() => break,
                Some((request, outcome)) = done_rx.recv() => self.settle(request, outcome),
                _ = wake_at(deadline), if deadline.is_some() => {
                    if let Some(request) = self.coordinator.poll(now()) {
                        self.dispatch(request, done_tx.clone());
                    }
                }
            }
        }
        // Edits queued behind the cancellation still count as unsaved.
        while let Ok(ids) = commands.try_recv() {
            self.record(ids);
        }
        self.flush_on_exit();
    }

    fn record(&mut self, ids: Vec<BuildId>) {
        watch_debug!("Selection changed ({} builds), save rescheduled", ids.len());
        self.last_seen = Some(ids.clone());
        self.coordinator.on_mutation(now(), ids);
    }

    fn dispatch(&self, request: SaveRequest, done_tx: mpsc::UnboundedSender<(SaveRequest, SaveOutcome)>) {
        watch_info!(
            "Saving selection #{} ({} builds)",
            request.generation,
            request.ids.len()
        );
        let backend = self.backend.clone();
        let save_timeout = self.save_timeout;
        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(save_timeout, backend.save(&request.ids)).await {
                Ok(Ok(())) => SaveOutcome::Saved,
                Ok(Err(err)) => SaveOutcome::FellBackToCache {
                    reason: err.to_string(),
                },
                Err(_) => SaveOutcome::FellBackToCache {
                    reason: FailureKind::Timeout.to_string(),
                },
            };
            let _ = done_tx.send((request, outcome));
        });
    }

    fn settle(&mut self, request: SaveRequest, outcome: SaveOutcome) {
        let generation = request.generation;
        match self.coordinator.on_save_settled(request, &outcome) {
            Some(SyncEffect::MirrorToCache { ids }) => {
                watch_info!("Selection #{generation} saved remotely");
                self.write_cache(&ids);
            }
            Some(SyncEffect::FallbackToCache { ids, reason }) => {
                watch_warn!("Remote save #{generation} failed ({reason}); kept locally");
                self.write_cache(&ids);
            }
            None => {
                watch_debug!("Ignoring stale completion of save #{generation}");
                return;
            }
        }
        self.sink.emit(EngineEvent::SaveSettled { generation, outcome });
    }

    fn write_cache(&self, ids: &[BuildId]) {
        if let Err(err) = self.cache.set(ids) {
            watch_error!("Failed to write local selection cache: {err}");
        }
    }

    fn flush_on_exit(&self) {
        if self.coordinator.phase() == SyncPhase::Idle {
            return;
        }
        if let Some(ids) = &self.last_seen {
            watch_info!("Unsaved selection written to local cache on shutdown");
            self.write_cache(ids);
        }
    }
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

// Only polled when `deadline` is set; the fallback keeps the branch expression valid.
fn wake_at(deadline: Option<std::time::Instant>) -> tokio::time::Sleep {
    let at = deadline.map(Instant::from_std).unwrap_or_else(Instant::now);
    tokio::time::sleep_until(at)
}
