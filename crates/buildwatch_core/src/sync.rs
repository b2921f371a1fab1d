//! Debounced persistence of the selection.
//!
//! The coordinator is a plain state machine driven by explicit timestamps. The
//! engine feeds it mutations and completions and asks it when to wake up; it
//! never touches a clock or the network itself.

use std::time::{Duration, Instant};

use crate::record::BuildId;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Quiet period after the last mutation before a save is dispatched.
    pub debounce: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    /// Debounce timer armed, nothing in flight.
    Pending,
    /// A remote write is in flight. A timer may also be armed for the next cycle.
    Saving,
}

/// Single resettable deadline. Arming replaces any previous deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebounceTimer {
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn arm(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarms and returns true once the deadline has been reached.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A save the engine should perform now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub generation: u64,
    pub ids: Vec<BuildId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Remote write failed or timed out; only the local cache was written.
    FellBackToCache { reason: String },
}

/// Follow-up work after a save settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEffect {
    /// Mirror a successful remote write into the local cache.
    MirrorToCache { ids: Vec<BuildId> },
    /// Remote write failed; the local cache is the only copy for now.
    FallbackToCache { ids: Vec<BuildId>, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncCoordinator {
    settings: SyncSettings,
    timer: DebounceTimer,
    latest: Option<Vec<BuildId>>,
    in_flight: Option<u64>,
    next_generation: u64,
}

impl SyncCoordinator {
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> SyncSettings {
        self.settings
    }

    pub fn phase(&self) -> SyncPhase {
        if self.in_flight.is_some() {
            SyncPhase::Saving
        } else if self.timer.is_armed() {
            SyncPhase::Pending
        } else {
            SyncPhase::Idle
        }
    }

    /// Records the selection after an edit and restarts the quiet period.
    /// During a save the new cycle waits until that save settles.
    pub fn on_mutation(&mut self, now: Instant, ids: Vec<BuildId>) {
        self.latest = Some(ids);
        self.timer.arm(now + self.settings.debounce);
    }

    /// When the driver should call `poll` next. `None` while a save is in flight
    /// or nothing is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.in_flight.is_some() {
            None
        } else {
            self.timer.deadline()
        }
    }

    /// Hands out the latest selection once the quiet period is over and no save is running.
    pub fn poll(&mut self, now: Instant) -> Option<SaveRequest> {
        if self.in_flight.is_some() || !self.timer.fire_if_due(now) {
            return None;
        }
        let ids = self.latest.take()?;
        self.next_generation += 1;
        let generation = self.next_generation;
        self.in_flight = Some(generation);
        Some(SaveRequest { generation, ids })
    }

    /// Completes the in-flight save. Both outcomes write the local cache. A timer
    /// armed during the save stays armed and fires on the next `poll` once due.
    pub fn on_save_settled(&mut self, request: SaveRequest, outcome: &SaveOutcome) -> Option<SyncEffect> {
        if self.in_flight != Some(request.generation) {
            return None;
        }
        self.in_flight = None;
        Some(match outcome {
            SaveOutcome::Saved => SyncEffect::MirrorToCache { ids: request.ids },
            SaveOutcome::FellBackToCache { reason } => SyncEffect::FallbackToCache {
                ids: request.ids,
                reason: reason.clone(),
            },
        })
    }

    pub fn saves_dispatched(&self) -> u64 {
        self.next_generation
    }
}

/// Where the startup selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Remote,
    LocalCache,
    /// Both stores answered and hold nothing.
    Empty,
    /// The remote read failed and no cached copy exists.
    Unavailable,
}

/// Load policy: a non-empty remote selection wins, then a non-empty local cache,
/// else nothing is selected. `remote` is `None` when the read failed. `local` is
/// only consulted when needed.
pub fn reconcile_selection<F>(remote: Option<Vec<BuildId>>, local: F) -> (Vec<BuildId>, SelectionSource)
where
    F: FnOnce() -> Option<Vec<BuildId>>,
{
    let remote_failed = remote.is_none();
    if let Some(ids) = remote.filter(|ids| !ids.is_empty()) {
        return (ids, SelectionSource::Remote);
    }
    match local().filter(|ids| !ids.is_empty()) {
        Some(ids) => (ids, SelectionSource::LocalCache),
        None if remote_failed => (Vec::new(), SelectionSource::Unavailable),
        None => (Vec::new(), SelectionSource::Empty),
    }
}
