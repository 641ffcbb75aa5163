//! Test collaborators for Cadence development.
//!
//! Provides fake implementations of the [`WorldModel`] and
//! [`Presentation`] traits: a [`CountingWorld`] that records every
//! collaborator call and applies queued entity mutations through an
//! [`EntityIndex`], a [`FailingWorld`] for fatal-path testing, and a
//! [`RecordingPresentation`] whose shared probe survives the move into
//! the controller.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cadence_core::{
    Capability, EntityIndex, Presentation, PresentationError, WorldError, WorldModel,
};

// ── CountingWorld ────────────────────────────────────────────────

/// World fake that counts every collaborator call.
///
/// Structural mutations are modeled faithfully: additions and
/// deletions queue up and are applied to an internal [`EntityIndex`]
/// only when the presentation loop calls the deferred processing
/// operations. Hold an `Arc<CountingWorld>` in the test to inspect
/// counters after the controller is done with it.
pub struct CountingWorld {
    ticks: AtomicU64,
    messages_serviced: AtomicU64,
    additions_applied: AtomicU64,
    deletions_applied: AtomicU64,
    load_calls: AtomicU64,
    close_calls: AtomicU64,
    index: Mutex<EntityIndex>,
    pending_additions: Mutex<Vec<(String, Capability)>>,
    pending_deletions: Mutex<Vec<String>>,
    tick_delay: Option<Duration>,
}

impl CountingWorld {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            messages_serviced: AtomicU64::new(0),
            additions_applied: AtomicU64::new(0),
            deletions_applied: AtomicU64::new(0),
            load_calls: AtomicU64::new(0),
            close_calls: AtomicU64::new(0),
            index: Mutex::new(EntityIndex::new()),
            pending_additions: Mutex::new(Vec::new()),
            pending_deletions: Mutex::new(Vec::new()),
            tick_delay: None,
        }
    }

    /// Make every tick take at least `delay` of wall time, simulating
    /// slow hardware.
    pub fn with_tick_delay(delay: Duration) -> Self {
        Self {
            tick_delay: Some(delay),
            ..Self::new()
        }
    }

    /// Queue a root entity addition for the next deferred processing
    /// pass.
    pub fn queue_addition(&self, name: impl Into<String>, capability: Capability) {
        self.pending_additions
            .lock()
            .unwrap()
            .push((name.into(), capability));
    }

    /// Queue an entity deletion by name for the next deferred
    /// processing pass.
    pub fn queue_deletion(&self, name: impl Into<String>) {
        self.pending_deletions.lock().unwrap().push(name.into());
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn messages_serviced(&self) -> u64 {
        self.messages_serviced.load(Ordering::Relaxed)
    }

    pub fn additions_applied(&self) -> u64 {
        self.additions_applied.load(Ordering::Relaxed)
    }

    pub fn deletions_applied(&self) -> u64 {
        self.deletions_applied.load(Ordering::Relaxed)
    }

    pub fn load_calls(&self) -> u64 {
        self.load_calls.load(Ordering::Relaxed)
    }

    pub fn close_calls(&self) -> u64 {
        self.close_calls.load(Ordering::Relaxed)
    }

    pub fn entity_count(&self) -> usize {
        self.index.lock().unwrap().len()
    }

    /// Inspect the entity index.
    pub fn with_index<R>(&self, f: impl FnOnce(&EntityIndex) -> R) -> R {
        f(&self.index.lock().unwrap())
    }
}

impl Default for CountingWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldModel for CountingWorld {
    fn load(&self) -> Result<(), WorldError> {
        self.load_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn tick(&self) -> Result<(), WorldError> {
        if let Some(delay) = self.tick_delay {
            std::thread::sleep(delay);
        }
        self.ticks.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn process_pending_additions(&self) {
        let queued: Vec<_> = self.pending_additions.lock().unwrap().drain(..).collect();
        let mut index = self.index.lock().unwrap();
        for (name, capability) in queued {
            index.insert(name, capability, None);
            self.additions_applied.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn process_pending_deletions(&self) {
        let queued: Vec<_> = self.pending_deletions.lock().unwrap().drain(..).collect();
        let mut index = self.index.lock().unwrap();
        for name in queued {
            if let Some(id) = index.find_by_name(&name) {
                index.remove(id);
                self.deletions_applied.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn service_inbound_messages(&self) {
        self.messages_serviced.fetch_add(1, Ordering::Relaxed);
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::Relaxed);
    }
}

// ── FailingWorld ─────────────────────────────────────────────────

/// World fake for fatal-path testing: fails its load step, or fails a
/// tick after a configurable number of successful ones.
pub struct FailingWorld {
    fail_load: bool,
    fail_after_ticks: Option<u64>,
    ticks: AtomicU64,
    close_calls: AtomicU64,
}

impl FailingWorld {
    /// Fail the delegated load step.
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            fail_after_ticks: None,
            ticks: AtomicU64::new(0),
            close_calls: AtomicU64::new(0),
        }
    }

    /// Succeed `ticks` times, then fail every tick.
    pub fn failing_tick_after(ticks: u64) -> Self {
        Self {
            fail_load: false,
            fail_after_ticks: Some(ticks),
            ticks: AtomicU64::new(0),
            close_calls: AtomicU64::new(0),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn close_calls(&self) -> u64 {
        self.close_calls.load(Ordering::Relaxed)
    }
}

impl WorldModel for FailingWorld {
    fn load(&self) -> Result<(), WorldError> {
        if self.fail_load {
            Err(WorldError::LoadFailed {
                reason: "induced load failure".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn tick(&self) -> Result<(), WorldError> {
        let completed = self.ticks.fetch_add(1, Ordering::Relaxed);
        match self.fail_after_ticks {
            Some(limit) if completed >= limit => Err(WorldError::TickFailed {
                reason: "induced tick failure".to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn process_pending_additions(&self) {}

    fn process_pending_deletions(&self) {}

    fn service_inbound_messages(&self) {}

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::Relaxed);
    }
}

// ── RecordingPresentation ────────────────────────────────────────

/// Shared counters for a [`RecordingPresentation`].
///
/// The presentation handle itself is boxed and moved into the
/// controller; the probe stays with the test.
#[derive(Debug, Default)]
pub struct PresentationProbe {
    pub camera_refreshes: AtomicU64,
    pub widget_refreshes: AtomicU64,
    pub load_calls: AtomicU64,
    pub close_calls: AtomicU64,
}

/// Presentation fake recording every call into its shared probe.
pub struct RecordingPresentation {
    probe: Arc<PresentationProbe>,
    fail_load: bool,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self {
            probe: Arc::new(PresentationProbe::default()),
            fail_load: false,
        }
    }

    /// Fail the delegated load step.
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::new()
        }
    }

    /// Counters shared with the moved-in handle.
    pub fn probe(&self) -> Arc<PresentationProbe> {
        Arc::clone(&self.probe)
    }
}

impl Default for RecordingPresentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentation for RecordingPresentation {
    fn load(&mut self) -> Result<(), PresentationError> {
        self.probe.load_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_load {
            Err(PresentationError::LoadFailed {
                reason: "induced load failure".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn refresh_cameras(&mut self) {
        self.probe.camera_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    fn refresh_widgets(&mut self) {
        self.probe.widget_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    fn close(&mut self) {
        self.probe.close_calls.fetch_add(1, Ordering::Relaxed);
    }
}
