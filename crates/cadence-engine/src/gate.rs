//! Reentrant mutual-exclusion boundary protecting world mutation.
//!
//! Two reentrant locks guard the shared world model: the update lock
//! covers a physics tick, the removal lock covers structural mutation
//! (entity add/remove processing). The physics thread takes both for a
//! tick; the presentation thread takes only the removal lock for its
//! deferred mutation pass.
//!
//! # Lock order
//!
//! Update first, removal second — always. [`tick_section`] is the only
//! place both locks are acquired, so the order cannot be violated by
//! callers holding one guard and asking for the other in reverse.
//! Reentrancy allows a thread already inside a tick section to open a
//! nested removal section without deadlocking.
//!
//! [`tick_section`]: WorldUpdateGate::tick_section

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// The synchronization boundary for all world mutation.
///
/// Carries no data; the world model itself is an external collaborator
/// referenced by the schedulers. Holding a section guard is what makes
/// calling into the world legal.
pub struct WorldUpdateGate {
    update: ReentrantMutex<()>,
    removal: ReentrantMutex<()>,
}

// Compile-time assertion: WorldUpdateGate must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<WorldUpdateGate>();
};

/// Guard for one physics tick: holds the update lock and the removal
/// lock, released together on every exit path.
#[must_use = "the tick section is released as soon as the guard is dropped"]
pub struct TickSection<'a> {
    _removal: ReentrantMutexGuard<'a, ()>,
    _update: ReentrantMutexGuard<'a, ()>,
}

/// Guard for deferred structural mutation: holds the removal lock only.
#[must_use = "the removal section is released as soon as the guard is dropped"]
pub struct RemovalSection<'a> {
    _removal: ReentrantMutexGuard<'a, ()>,
}

impl WorldUpdateGate {
    /// Create a gate with both locks free.
    pub fn new() -> Self {
        Self {
            update: ReentrantMutex::new(()),
            removal: ReentrantMutex::new(()),
        }
    }

    /// Enter the tick section: update lock, then removal lock.
    pub fn tick_section(&self) -> TickSection<'_> {
        let update = self.update.lock();
        let removal = self.removal.lock();
        TickSection {
            _removal: removal,
            _update: update,
        }
    }

    /// Enter the removal section: removal lock alone.
    pub fn removal_section(&self) -> RemovalSection<'_> {
        RemovalSection {
            _removal: self.removal.lock(),
        }
    }
}

impl Default for WorldUpdateGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WorldUpdateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldUpdateGate").finish()
    }
}
