//! Collaborator traits through which the schedulers reach the world
//! model and the presentation layer.
//!
//! The scheduler core never owns these subsystems; it holds handles
//! passed in at controller construction and calls through the narrow
//! contracts below.

use crate::error::{PresentationError, WorldError};

/// The shared world model.
///
/// Referenced (`Arc<dyn WorldModel>`), never owned, by both scheduler
/// threads. Interior state is the collaborator's concern; the engine
/// guarantees that [`tick`](WorldModel::tick) runs only on the physics
/// thread inside the gate's tick section, and that
/// [`process_pending_additions`](WorldModel::process_pending_additions) /
/// [`process_pending_deletions`](WorldModel::process_pending_deletions)
/// run only on the presentation thread inside the removal section.
pub trait WorldModel: Send + Sync {
    /// Construct/load the world. Called once per run during startup;
    /// failure is fatal and aborts startup.
    fn load(&self) -> Result<(), WorldError>;

    /// Advance physics by one fixed step.
    ///
    /// # Errors
    ///
    /// A [`WorldError::TickFailed`] is fatal: the run terminates.
    fn tick(&self) -> Result<(), WorldError>;

    /// Apply queued entity additions.
    ///
    /// Deferred to the presentation cadence so world topology is never
    /// mutated mid-integration.
    fn process_pending_additions(&self);

    /// Apply queued entity deletions. Same deferral as additions.
    fn process_pending_deletions(&self);

    /// Drain inbound world-interface messages. Called by the physics
    /// thread once per iteration, outside the tick section.
    fn service_inbound_messages(&self);

    /// Release world resources. Must tolerate being called after a
    /// failed load.
    fn close(&self);
}

/// The render/GUI collaborator.
///
/// Lives on the presentation thread only. All calls are best-effort
/// and non-blocking. Headless mode passes no presentation handle at
/// all, and every call site is simply skipped.
pub trait Presentation: Send {
    /// Initialise the render/GUI subsystem. Failure is fatal and
    /// aborts startup.
    fn load(&mut self) -> Result<(), PresentationError>;

    /// Refresh render-camera state.
    fn refresh_cameras(&mut self);

    /// Refresh GUI widget state.
    fn refresh_widgets(&mut self);

    /// Release render/GUI resources.
    fn close(&mut self);
}
