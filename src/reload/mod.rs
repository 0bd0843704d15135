//! Update-and-reload coordination.
//!
//! # Data Flow
//! ```text
//! PUT /api/settings
//!     → coordinator.rs (decode → validate → canonicalize → store)
//!     → ActivityProbe
//!         busy → RestartState set, caller told needs_restart
//!         idle → signaler.rs schedules reload (500ms grace)
//!                 → reload event channel
//!                 → lifecycle supervisor reloads live settings
//! ```

pub mod coordinator;
pub mod signaler;

pub use coordinator::{
    ActivityProbe, CoordinatorState, ReloadCoordinator, RestartState, UpdateOutcome,
};
pub use signaler::{channel, ReloadEvent, ReloadEvents, ReloadSignaler, RELOAD_GRACE};
