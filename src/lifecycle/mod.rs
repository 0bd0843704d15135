//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Open store → Seed if empty → Load live settings → Wire coordinator
//!
//! Supervisor (supervisor.rs):
//!     Reload event → Re-read stored settings → Swap live snapshot
//!     → Clear restart flag → Work loops observe new generation
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Immediate reload event
//!
//! Shutdown (shutdown.rs):
//!     Broadcast to HTTP server and supervisor → Exit
//! ```
//!
//! # Design Decisions
//! - Startup failures are fatal; reload failures keep the old snapshot
//! - Reload is an in-process event, not a re-exec of the binary

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use startup::{build, Service};
pub use supervisor::Supervisor;
