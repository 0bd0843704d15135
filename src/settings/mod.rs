//! Runtime settings subsystem.
//!
//! # Data Flow
//! ```text
//! PUT body (JSON)
//!     → document.rs (decode into typed shape, unknown keys dropped)
//!     → validation.rs (structural invariants)
//!     → document.rs (canonical re-encode)
//!     → store.rs (atomic replace of the single blob)
//!
//! GET
//!     → store.rs (load blob)
//!     → document.rs (decode, blank secrets)
//!
//! On reload:
//!     supervisor loads the stored document
//!     → live.rs (swap snapshot, bump generation)
//! ```

pub mod document;
pub mod error;
pub mod live;
pub mod store;
pub mod validation;

pub use document::{Messenger, Settings, SmtpServer, UploadProvider};
pub use error::SettingsError;
pub use live::LiveSettings;
pub use store::{FileStore, MemoryStore, SettingsStore, StoreError};
pub use validation::{validate, ValidationError};
