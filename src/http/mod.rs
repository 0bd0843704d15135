//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID lookup for logs)
//!     → admin handlers (settings, status, reload)
//!     → response.rs (data envelope, error mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use response::{ApiError, OkResponse};
pub use server::{AppState, HttpServer};
