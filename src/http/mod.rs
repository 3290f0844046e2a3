//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → routing (classify into RequestKind)
//!     → relay / files.rs / response.rs
//!     → Send to client
//! ```

pub mod files;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
