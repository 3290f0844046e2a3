//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query)
//!     → query.rs (decode query string once)
//!     → kind.rs (ordered classification)
//!     → Return: RequestKind, dispatched by http/server.rs
//! ```
//!
//! # Design Decisions
//! - Deterministic: same input always yields the same kind
//! - First match wins: preflight, method, target, types, static
//! - Query values stay untyped strings; the API owns their meaning

pub mod kind;
pub mod query;

pub use kind::RequestKind;
pub use query::QueryParams;
