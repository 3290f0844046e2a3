//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Audio relay request:
//!     → target.rs (parse, host allow-list, scheme → http)
//!     → headers.rs (outbound header set, response allow-list)
//!
//! API relay request:
//!     → headers.rs
//!
//! Static request:
//!     → path.rs (join onto root, reject traversal)
//! ```
//!
//! # Design Decisions
//! - Fail closed: every check returns a typed rejection, never panics
//! - All checks run before any outbound call
//! - No trust in client input

pub mod headers;
pub mod path;
pub mod target;

pub use headers::{build_outbound_request_headers, filter_response_headers, RelayKind};
pub use path::{resolve, Forbidden};
pub use target::{validate_target, InvalidTarget, ValidatedTarget};
