//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! ?target=<url>                         ?types=<op>&...
//!     → audio.rs                            → api.rs
//!       (validate target, audio headers)      (rebuild API URL, api headers)
//!     → upstream.rs (single GET, no retry)
//!     → filter response headers
//!     → stream.rs (chunked passthrough, abort on downstream close)
//!     → client
//! ```
//!
//! # Design Decisions
//! - Upstream status is passed through untouched (206 stays 206)
//! - Bodies are never buffered or transformed
//! - Transport errors become a generic 500; the cause is only logged

pub mod api;
pub mod audio;
pub mod stream;
pub mod upstream;

use axum::response::Response;

use crate::security::{filter_response_headers, RelayKind};
use upstream::UpstreamResponse;

pub use api::relay_api;
pub use audio::relay_audio;
pub use upstream::{HttpUpstream, OutboundRequest, Upstream, UpstreamError};

/// Turn an upstream response into the client response: same status,
/// allow-listed headers, streamed body.
pub fn into_client_response(upstream: UpstreamResponse, kind: RelayKind) -> Response {
    tracing::debug!(kind = %kind, status = %upstream.status, "Upstream responded");

    let mut response = Response::new(stream::relay_body(upstream.body, kind));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = filter_response_headers(&upstream.headers, kind);
    response
}
