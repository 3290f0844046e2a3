//! Upstream body passthrough.
//!
//! Chunks are forwarded as the downstream consumes them; nothing is buffered
//! beyond the chunk in flight. When the client goes away the server drops the
//! response body, which drops the upstream body with it and closes the
//! upstream connection.

use axum::body::Body;
use futures_util::stream::{self, StreamExt};

use crate::security::RelayKind;

/// Tracks whether a relayed body reached its end.
struct StreamGuard {
    kind: RelayKind,
    bytes: u64,
    finished: bool,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                kind = %self.kind,
                bytes = self.bytes,
                "Downstream closed before upstream body finished, aborting upstream read"
            );
        }
    }
}

/// Wrap an upstream body so it is forwarded chunk by chunk, logging early
/// downstream disconnects and mid-stream upstream failures.
pub fn relay_body(body: Body, kind: RelayKind) -> Body {
    let guard = StreamGuard {
        kind,
        bytes: 0,
        finished: false,
    };

    let chunks = stream::unfold(
        (body.into_data_stream(), guard),
        |(mut upstream, mut guard)| async move {
            match upstream.next().await {
                Some(Ok(chunk)) => {
                    guard.bytes += chunk.len() as u64;
                    Some((Ok(chunk), (upstream, guard)))
                }
                Some(Err(e)) => {
                    // Headers are already sent; the connection is cut instead.
                    tracing::warn!(kind = %guard.kind, bytes = guard.bytes, error = %e, "Upstream body failed mid-stream");
                    guard.finished = true;
                    Some((Err(e), (upstream, guard)))
                }
                None => {
                    guard.finished = true;
                    tracing::trace!(kind = %guard.kind, bytes = guard.bytes, "Upstream body complete");
                    None
                }
            }
        },
    );

    Body::from_stream(chunks)
}
