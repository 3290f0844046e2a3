//! Audio relay.
//!
//! Forwards a validated `target` URL to the audio host over plain http,
//! passing `Range` through and returning the upstream status unchanged so
//! 206 Partial Content reaches the player intact.

use axum::http::header::RANGE;
use axum::http::HeaderMap;
use axum::response::Response;

use crate::config::UpstreamConfig;
use crate::error::RelayError;
use crate::relay::into_client_response;
use crate::relay::upstream::{OutboundRequest, Upstream};
use crate::security::{build_outbound_request_headers, validate_target, RelayKind};

/// Relay one audio request. Validation failures return before any outbound call.
pub async fn relay_audio(
    upstream: &dyn Upstream,
    config: &UpstreamConfig,
    target: &str,
    inbound: &HeaderMap,
) -> Result<Response, RelayError> {
    let target = validate_target(target, &config.audio_domain)?;
    let headers = build_outbound_request_headers(inbound, RelayKind::Audio, config);

    tracing::debug!(
        host = target.host(),
        port = ?target.port(),
        path = target.path(),
        query = ?target.query(),
        range = ?headers.get(RANGE),
        "Relaying audio"
    );

    let response = upstream
        .fetch(OutboundRequest {
            url: target.into_url(),
            headers,
        })
        .await
        .map_err(|source| RelayError::Upstream {
            kind: RelayKind::Audio,
            source,
        })?;

    Ok(into_client_response(response, RelayKind::Audio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::upstream::testing::RecordingUpstream;
    use axum::http::{header, HeaderValue, StatusCode};

    fn partial_content() -> RecordingUpstream {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
        headers.insert(header::CONTENT_RANGE, HeaderValue::from_static("bytes 100-104/5000"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("5"));
        headers.insert(header::SET_COOKIE, HeaderValue::from_static("k=v"));
        RecordingUpstream::respond(StatusCode::PARTIAL_CONTENT, headers, "abcde")
    }

    #[tokio::test]
    async fn test_range_passthrough() {
        let upstream = partial_content();
        let mut inbound = HeaderMap::new();
        inbound.insert(RANGE, HeaderValue::from_static("bytes=100-200"));

        let response = relay_audio(
            &upstream,
            &UpstreamConfig::default(),
            "https://sycdn.kuwo.cn/x/song.mp3?sig=1",
            &inbound,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes 100-104/5000"
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=3600"
        );
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let call = upstream.last_call();
        assert_eq!(call.url.as_str(), "http://sycdn.kuwo.cn/x/song.mp3?sig=1");
        assert_eq!(call.headers.get(RANGE).unwrap(), "bytes=100-200");
        assert_eq!(call.headers.get(header::REFERER).unwrap(), "https://www.kuwo.cn/");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"abcde");
    }

    #[tokio::test]
    async fn test_invalid_target_makes_no_call() {
        let upstream = partial_content();
        let err = relay_audio(
            &upstream,
            &UpstreamConfig::default(),
            "http://evil.com/a.mp3",
            &HeaderMap::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RelayError::InvalidTarget(_)));
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let upstream = RecordingUpstream::failing();
        let err = relay_audio(
            &upstream,
            &UpstreamConfig::default(),
            "http://kuwo.cn/a.mp3",
            &HeaderMap::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            RelayError::Upstream {
                kind: RelayKind::Audio,
                ..
            }
        ));
        assert_eq!(upstream.call_count(), 1);
    }
}
