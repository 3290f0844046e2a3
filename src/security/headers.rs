//! Header filtering for relayed traffic.
//!
//! # Responsibilities
//! - Build the minimal outbound header set for each relay kind
//! - Allow-list upstream response headers before they reach the client
//! - Inject defaults (cache-control, content-type) and the CORS origin header
//!
//! # Design Decisions
//! - Allow-list, never block-list: anything not enumerated is dropped
//! - Filtering is idempotent: a filtered set filters to itself

use std::fmt;

use axum::http::header::{
    self, HeaderMap, HeaderName, HeaderValue, ACCEPT, RANGE, REFERER, USER_AGENT,
};

use crate::config::UpstreamConfig;

/// Response headers that may pass from an upstream to the client.
pub static RESPONSE_HEADER_ALLOW_LIST: [HeaderName; 8] = [
    header::CONTENT_TYPE,
    header::CACHE_CONTROL,
    header::ACCEPT_RANGES,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ETAG,
    header::LAST_MODIFIED,
    header::EXPIRES,
];

const AUDIO_CACHE_CONTROL: &str = "public, max-age=3600";
const API_CACHE_CONTROL: &str = "no-store";
const API_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Which relay a header set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    Audio,
    Api,
}

impl RelayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayKind::Audio => "audio",
            RelayKind::Api => "api",
        }
    }
}

impl fmt::Display for RelayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keep only allow-listed upstream headers, then apply the per-kind defaults
/// and `Access-Control-Allow-Origin: *`.
pub fn filter_response_headers(upstream: &HeaderMap, kind: RelayKind) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for name in RESPONSE_HEADER_ALLOW_LIST.iter() {
        for value in upstream.get_all(name) {
            filtered.append(name.clone(), value.clone());
        }
    }

    if !filtered.contains_key(header::CACHE_CONTROL) {
        let default = match kind {
            RelayKind::Audio => AUDIO_CACHE_CONTROL,
            RelayKind::Api => API_CACHE_CONTROL,
        };
        filtered.insert(header::CACHE_CONTROL, HeaderValue::from_static(default));
    }

    if kind == RelayKind::Api && !filtered.contains_key(header::CONTENT_TYPE) {
        filtered.insert(header::CONTENT_TYPE, HeaderValue::from_static(API_CONTENT_TYPE));
    }

    filtered.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    filtered
}

/// Build the header set for the upstream leg of a relayed request.
///
/// Audio requests carry `User-Agent`, the fixed `Referer` and, when the client
/// sent one, its `Range` unchanged. API requests carry `User-Agent` and
/// `Accept: application/json`. Nothing else from the client is forwarded.
pub fn build_outbound_request_headers(
    inbound: &HeaderMap,
    kind: RelayKind,
    upstream: &UpstreamConfig,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let user_agent = inbound
        .get(USER_AGENT)
        .filter(|v| !v.is_empty())
        .cloned()
        .or_else(|| HeaderValue::from_str(&upstream.default_user_agent).ok());
    if let Some(user_agent) = user_agent {
        headers.insert(USER_AGENT, user_agent);
    }

    match kind {
        RelayKind::Audio => {
            // Checked by `validate_config` before the server starts.
            if let Ok(referer) = HeaderValue::from_str(&upstream.audio_referer) {
                headers.insert(REFERER, referer);
            }
            if let Some(range) = inbound.get(RANGE) {
                headers.insert(RANGE, range.clone());
            }
        }
        RelayKind::Api => {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
    }

    headers
}
