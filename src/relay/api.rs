//! Metadata API relay.
//!
//! Re-serializes the client's query onto the configured API endpoint and
//! streams the JSON answer back. Parameters are forwarded as opaque strings;
//! only `target` and `callback` (JSONP) are removed.

use axum::http::HeaderMap;
use axum::response::Response;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::RelayError;
use crate::relay::into_client_response;
use crate::relay::upstream::{OutboundRequest, Upstream, UpstreamError};
use crate::routing::QueryParams;
use crate::security::{build_outbound_request_headers, RelayKind};

/// Query parameters never forwarded to the API.
pub const STRIPPED_PARAMS: [&str; 2] = ["target", "callback"];

/// Parameter selecting the upstream operation (search, url, lyric, pic, ...).
pub const TYPES_PARAM: &str = "types";

/// Build the upstream URL. Client parameters replace same-named parameters
/// already present on `base`. Fails with [`RelayError::MissingTypes`] when the
/// result has no non-empty `types`.
pub fn build_api_url(base: &str, params: &QueryParams) -> Result<Url, RelayError> {
    let mut url = Url::parse(base).map_err(|e| RelayError::Upstream {
        kind: RelayKind::Api,
        source: UpstreamError::Request(format!("bad API base URL: {e}")),
    })?;

    let forwarded: Vec<(String, String)> = params
        .iter()
        .filter(|(key, _)| !STRIPPED_PARAMS.contains(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut merged: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(key, _)| !forwarded.iter().any(|(k, _)| k == key))
        .collect();
    merged.extend(forwarded);

    if !merged.iter().any(|(k, v)| k == TYPES_PARAM && !v.is_empty()) {
        return Err(RelayError::MissingTypes);
    }

    url.set_query(None);
    url.query_pairs_mut().extend_pairs(merged.iter());
    Ok(url)
}

/// Relay one API request. A missing `types` returns before any outbound call.
pub async fn relay_api(
    upstream: &dyn Upstream,
    config: &UpstreamConfig,
    params: &QueryParams,
    inbound: &HeaderMap,
) -> Result<Response, RelayError> {
    let url = build_api_url(&config.api_base_url, params)?;
    let headers = build_outbound_request_headers(inbound, RelayKind::Api, config);

    tracing::debug!(
        types = params.get(TYPES_PARAM).unwrap_or_default(),
        params = params.len(),
        "Relaying API request"
    );

    let response = upstream
        .fetch(OutboundRequest { url, headers })
        .await
        .map_err(|source| RelayError::Upstream {
            kind: RelayKind::Api,
            source,
        })?;

    Ok(into_client_response(response, RelayKind::Api))
}
