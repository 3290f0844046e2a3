//! Outbound transport.
//!
//! # Responsibilities
//! - Issue the single GET of a relayed request
//! - Pick the client by scheme: plain http through the hyper-util client,
//!   https through reqwest
//! - Hand back status, headers and an unbuffered body stream
//! - Apply the optional response-header deadline
//!
//! # Design Decisions
//! - [`Upstream`] is the only seam between the relays and the network
//! - No retries: the first failure is returned to the caller
//! - The deadline covers connect + response headers, never the body

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use futures_util::future::BoxFuture;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::config::TimeoutConfig;

/// Failure of the outbound leg before response headers arrived.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("no response headers within {0:?}")]
    Timeout(Duration),

    #[error("could not build request: {0}")]
    Request(String),
}

/// A GET about to be sent upstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: Url,
    pub headers: HeaderMap,
}

/// Upstream status and headers, with the body still streaming.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

/// Sends outbound requests on behalf of the relays.
pub trait Upstream: Send + Sync {
    fn fetch(&self, request: OutboundRequest) -> BoxFuture<'static, Result<UpstreamResponse, UpstreamError>>;
}

/// Network-backed [`Upstream`].
#[derive(Clone)]
pub struct HttpUpstream {
    plain: Client<HttpConnector, Body>,
    tls: reqwest::Client,
    deadline: Option<Duration>,
}

impl HttpUpstream {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, UpstreamError> {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(timeouts.connect());
        let plain = Client::builder(TokioExecutor::new()).build(connector);

        let mut tls = reqwest::Client::builder();
        if let Some(connect) = timeouts.connect() {
            tls = tls.connect_timeout(connect);
        }
        let tls = tls
            .build()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        Ok(Self {
            plain,
            tls,
            deadline: timeouts.upstream(),
        })
    }

    async fn send_plain(
        client: Client<HttpConnector, Body>,
        request: OutboundRequest,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(request.url.as_str());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(request.headers);
        }
        let req = builder
            .body(Body::empty())
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let response = client
            .request(req)
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let (parts, body) = response.into_parts();
        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body: Body::new(body),
        })
    }

    async fn send_tls(
        client: reqwest::Client,
        request: OutboundRequest,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let response = client
            .get(request.url)
            .headers(request.headers)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(UpstreamResponse {
            status: response.status(),
            headers: response.headers().clone(),
            body: Body::from_stream(response.bytes_stream()),
        })
    }
}

impl Upstream for HttpUpstream {
    fn fetch(&self, request: OutboundRequest) -> BoxFuture<'static, Result<UpstreamResponse, UpstreamError>> {
        let plain = self.plain.clone();
        let tls = self.tls.clone();
        let deadline = self.deadline;

        Box::pin(async move {
            tracing::debug!(url = %request.url, "Sending upstream request");

            let send = async move {
                match request.url.scheme() {
                    "http" => Self::send_plain(plain, request).await,
                    "https" => Self::send_tls(tls, request).await,
                    other => Err(UpstreamError::Request(format!("unsupported scheme '{other}'"))),
                }
            };

            match deadline {
                Some(limit) => tokio::time::timeout(limit, send)
                    .await
                    .map_err(|_| UpstreamError::Timeout(limit))?,
                None => send.await,
            }
        })
    }
}
