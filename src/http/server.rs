//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router and wire middleware (tracing, request ID)
//! - Classify each request once and dispatch on its [`RequestKind`]
//! - Record per-request metrics
//! - Serve until the shutdown signal

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::http::{files, response};
use crate::lifecycle::shutdown_signal;
use crate::observability::metrics;
use crate::relay::{relay_api, relay_audio, HttpUpstream, Upstream, UpstreamError};
use crate::routing::RequestKind;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub upstream: Arc<dyn Upstream>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: Arc<RelayConfig>,
}

impl HttpServer {
    /// Create a server that talks to the real upstreams.
    pub fn new(config: RelayConfig) -> Result<Self, UpstreamError> {
        let upstream = HttpUpstream::new(&config.timeouts)?;
        Ok(Self::with_upstream(config, Arc::new(upstream)))
    }

    /// Create a server with a caller-supplied transport.
    pub fn with_upstream(config: RelayConfig, upstream: Arc<dyn Upstream>) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            upstream,
        };
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .fallback(relay_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl-C, SIGTERM or a message on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            static_root = %self.config.static_files.root.display(),
            api = %self.config.upstream.api_base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single entry point for every request.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, _body) = request.into_parts();
    let kind = RequestKind::classify(&parts.method, &parts.uri);
    let label = kind.label();

    let request_id = parts
        .headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %parts.uri.path(),
        kind = label,
        "Dispatching request"
    );

    let config = &state.config;
    let response = match kind {
        RequestKind::Preflight => response::preflight(),
        RequestKind::MethodNotAllowed(method) => {
            RelayError::MethodNotAllowed(method).into_response()
        }
        RequestKind::Audio { target } => {
            relay_audio(state.upstream.as_ref(), &config.upstream, &target, &parts.headers)
                .await
                .unwrap_or_else(IntoResponse::into_response)
        }
        RequestKind::Api { params } => {
            relay_api(state.upstream.as_ref(), &config.upstream, &params, &parts.headers)
                .await
                .unwrap_or_else(IntoResponse::into_response)
        }
        RequestKind::Static { path } => files::serve_static(&path, &config.static_files)
            .await
            .unwrap_or_else(IntoResponse::into_response),
    };

    metrics::record_request(label, response.status().as_u16(), start_time);
    response
}
