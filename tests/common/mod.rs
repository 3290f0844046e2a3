//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use futures_util::future::BoxFuture;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use music_relay::relay::{OutboundRequest, Upstream, UpstreamError};
use music_relay::relay::upstream::UpstreamResponse;
use music_relay::{HttpServer, RelayConfig, Shutdown};

/// A raw-TCP HTTP/1.1 backend that records every request head it receives.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Value of `name` in the last request head, matched case-insensitively.
    pub fn last_header(&self, name: &str) -> Option<String> {
        let requests = self.requests.lock().unwrap();
        let head = requests.last()?;
        head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    pub fn last_request_line(&self) -> Option<String> {
        let requests = self.requests.lock().unwrap();
        requests.last()?.lines().next().map(str::to_string)
    }
}

/// Start a programmable backend; `respond` maps the request head to a raw
/// HTTP response.
pub async fn start_programmable_backend<F>(respond: F) -> MockBackend
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let recorded = requests.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let recorded = recorded.clone();
            let respond = respond.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let mut head = Vec::new();
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            head.extend_from_slice(&buf[..n]);
                            if head.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }
                let head = String::from_utf8_lossy(&head).to_string();
                let response = respond(&head);
                recorded.lock().unwrap().push(head);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockBackend { addr, requests }
}

/// Build a raw HTTP/1.1 response with Content-Length and `Connection: close`.
pub fn raw_response(status_line: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!("HTTP/1.1 {status_line}\r\n");
    for (name, value) in headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    ));
    response
}

/// Start the relay on an ephemeral port.
pub async fn spawn_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// In-process [`Upstream`] that records requests and returns a canned answer.
#[derive(Clone)]
pub struct MockUpstream {
    calls: Arc<Mutex<Vec<OutboundRequest>>>,
    status: StatusCode,
    headers: HeaderMap,
    body: &'static str,
    fail: bool,
}

impl MockUpstream {
    pub fn respond(status: StatusCode, headers: &[(&'static str, &'static str)], body: &'static str) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(*name, value.parse().unwrap());
        }
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            status,
            headers: map,
            body,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::respond(StatusCode::OK, &[], "")
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> OutboundRequest {
        self.calls.lock().unwrap().last().cloned().expect("no upstream call recorded")
    }
}

impl Upstream for MockUpstream {
    fn fetch(&self, request: OutboundRequest) -> BoxFuture<'static, Result<UpstreamResponse, UpstreamError>> {
        self.calls.lock().unwrap().push(request);
        let result = if self.fail {
            Err(UpstreamError::Transport("connection refused".into()))
        } else {
            Ok(UpstreamResponse {
                status: self.status,
                headers: self.headers.clone(),
                body: Body::from(self.body),
            })
        };
        Box::pin(async move { result })
    }
}
