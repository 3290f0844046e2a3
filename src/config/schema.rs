//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Upstream endpoints and fixed outbound header values.
    pub upstream: UpstreamConfig,

    /// Outbound deadlines.
    pub timeouts: TimeoutConfig,

    /// Static file serving.
    pub static_files: StaticConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. Overridden by the `PORT` environment variable.
    pub port: u16,
}

impl ListenerConfig {
    /// The `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
        }
    }
}

/// Upstream collaborators of the two relays.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base endpoint of the metadata API. Inbound query parameters are
    /// appended to it.
    pub api_base_url: String,

    /// Registrable domain of the audio host. The domain itself and all of
    /// its subdomains are accepted as relay targets.
    pub audio_domain: String,

    /// Fixed `Referer` sent on every audio request.
    pub audio_referer: String,

    /// `User-Agent` sent when the client did not provide one.
    pub default_user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://music-api.gdstudio.xyz/api.php".to_string(),
            audio_domain: "kuwo.cn".to_string(),
            audio_referer: "https://www.kuwo.cn/".to_string(),
            default_user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

/// Outbound deadlines.
///
/// Both are unset by default: a hung upstream holds the client request open
/// until one side gives up. Neither ever applies to body streaming, so long
/// audio downloads are not cut short.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for receiving upstream response headers, in seconds.
    pub upstream_secs: Option<u64>,

    /// TCP connect deadline, in seconds.
    pub connect_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn upstream(&self) -> Option<Duration> {
        self.upstream_secs.map(Duration::from_secs)
    }

    pub fn connect(&self) -> Option<Duration> {
        self.connect_secs.map(Duration::from_secs)
    }
}

/// Static file serving.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Directory served for requests that are neither relay kind.
    pub root: PathBuf,

    /// File served for `/`.
    pub default_document: String,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            default_document: "music.html".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
