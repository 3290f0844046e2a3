//! Music streaming relay.
//!
//! Serves the player's static files and relays two kinds of traffic the
//! browser cannot fetch directly: plain-http audio from the allow-listed
//! audio host, and the cross-origin metadata API.
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!   Browser              │                 music-relay                   │
//!   ───────────────────▶ │  routing ──┬─ ?target= ─▶ relay::audio ──────┼──▶ audio host (http)
//!                        │            ├─ ?types=  ─▶ relay::api   ──────┼──▶ metadata API
//!                        │            ├─ OPTIONS  ─▶ preflight          │
//!                        │            └─ other    ─▶ http::files        │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use music_relay::config::{load_config, loader};
use music_relay::observability::{logging, metrics};
use music_relay::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "music-relay", version, about = "Audio and metadata relay for the music player")]
struct Opt {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port (overrides PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory served for static requests
    #[arg(long = "static-root")]
    static_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Opt::parse();

    let mut config = load_config(opt.config.as_deref())?;
    if let Some(port) = opt.port {
        config.listener.port = port;
    }
    if let Some(root) = opt.static_root {
        config.static_files.root = root;
    }
    let mut config = loader::finalize(config)?;
    config.static_files.root = config
        .static_files
        .root
        .canonicalize()
        .map_err(|e| format!("static root {}: {e}", config.static_files.root.display()))?;

    logging::init_logging(&config.observability.log_level)?;

    tracing::info!("music-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = config.listener.port,
        audio_domain = %config.upstream.audio_domain,
        upstream_timeout_secs = ?config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        static_root = %config.static_files.root.display(),
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
