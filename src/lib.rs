pub mod config;
pub mod error;
pub mod formatter;
pub mod intake;
pub mod models;
pub mod prompt;
pub mod relay;
pub mod server;
pub mod transport;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::relay::RelayService;
use crate::transport::{GeminiTransport, Transport};

/// Wire the relay against the real Gemini transport
pub fn relay_from_config(cfg: &Config) -> Result<RelayService> {
    let transport = Arc::new(GeminiTransport::new(&cfg.gemini)?);
    Ok(RelayService::new(transport as Arc<dyn Transport>))
}

/// Stderr tracing with `RUST_LOG` filtering, defaulting to `info`
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}
