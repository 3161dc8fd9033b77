use anyhow::Result;
use std::sync::Arc;

use symptom_checker::config::Config;
use symptom_checker::{init_tracing, relay_from_config, server};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::load();
    let relay = Arc::new(relay_from_config(&config)?);

    let listener = server::bind(&config).await?;
    tracing::info!(
        bind = %config.bind_address(),
        model = %config.gemini.model,
        "Server running on port {}",
        config.server.port
    );

    server::serve(listener, relay).await?;
    Ok(())
}
