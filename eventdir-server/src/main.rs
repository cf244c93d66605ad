mod routes;
mod state;

use anyhow::{Context, Result};
use eventdir_core::EventDirConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("eventdir=info".parse()?))
        .init();

    let config = EventDirConfig::load().context("Failed to load eventdir config")?;
    let state = AppState::new(config.data_path(), config.ics_options())?;

    let app = routes::app(state);

    info!("eventdir-server listening on http://{}", config.bind);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Could not bind {}", config.bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
