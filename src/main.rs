mod config;
mod error;
mod handlers;
mod response;
mod routes;

use crate::config::Config;
use anyhow::Context;
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const ENV_FILE: &str = "../.env";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenv::from_path(Path::new(ENV_FILE)) {
        Ok(()) => debug!("Loaded environment from {ENV_FILE}"),
        Err(err) => debug!("Not loading {ENV_FILE}: {err}"),
    }

    let config = Config::from_env().context("Failed to load config")?;
    debug!("Loaded config: {config:?}");
    if let Some(database_uri) = config.database_uri() {
        debug!("Database URI: {database_uri}");
    }

    let upload_dir = config.upload_dir();
    if handlers::ensure_upload_dir(&upload_dir)
        .await
        .with_context(|| format!("Could not create upload folder {upload_dir:?}"))?
    {
        info!("Created upload folder {upload_dir:?}");
    }

    let app = routes::router(&config)?;

    let listener = TcpListener::bind(config.listen_address.as_str())
        .await
        .with_context(|| format!("Could not listen on {}", config.listen_address))?;

    info!(
        "{} ({}) listening on {}",
        config.project_name, config.environment, config.listen_address
    );

    axum::serve(listener, app).await?;

    Ok(())
}
