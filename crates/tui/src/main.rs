mod app;
mod config;
mod error;
mod local_state;
mod ui;

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use crate::error::{AppError, Result};

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(config: &config::AppConfig) -> Result<()> {
    let path = Path::new(&config.log_file);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let level = &config.log_level;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "collectpro_tui={level},collect_client={level},engine={level}"
        ))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_logging(&config)?;
    tracing::info!(base_url = %config.base_url, "starting collectpro_tui");

    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}
