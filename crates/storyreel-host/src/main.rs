//! Storyreel headless player entry point.

use std::error::Error;

use storyreel_host::config::HostConfig;
use storyreel_host::runner;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting storyreel host");

    let config = HostConfig::from_env()?;
    tracing::info!(
        story = %config.story_path.display(),
        start_chapter = config.start_chapter,
        "configuration loaded"
    );

    runner::run(config).await?;

    Ok(())
}
