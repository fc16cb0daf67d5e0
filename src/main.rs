use registry_scraper::config::{load_config, Config};
use registry_scraper::models::{CliApp, Result};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration, falling back to defaults. The warning is deferred
    // until the subscriber is installed so it actually shows up.
    let (config, config_err) = match load_config("config.yml").await {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Setup logging
    let default_filter = format!(
        "registry_scraper={},hyper=warn,reqwest=warn",
        config.logging.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Some(e) = config_err {
        warn!("Failed to load config.yml: {}. Using defaults.", e);
    }

    // Create output directory
    tokio::fs::create_dir_all(&config.output.data_dir).await?;

    // Initialize and run CLI app
    let app = CliApp::new(config);

    // Add graceful shutdown
    tokio::select! {
        result = app.run() => {
            result?;
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
