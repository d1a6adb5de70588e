use anyhow::Result;
use medibot::{config, server};
use tracing::{info, warn};

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Variables from .env must be visible before the config overlay runs
    let dotenv = dotenvy::dotenv().ok();

    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Environment variable overrides config
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());

    if let Err(e) = validate_log_level(&log_level) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .json()
        .init();

    info!("Starting medibot server with log level: {}", log_level);
    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }
    info!(
        "Environment: {}, debug: {}, primary model: {}",
        config.server.environment, config.server.debug, config.models.primary.name
    );
    if config.secrets.huggingface_token.is_none() {
        warn!("HUGGINGFACE_TOKEN is not set; chat requests will fail until it is provided");
    }

    server::run(config).await?;

    Ok(())
}
