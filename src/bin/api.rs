use cfo_copilot::{agent::Copilot, api::start_server, config::CopilotConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = CopilotConfig::from_env()?;

    info!("🚀 CFO Copilot - API Server");
    info!("📍 Port: {}", config.api_port);
    info!("📂 Fixtures: {}", config.fixtures_dir.display());

    let copilot = Arc::new(Copilot::from_config(&config));

    info!(policy = ?copilot.fallback_policy(), "✅ Copilot initialized");
    info!("📡 Starting API server...");

    start_server(copilot, config.api_port).await?;

    Ok(())
}
