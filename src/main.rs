use anyhow::Result;
use ecotrack::cli::parse_args;
use ecotrack::config::AppConfig;
use ecotrack::server;
use ecotrack::supervisor::Supervisor;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_DIRECTIVES: &str = "info,ecotrack=debug,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file for API keys and store settings

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES)),
        )
        .init();

    let cli_args = parse_args();
    let config = AppConfig::from_env(&cli_args);
    info!("EcoTrack backend v{} starting", env!("CARGO_PKG_VERSION"));

    let supervisor = Supervisor::from_config(&config)?;
    server::run(&config, supervisor).await
}
