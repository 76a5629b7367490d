use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paroquia::cli::{run_command, Cli};
use paroquia::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(path) = &cli.session_file {
        config.session.path = path.clone();
    }

    // Initialize logging; stdout is reserved for command output
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        base_url = %config.api.base_url,
        session = %config.session.path.display(),
        "paroquia v{}",
        env!("CARGO_PKG_VERSION")
    );

    run_command(&cli, &config).await
}
