use std::path::PathBuf;

use clap::Parser;
use galtick::{bot, config::AppConfig};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file. Defaults to `galtick.toml` in the
    /// working directory; environment variables prefixed with `GALTICK_`
    /// override file values either way.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    // A missing or blank token fails here, before any connection is attempted.
    let config = AppConfig::new(cli.config.as_deref())?;
    tracing::info!(
        tick_url = %config.tick_url,
        check_interval_secs = config.check_interval.as_secs(),
        tick_channel = ?config.notification_destination(),
        "Configuration loaded"
    );

    bot::run(config).await?;

    Ok(())
}
