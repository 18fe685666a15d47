mod cli;
mod commands;
mod setup;

use anyhow::Result;
use clap::Parser;
use keyguard_core::config::AppConfig;
use keyguard_core::lifecycle;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    lifecycle::init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(cli.config.as_deref());
    if cli.serial.is_some() {
        config.adb.serial = cli.serial;
    }

    match cli.command {
        Commands::Unlock {
            unlock_type,
            key,
            strategy,
        } => commands::unlock(&config, unlock_type, key, strategy).await,
        Commands::Validate { unlock_type, key } => commands::validate(unlock_type, key),
        Commands::Pattern { key, x, y, cell } => commands::pattern(key, x, y, cell),
        Commands::Status => commands::status(&config).await,
    }
}
