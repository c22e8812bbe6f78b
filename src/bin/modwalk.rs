//! Modwalk CLI - folder and module discovery from the command line.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when set
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Folders(args) => {
            let config = cli::load_configuration(cli.config.as_deref())?;
            cli::folders_command(args, config).await?;
        }
        Commands::Modules(args) => {
            let config = cli::load_configuration(cli.config.as_deref())?;
            cli::modules_command(args, config).await?;
        }
        Commands::Load(args) => {
            let config = cli::load_configuration(cli.config.as_deref())?;
            cli::load_command(args, config).await?;
        }
        Commands::PrintDefaultConfig => {
            cli::print_default_config()?;
        }
        Commands::ValidateConfig(args) => {
            cli::validate_config(args)?;
        }
    }

    Ok(())
}
