use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("tillpoint=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Bootstrap(args) => commands::bootstrap::run(&cli.global, args).await,
        Commands::Status => commands::status::run(&cli.global).await,
        Commands::Stores => commands::stores::run(&cli.global).await,
        Commands::SwitchStore(args) => commands::switch_store::run(&cli.global, args).await,
        Commands::Logout => commands::logout::run(&cli.global).await,
    }
}
