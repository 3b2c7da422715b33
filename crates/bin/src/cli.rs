//! CLI argument definitions for the Tillpoint binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

use crate::output::OutputFormat;

/// Tillpoint point-of-sale session tool
#[derive(Parser, Debug)]
#[command(name = "tillpoint")]
#[command(about = "Tillpoint: bootstrap and inspect point-of-sale sessions")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug)]
pub struct GlobalArgs {
    /// Directory holding the database files
    #[arg(short = 'D', long, global = true, env = "TILLPOINT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON config file (platform, logout URL, database names)
    #[arg(short, long, global = true, env = "TILLPOINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bootstrap pipeline and print the resulting session
    Bootstrap(BootstrapArgs),
    /// Print the current session
    Status,
    /// List the stores linked to the current credentials
    Stores,
    /// Make another linked store current
    SwitchStore(SwitchStoreArgs),
    /// Clear the current session
    Logout,
}

/// Arguments for the bootstrap command
#[derive(clap::Args, Debug)]
pub struct BootstrapArgs {
    /// Server-injected props (JSON with site, wp_credentials and stores).
    /// Runs the web bootstrap when given.
    #[arg(long)]
    pub props: Option<PathBuf>,

    /// Page URL the app was opened at, e.g. https://pos.example/?store=12
    #[arg(long)]
    pub url: Option<Url>,
}

/// Arguments for the switch-store command
#[derive(clap::Args, Debug)]
pub struct SwitchStoreArgs {
    /// Local ID of the store to switch to
    pub local_id: String,
}
