//! warrant - administer authorization policies from the command line
//!
//! Every command is a single round trip. Results are printed as JSON on
//! stdout; logs go to stderr.

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use warrant_client::{telemetry, ClientConfig, WarrantClient};

mod commands;

#[derive(Parser)]
#[command(name = "warrant")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the client TOML config
    #[arg(long, global = true, env = "WARRANT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter, add, delete, edit and explain policy tuples
    Policies(commands::policies::PoliciesArgs),

    /// List, add and delete role groupings
    Groupings(commands::groupings::GroupingsArgs),

    /// Run a filter query against a resource collection
    Search(commands::search::SearchArgs),

    /// Manage abstract groups
    Groups(commands::groups::GroupsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = ClientConfig::load(cli.config.as_deref())?;
    telemetry::init(&config.log)?;
    let client = WarrantClient::new(&config)?;

    match cli.command {
        Commands::Policies(args) => commands::policies::execute(&client, args).await,
        Commands::Groupings(args) => commands::groupings::execute(&client, args).await,
        Commands::Search(args) => commands::search::execute(&client, args).await,
        Commands::Groups(args) => commands::groups::execute(&client, args).await,
    }
}
