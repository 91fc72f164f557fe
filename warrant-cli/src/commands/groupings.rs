//! Role grouping commands

use super::policies::parse_tuples;
use super::print_json;
use clap::{Args, Subcommand};
use color_eyre::eyre::Result;
use serde_json::json;
use warrant_client::WarrantClient;
use warrant_core::GroupingFilter;

#[derive(Args, Debug)]
pub struct GroupingsArgs {
    #[command(subcommand)]
    pub command: GroupingsCommands,
}

#[derive(Subcommand, Debug)]
pub enum GroupingsCommands {
    /// List `user, role` lines
    List {
        #[arg(long = "user")]
        users: Vec<String>,
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    /// Add groupings atomically
    Add {
        #[arg(required = true)]
        tuples: Vec<String>,
        #[arg(long)]
        skip: bool,
    },
    /// Delete groupings atomically
    Delete {
        #[arg(required = true)]
        tuples: Vec<String>,
    },
}

pub async fn execute(client: &WarrantClient, args: GroupingsArgs) -> Result<()> {
    match args.command {
        GroupingsCommands::List { users, roles } => {
            let response = client
                .policies()
                .filter_groupings(&GroupingFilter { users, roles })
                .await?;
            print_json(&response)
        }
        GroupingsCommands::Add { tuples, skip } => {
            let tuples = parse_tuples(&tuples)?;
            let count = tuples.len();
            client.policies().add_groupings(tuples, skip).await?;
            print_json(&json!({"added": count, "skip": skip}))
        }
        GroupingsCommands::Delete { tuples } => {
            let tuples = parse_tuples(&tuples)?;
            let count = tuples.len();
            client.policies().delete_groupings(tuples).await?;
            print_json(&json!({"deleted": count}))
        }
    }
}
