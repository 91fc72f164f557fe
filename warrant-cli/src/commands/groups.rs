//! Abstract group commands

use super::{parse_condition, print_json};
use clap::{Args, Subcommand};
use color_eyre::eyre::{eyre, Result};
use serde_json::json;
use warrant_client::WarrantClient;
use warrant_core::{AbstractGroupDraft, AbstractGroupRule, LogicalOperator};

#[derive(Args, Debug)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommands,
}

#[derive(Subcommand, Debug)]
pub enum GroupsCommands {
    /// Create a group from attribute conditions or an explicit UPN list
    Create(CreateArgs),
    /// Show a stored group
    Get { id: String },
    /// Delete a group; membership cleanup happens on the service
    Delete { id: String },
    /// Ask the service to re-evaluate a group's rule
    Sync { id: String },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Attribute condition as field:op[:value]
    #[arg(long = "where", value_name = "FIELD:OP[:VALUE]", conflicts_with = "upns")]
    pub conditions: Vec<String>,

    /// Combine attribute conditions with OR instead of AND
    #[arg(long, requires = "conditions")]
    pub any: bool,

    /// Member UPN for a manual group
    #[arg(long = "upn")]
    pub upns: Vec<String>,

    /// Sync right after creating
    #[arg(long)]
    pub sync: bool,
}

pub async fn execute(client: &WarrantClient, args: GroupsArgs) -> Result<()> {
    match args.command {
        GroupsCommands::Create(a) => execute_create(client, a).await,
        GroupsCommands::Get { id } => print_json(&client.groups().get(&id).await?),
        GroupsCommands::Delete { id } => {
            client.groups().delete_by_id(&id).await?;
            print_json(&json!({"deleted": id}))
        }
        GroupsCommands::Sync { id } => print_json(&client.groups().sync_by_id(&id).await?),
    }
}

async fn execute_create(client: &WarrantClient, args: CreateArgs) -> Result<()> {
    let rule = rule_from_args(&args)?;
    let mut draft = AbstractGroupDraft::new(args.name, rule);
    if let Some(description) = args.description {
        draft = draft.with_description(description);
    }

    let record = client.groups().create(&mut draft).await?;
    if !args.sync {
        return print_json(&record);
    }
    let synced = client.groups().sync(&mut draft).await?;
    print_json(&json!({"group": record, "sync": synced, "state": draft.state()}))
}

fn rule_from_args(args: &CreateArgs) -> Result<AbstractGroupRule> {
    if !args.upns.is_empty() {
        return Ok(AbstractGroupRule::manual(args.upns.iter().cloned()));
    }
    if args.conditions.is_empty() {
        return Err(eyre!("either --where or --upn is required"));
    }
    let conditions = args
        .conditions
        .iter()
        .map(|raw| parse_condition(raw))
        .collect::<Result<Vec<_>>>()?;
    let operator = if args.any {
        LogicalOperator::Or
    } else {
        LogicalOperator::And
    };
    Ok(AbstractGroupRule::attributes(operator, conditions))
}
