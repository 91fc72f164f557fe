//! Policy tuple commands

use super::{parse_tuple, print_json, print_list};
use clap::{Args, Subcommand};
use color_eyre::eyre::Result;
use serde_json::json;
use warrant_client::WarrantClient;
use warrant_core::{PolicyFilter, PolicyTuple};

#[derive(Args, Debug)]
pub struct PoliciesArgs {
    #[command(subcommand)]
    pub command: PoliciesCommands,
}

#[derive(Subcommand, Debug)]
pub enum PoliciesCommands {
    /// List tuples; repeated flags widen a position, absent flags match any
    List(ListArgs),
    /// Add tuples atomically
    Add(AddArgs),
    /// Delete tuples atomically
    Delete(DeleteArgs),
    /// Replace one tuple by value
    Edit(EditArgs),
    /// Show which rule decides a request
    Explain(ExplainArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long = "sub")]
    pub subs: Vec<String>,
    #[arg(long = "obj")]
    pub objs: Vec<String>,
    #[arg(long = "act")]
    pub acts: Vec<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Tuples as JSON arrays or comma-separated elements
    #[arg(required = true)]
    pub tuples: Vec<String>,
    /// Ignore tuples that already exist instead of rejecting the batch
    #[arg(long)]
    pub skip: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[arg(required = true)]
    pub tuples: Vec<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub old: String,
    pub new: String,
}

#[derive(Args, Debug)]
pub struct ExplainArgs {
    pub sub: String,
    pub obj: String,
    pub act: String,
}

pub async fn execute(client: &WarrantClient, args: PoliciesArgs) -> Result<()> {
    match args.command {
        PoliciesCommands::List(a) => execute_list(client, a).await,
        PoliciesCommands::Add(a) => execute_add(client, a).await,
        PoliciesCommands::Delete(a) => execute_delete(client, a).await,
        PoliciesCommands::Edit(a) => execute_edit(client, a).await,
        PoliciesCommands::Explain(a) => execute_explain(client, a).await,
    }
}

async fn execute_list(client: &WarrantClient, args: ListArgs) -> Result<()> {
    let filter = PolicyFilter::any()
        .subjects(args.subs)
        .objects(args.objs)
        .actions(args.acts);
    let result = client.policies().list(&filter).await;
    print_list(&result)
}

async fn execute_add(client: &WarrantClient, args: AddArgs) -> Result<()> {
    let tuples = parse_tuples(&args.tuples)?;
    let count = tuples.len();
    client.policies().add(tuples, args.skip).await?;
    print_json(&json!({"added": count, "skip": args.skip}))
}

async fn execute_delete(client: &WarrantClient, args: DeleteArgs) -> Result<()> {
    let tuples = parse_tuples(&args.tuples)?;
    let count = tuples.len();
    client.policies().delete(tuples).await?;
    print_json(&json!({"deleted": count}))
}

async fn execute_edit(client: &WarrantClient, args: EditArgs) -> Result<()> {
    let old = parse_tuple(&args.old)?;
    let new = parse_tuple(&args.new)?;
    client.policies().edit(old.clone(), new.clone()).await?;
    print_json(&json!({"oldPolicy": old, "newPolicy": new}))
}

async fn execute_explain(client: &WarrantClient, args: ExplainArgs) -> Result<()> {
    let decision = client
        .policies()
        .explain(&args.sub, &args.obj, &args.act)
        .await?;
    print_json(&decision)
}

pub(crate) fn parse_tuples(raw: &[String]) -> Result<Vec<PolicyTuple>> {
    raw.iter().map(|tuple| parse_tuple(tuple)).collect()
}
