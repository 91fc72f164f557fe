//! Generic filter search over a resource collection

use super::{parse_condition, parse_sort, print_list};
use clap::Args;
use color_eyre::eyre::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use warrant_client::WarrantClient;
use warrant_core::{
    FilterBuilder, FilterRequest, I18nEntry, QueryState, QuotaPoolRule, ResourceKind, UserInfo,
};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// users, i18n or quota-rules
    pub resource: ResourceKind,

    /// Free text matched with `like` across the resource's keyword fields
    #[arg(long)]
    pub keyword: Option<String>,

    /// Condition as field:op[:value]; repeated conditions are ANDed
    #[arg(long = "where", value_name = "FIELD:OP[:VALUE]")]
    pub conditions: Vec<String>,

    /// Sort key as field[:asc|desc]; applied left to right
    #[arg(long = "sort", value_name = "FIELD[:ORDER]")]
    pub sort: Vec<String>,

    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub page: i64,

    #[arg(long, default_value_t = i64::from(warrant_core::DEFAULT_PAGE_SIZE))]
    pub page_size: i64,

    /// Return every row, subject to the service's row cap
    #[arg(long)]
    pub all: bool,

    /// Return full records instead of identifiers
    #[arg(long)]
    pub verbose: bool,
}

pub async fn execute(client: &WarrantClient, args: SearchArgs) -> Result<()> {
    let request = build_query(&args)?.to_request();
    tracing::debug!(
        resource = args.resource.name(),
        conditions = request.filter.condition_count(),
        "search"
    );

    if !args.verbose {
        let result = client
            .filters()
            .execute_identifiers(&args.resource, &request)
            .await;
        return print_list(&result);
    }
    match &args.resource {
        ResourceKind::Users => rows::<UserInfo>(client, &args.resource, &request).await,
        ResourceKind::I18n => rows::<I18nEntry>(client, &args.resource, &request).await,
        ResourceKind::QuotaPoolRules => {
            rows::<QuotaPoolRule>(client, &args.resource, &request).await
        }
        ResourceKind::Custom { .. } => {
            rows::<serde_json::Value>(client, &args.resource, &request).await
        }
    }
}

async fn rows<T: DeserializeOwned + Serialize>(
    client: &WarrantClient,
    resource: &ResourceKind,
    request: &FilterRequest,
) -> Result<()> {
    let result = client.filters().execute::<T>(resource, request).await;
    print_list(&result)
}

/// Query state for the given flags. Each flag is an independent input.
fn build_query(args: &SearchArgs) -> Result<QueryState> {
    let mut builder = FilterBuilder::new();
    if let Some(keyword) = &args.keyword {
        builder = builder.keyword(keyword, &args.resource.keyword_fields());
    }
    for raw in &args.conditions {
        builder = builder.condition(parse_condition(raw)?);
    }
    let sort = args
        .sort
        .iter()
        .map(|raw| parse_sort(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut state = QueryState::new()
        .verbose(args.verbose)
        .with_page_size(args.page_size);
    state.set_filter(builder.build());
    state.set_sort(sort);
    state.set_page(args.page);
    state.set_all(args.all);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use warrant_core::{FilterOperator, Logic};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SearchArgs,
    }

    fn parse(argv: &[&str]) -> SearchArgs {
        TestCli::try_parse_from(std::iter::once("search").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn keyword_and_where_combine() {
        let args = parse(&["users", "--keyword", "ops", "--where", "active:eq:true"]);
        let request = build_query(&args).unwrap().to_request();
        assert_eq!(request.filter.logic, Logic::And);
        assert_eq!(request.filter.conditions.len(), 1);
        assert_eq!(request.filter.conditions[0].field, "active");
        let keyword = &request.filter.groups[0];
        assert_eq!(keyword.logic, Logic::Or);
        assert_eq!(keyword.conditions.len(), ResourceKind::Users.keyword_fields().len());
        assert!(keyword.conditions.iter().all(|c| c.op == FilterOperator::Like));
    }

    #[test]
    fn paging_flags_are_clamped() {
        let args = parse(&["i18n", "--page", "-3", "--page-size", "0", "--verbose"]);
        let request = build_query(&args).unwrap().to_request();
        assert_eq!(request.pagination.page, 1);
        assert_eq!(request.pagination.page_size, warrant_core::DEFAULT_PAGE_SIZE);
        assert!(request.verbose);
    }

    #[test]
    fn all_flag_and_sort() {
        let args = parse(&["quota-rules", "--all", "--sort", "name:desc", "--sort", "pool"]);
        let request = build_query(&args).unwrap().to_request();
        assert!(request.pagination.all);
        assert_eq!(request.sort.len(), 2);
        assert!(request.filter.is_empty());
    }

    #[test]
    fn unknown_resource_is_rejected() {
        assert!(TestCli::try_parse_from(["search", "invoices"]).is_err());
    }
}
