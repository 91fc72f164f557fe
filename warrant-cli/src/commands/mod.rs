//! Subcommands and the argument parsers they share.

pub mod groupings;
pub mod groups;
pub mod policies;
pub mod search;

use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::Serialize;
use warrant_core::{
    FilterCondition, FilterOperator, FilterValue, ListResult, PolicyTuple, Scalar, SortCondition,
    SortOrder,
};

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a list result, then fail the command if it is a failure.
pub fn print_list<T: Serialize>(result: &ListResult<T>) -> Result<()> {
    print_json(result)?;
    if result.success {
        Ok(())
    } else {
        Err(eyre!(result
            .message
            .clone()
            .unwrap_or_else(|| "request failed".to_string())))
    }
}

/// A tuple given as a JSON array or as comma-separated elements.
pub fn parse_tuple(raw: &str) -> Result<PolicyTuple> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        let elements: Vec<String> =
            serde_json::from_str(raw).wrap_err_with(|| format!("invalid tuple JSON: {raw}"))?;
        return Ok(PolicyTuple::from(elements));
    }
    Ok(PolicyTuple::new(raw.split(',').map(str::trim)))
}

/// `field:op[:value]`. Lists for `in`/`notin` are separated by `|`.
pub fn parse_condition(raw: &str) -> Result<FilterCondition> {
    let mut parts = raw.splitn(3, ':');
    let field = parts.next().unwrap_or_default().trim();
    let op: FilterOperator = parts
        .next()
        .ok_or_else(|| eyre!("expected field:op[:value], got '{raw}'"))?
        .parse()?;
    let value = parts.next();

    let condition = match (op.requires_value(), value) {
        (false, _) => FilterCondition {
            field: field.to_string(),
            op,
            value: None,
        },
        (true, None) => return Err(eyre!("operator '{op}' needs a value in '{raw}'")),
        (true, Some(value)) if op.expects_list() => FilterCondition {
            field: field.to_string(),
            op,
            value: Some(FilterValue::Many(value.split('|').map(parse_scalar).collect())),
        },
        (true, Some(value)) => FilterCondition {
            field: field.to_string(),
            op,
            value: Some(FilterValue::One(parse_scalar(value))),
        },
    };
    condition.validate()?;
    Ok(condition)
}

fn parse_scalar(raw: &str) -> Scalar {
    if let Ok(value) = raw.parse::<bool>() {
        return Scalar::Bool(value);
    }
    if let Ok(value) = raw.parse::<i64>() {
        return Scalar::Int(value);
    }
    if let Ok(value) = raw.parse::<f64>() {
        if value.is_finite() {
            return Scalar::Float(value);
        }
    }
    Scalar::Text(raw.to_string())
}

/// `field[:asc|desc]`, ascending when the order is omitted.
pub fn parse_sort(raw: &str) -> Result<SortCondition> {
    let (field, order) = match raw.rsplit_once(':') {
        Some((field, "asc")) => (field, SortOrder::Asc),
        Some((field, "desc")) => (field, SortOrder::Desc),
        Some((_, other)) => return Err(eyre!("unknown sort order '{other}'")),
        None => (raw, SortOrder::Asc),
    };
    if field.trim().is_empty() {
        return Err(eyre!("sort field must not be empty"));
    }
    Ok(SortCondition {
        field: field.to_string(),
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tuples_from_json_or_csv() {
        let expected = PolicyTuple::from(["alice", "doc1", "read", "allow"]);
        assert_eq!(parse_tuple(r#"["alice","doc1","read","allow"]"#).unwrap(), expected);
        assert_eq!(parse_tuple("alice, doc1,read ,allow").unwrap(), expected);
        assert!(parse_tuple("[1,2]").is_err());
    }

    #[test]
    fn conditions_parse_typed_values() {
        let condition = parse_condition("age:gte:30").unwrap();
        assert_eq!(serde_json::to_value(&condition).unwrap(), json!({"field": "age", "op": "gte", "value": 30}));

        let condition = parse_condition("dept:in:eng|ops").unwrap();
        assert_eq!(condition.value, Some(FilterValue::Many(vec!["eng".into(), "ops".into()])));

        let condition = parse_condition("email:isnull").unwrap();
        assert_eq!(condition.value, None);

        let condition = parse_condition("url:eq:https://x.com").unwrap();
        assert_eq!(condition.value, Some(FilterValue::One("https://x.com".into())));
    }

    #[test]
    fn bad_conditions_rejected() {
        assert!(parse_condition("age").is_err());
        assert!(parse_condition("age:around:3").is_err());
        assert!(parse_condition("age:gte").is_err());
        assert!(parse_condition(":eq:3").is_err());
    }

    #[test]
    fn sort_orders() {
        assert_eq!(parse_sort("upn").unwrap(), SortCondition::asc("upn"));
        assert_eq!(parse_sort("created_at:desc").unwrap(), SortCondition::desc("created_at"));
        assert!(parse_sort("upn:sideways").is_err());
    }
}
