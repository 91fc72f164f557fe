//! Recursive filter expressions shared by every searchable resource.
//!
//! A [`FilterGroup`] is an AND/OR node holding leaf [`FilterCondition`]s and
//! nested groups. The tree is only built and serialized here; evaluation
//! happens on the remote service.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

/// Maximum nesting depth accepted for a filter tree.
pub const MAX_FILTER_DEPTH: usize = 8;

/// Filter operator for field comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to
    Eq,
    /// Not equal to
    Neq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// SQL-style pattern match, case sensitive
    Like,
    /// SQL-style pattern match, case insensitive
    Ilike,
    /// In list of values
    In,
    /// Not in list of values
    NotIn,
    /// Contains substring or element
    Contains,
    /// Does not contain substring or element
    NotContains,
    /// Starts with prefix
    StartsWith,
    /// Ends with suffix
    EndsWith,
    /// Field is null
    IsNull,
    /// Field is not null
    IsNotNull,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 16] = [
        FilterOperator::Eq,
        FilterOperator::Neq,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::Like,
        FilterOperator::Ilike,
        FilterOperator::In,
        FilterOperator::NotIn,
        FilterOperator::Contains,
        FilterOperator::NotContains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
    ];

    /// Whether the operator carries a value at all.
    pub fn requires_value(self) -> bool {
        !matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }

    /// Whether the operator compares against a list of values.
    pub fn expects_list(self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::NotIn)
    }

    /// Wire name of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::Ilike => "ilike",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "notin",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "notcontains",
            FilterOperator::StartsWith => "startswith",
            FilterOperator::EndsWith => "endswith",
            FilterOperator::IsNull => "isnull",
            FilterOperator::IsNotNull => "isnotnull",
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterOperator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == lowered)
            .ok_or_else(|| ValidationError::invalid("op", format!("unknown operator '{}'", s)))
    }
}

/// A single comparable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Value side of a condition: one scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl FilterValue {
    pub fn is_list(&self) -> bool {
        matches!(self, FilterValue::Many(_))
    }
}

macro_rules! impl_filter_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FilterValue {
                fn from(value: $ty) -> Self {
                    FilterValue::One(value.into())
                }
            }
        )*
    };
}

impl_filter_value_from!(Scalar, &str, String, i64, i32, f64, bool);

impl From<Vec<Scalar>> for FilterValue {
    fn from(values: Vec<Scalar>) -> Self {
        FilterValue::Many(values)
    }
}

/// Leaf condition: `field op value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub op: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

impl FilterCondition {
    /// Create a condition. The value is discarded for `isnull`/`isnotnull`.
    pub fn new(field: impl Into<String>, op: FilterOperator, value: impl Into<FilterValue>) -> Self {
        let value = op.requires_value().then(|| value.into());
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Create an equality condition.
    pub fn eq(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(field, FilterOperator::Eq, value.into())
    }

    /// Create a `like` condition. `%` in `pattern` is the wildcard.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Like, pattern.into())
    }

    /// `like %keyword%` on one field.
    pub fn like_keyword(field: impl Into<String>, keyword: &str) -> Self {
        Self::like(field, format!("%{}%", keyword))
    }

    /// Create an `in` condition over `values`.
    pub fn one_of<V: Into<Scalar>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Scalar> = values.into_iter().map(Into::into).collect();
        Self::new(field, FilterOperator::In, values)
    }

    /// Create a condition matching a missing value.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: FilterOperator::IsNull,
            value: None,
        }
    }

    /// Create a condition matching any present value.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: FilterOperator::IsNotNull,
            value: None,
        }
    }

    /// Check the condition's shape. Field names are not checked here.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.field.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "field".to_string(),
            });
        }
        if !self.op.requires_value() {
            return Ok(());
        }
        match &self.value {
            None => Err(ValidationError::invalid(
                &self.field,
                format!("operator '{}' requires a value", self.op),
            )),
            Some(value) if self.op.expects_list() && !value.is_list() => Err(
                ValidationError::invalid(&self.field, format!("operator '{}' requires a list value", self.op)),
            ),
            Some(value) if !self.op.expects_list() && value.is_list() => Err(
                ValidationError::invalid(&self.field, format!("operator '{}' requires a scalar value", self.op)),
            ),
            Some(_) => Ok(()),
        }
    }
}

/// How a group combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[default]
    And,
    Or,
}

/// Recursive AND/OR node.
///
/// A group with no conditions anywhere in its subtree means "no filter".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub groups: Vec<FilterGroup>,
}

impl FilterGroup {
    /// Create an empty group combining its children with `logic`.
    pub fn new(logic: Logic) -> Self {
        Self {
            logic,
            conditions: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Create an empty AND group.
    pub fn and() -> Self {
        Self::new(Logic::And)
    }

    /// Create an empty OR group.
    pub fn or() -> Self {
        Self::new(Logic::Or)
    }

    /// The empty filter, matching every row.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Add a leaf condition.
    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a nested group.
    pub fn with_group(mut self, group: FilterGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// True when no condition exists anywhere in the tree.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.groups.iter().all(FilterGroup::is_empty)
    }

    /// Total number of leaf conditions in the tree.
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
            + self
                .groups
                .iter()
                .map(FilterGroup::condition_count)
                .sum::<usize>()
    }

    /// Number of nesting levels, counting this group as one.
    pub fn depth(&self) -> usize {
        1 + self.groups.iter().map(FilterGroup::depth).max().unwrap_or(0)
    }

    /// True when the tree nests more than `limit` levels.
    ///
    /// Recursion stops after `limit + 1` levels, so this is safe on trees of
    /// any depth.
    pub fn exceeds_depth(&self, limit: usize) -> bool {
        match limit {
            0 => true,
            _ => self.groups.iter().any(|group| group.exceeds_depth(limit - 1)),
        }
    }

    /// Refuse trees deeper than [`MAX_FILTER_DEPTH`].
    pub fn check_depth(&self) -> ValidationResult<()> {
        if self.exceeds_depth(MAX_FILTER_DEPTH) {
            return Err(ValidationError::FilterTooDeep {
                max: MAX_FILTER_DEPTH,
            });
        }
        Ok(())
    }

    /// Drop nested groups that contain no conditions.
    pub fn prune(mut self) -> Self {
        self.groups = self
            .groups
            .into_iter()
            .map(FilterGroup::prune)
            .filter(|group| !group.is_empty())
            .collect();
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        self.check_depth()?;
        self.validate_nodes()
    }

    fn validate_nodes(&self) -> ValidationResult<()> {
        for condition in &self.conditions {
            condition.validate()?;
        }
        for group in &self.groups {
            group.validate_nodes()?;
        }
        Ok(())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// One sort key. Lists of these are applied left to right.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCondition {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortCondition {
    /// Create an ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    /// Create a descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Assembles a top-level filter from independent UI inputs.
///
/// Independent contributions are ANDed at the top level. A keyword box that
/// searches several fields becomes one nested OR group of `like` conditions.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    conditions: Vec<FilterCondition>,
    groups: Vec<FilterGroup>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one independent condition.
    pub fn condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Match `keyword` against any of `fields`.
    ///
    /// A blank keyword or an empty field list contributes nothing.
    pub fn keyword<S: AsRef<str>>(mut self, keyword: &str, fields: &[S]) -> Self {
        let keyword = keyword.trim();
        if keyword.is_empty() || fields.is_empty() {
            return self;
        }
        let group = fields.iter().fold(FilterGroup::or(), |group, field| {
            group.with_condition(FilterCondition::like_keyword(field.as_ref(), keyword))
        });
        self.groups.push(group);
        self
    }

    /// Inclusive range on one field; either bound may be absent.
    pub fn range(mut self, field: &str, from: Option<Scalar>, to: Option<Scalar>) -> Self {
        let mut group = FilterGroup::and();
        if let Some(from) = from {
            group.conditions.push(FilterCondition::new(field, FilterOperator::Gte, from));
        }
        if let Some(to) = to {
            group.conditions.push(FilterCondition::new(field, FilterOperator::Lte, to));
        }
        if !group.conditions.is_empty() {
            self.groups.push(group);
        }
        self
    }

    /// Field value in `values`. An empty list contributes nothing.
    pub fn one_of<V: Into<Scalar>>(mut self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        let condition = FilterCondition::one_of(field, values);
        if matches!(&condition.value, Some(FilterValue::Many(values)) if !values.is_empty()) {
            self.conditions.push(condition);
        }
        self
    }

    /// Add an already-built subtree.
    pub fn group(mut self, group: FilterGroup) -> Self {
        if !group.is_empty() {
            self.groups.push(group);
        }
        self
    }

    pub fn build(self) -> FilterGroup {
        FilterGroup {
            logic: Logic::And,
            conditions: self.conditions,
            groups: self.groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_operators_drop_value() {
        let condition = FilterCondition::new("email", FilterOperator::IsNull, "ignored");
        assert_eq!(condition.value, None);
        assert_eq!(
            serde_json::to_value(&condition).unwrap(),
            json!({"field": "email", "op": "isnull"})
        );
        assert!(condition.validate().is_ok());
    }

    #[test]
    fn operator_wire_names() {
        assert_eq!(serde_json::to_value(FilterOperator::NotIn).unwrap(), json!("notin"));
        assert_eq!(
            serde_json::to_value(FilterOperator::NotContains).unwrap(),
            json!("notcontains")
        );
        for op in FilterOperator::ALL {
            let parsed: FilterOperator = op.as_str().parse().unwrap();
            assert_eq!(parsed, op);
            assert_eq!(serde_json::to_value(op).unwrap(), json!(op.as_str()));
        }
        assert!("between".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn list_operators_require_lists() {
        let bad = FilterCondition::new("dept", FilterOperator::In, "eng");
        assert!(bad.validate().is_err());
        let good = FilterCondition::one_of("dept", ["eng", "ops"]);
        assert!(good.validate().is_ok());
        let scalar_op_with_list = FilterCondition::new("dept", FilterOperator::Eq, vec![Scalar::from("eng")]);
        assert!(scalar_op_with_list.validate().is_err());
    }

    #[test]
    fn missing_value_rejected() {
        let condition: FilterCondition =
            serde_json::from_value(json!({"field": "upn", "op": "eq"})).unwrap();
        assert!(condition.validate().is_err());
    }

    #[test]
    fn blank_field_rejected() {
        let condition = FilterCondition::eq("  ", "x");
        assert_eq!(
            condition.validate(),
            Err(ValidationError::RequiredFieldMissing {
                field: "field".to_string()
            })
        );
    }

    #[test]
    fn logic_defaults_to_and() {
        let group: FilterGroup = serde_json::from_value(json!({"conditions": []})).unwrap();
        assert_eq!(group.logic, Logic::And);
        assert!(group.is_empty());
    }

    #[test]
    fn nested_empty_groups_are_empty() {
        let group = FilterGroup::or().with_group(FilterGroup::and().with_group(FilterGroup::or()));
        assert!(group.is_empty());
        let pruned = group.prune();
        assert!(pruned.groups.is_empty());
    }

    #[test]
    fn keyword_expands_to_or_group_anded_with_other_inputs() {
        let filter = FilterBuilder::new()
            .condition(FilterCondition::eq("status", "active"))
            .keyword("ali", &["upn", "display_name"])
            .build();

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "logic": "and",
                "conditions": [{"field": "status", "op": "eq", "value": "active"}],
                "groups": [{
                    "logic": "or",
                    "conditions": [
                        {"field": "upn", "op": "like", "value": "%ali%"},
                        {"field": "display_name", "op": "like", "value": "%ali%"}
                    ],
                    "groups": []
                }]
            })
        );
    }

    #[test]
    fn blank_keyword_contributes_nothing() {
        let filter = FilterBuilder::new().keyword("   ", &["upn"]).build();
        assert!(filter.is_empty());
        let no_fields: [&str; 0] = [];
        let filter = FilterBuilder::new().keyword("x", &no_fields).build();
        assert!(filter.is_empty());
    }

    #[test]
    fn range_contributes_gte_lte_pair() {
        let filter = FilterBuilder::new()
            .range("created_at", Some("2024-01-01".into()), Some("2024-02-01".into()))
            .build();
        let group = &filter.groups[0];
        assert_eq!(group.logic, Logic::And);
        assert_eq!(group.conditions[0].op, FilterOperator::Gte);
        assert_eq!(group.conditions[1].op, FilterOperator::Lte);

        let open = FilterBuilder::new().range("created_at", None, None).build();
        assert!(open.is_empty());
    }

    #[test]
    fn empty_one_of_contributes_nothing() {
        let filter = FilterBuilder::new()
            .one_of("dept", Vec::<String>::new())
            .build();
        assert!(filter.is_empty());
    }

    #[test]
    fn depth_limit_enforced() {
        let mut group = FilterGroup::and().with_condition(FilterCondition::eq("a", 1));
        for _ in 0..MAX_FILTER_DEPTH {
            group = FilterGroup::or().with_group(group);
        }
        assert_eq!(
            group.validate(),
            Err(ValidationError::FilterTooDeep {
                max: MAX_FILTER_DEPTH
            })
        );
    }

    #[test]
    fn exceeds_depth_agrees_with_depth() {
        let mut group = FilterGroup::and().with_condition(FilterCondition::eq("a", 1));
        for levels in 1..=MAX_FILTER_DEPTH + 2 {
            assert_eq!(group.depth(), levels);
            assert!(!group.exceeds_depth(levels));
            assert!(group.exceeds_depth(levels - 1));
            group = FilterGroup::and().with_group(group);
        }
    }

    #[test]
    fn scalars_round_trip_untagged() {
        let value: FilterValue = serde_json::from_value(json!([1, "x", true, 2.5])).unwrap();
        assert_eq!(
            value,
            FilterValue::Many(vec![
                Scalar::Int(1),
                Scalar::Text("x".to_string()),
                Scalar::Bool(true),
                Scalar::Float(2.5)
            ])
        );
    }
}
