//! Proptest generators for Warrant request types.

use proptest::prelude::*;
use warrant_core::{
    Effect, FilterCondition, FilterGroup, FilterOperator, Logic, PolicyTuple, Scalar,
    SortCondition,
};

pub fn arb_field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,15}"
}

pub fn arb_keyword() -> impl Strategy<Value = String> {
    "[A-Za-z0-9@.]{1,12}"
}

pub fn arb_identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

pub fn arb_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        any::<bool>().prop_map(Scalar::Bool),
        any::<i64>().prop_map(Scalar::Int),
        (-1.0e6f64..1.0e6f64).prop_map(Scalar::Float),
        "[a-zA-Z0-9 %_-]{0,16}".prop_map(Scalar::Text),
    ]
}

pub fn arb_operator() -> impl Strategy<Value = FilterOperator> {
    proptest::sample::select(FilterOperator::ALL.to_vec())
}

/// A condition that passes local validation.
pub fn arb_condition() -> impl Strategy<Value = FilterCondition> {
    (arb_field_name(), arb_operator(), arb_scalar(), prop::collection::vec(arb_scalar(), 0..4)).prop_map(
        |(field, op, scalar, list)| {
            if op.expects_list() {
                FilterCondition::new(field, op, list)
            } else {
                FilterCondition::new(field, op, scalar)
            }
        },
    )
}

pub fn arb_logic() -> impl Strategy<Value = Logic> {
    prop_oneof![Just(Logic::And), Just(Logic::Or)]
}

/// A filter tree no deeper than `depth + 1`.
pub fn arb_filter_group(depth: u32) -> impl Strategy<Value = FilterGroup> {
    let leaf = (arb_logic(), prop::collection::vec(arb_condition(), 0..4)).prop_map(
        |(logic, conditions)| FilterGroup {
            logic,
            conditions,
            groups: Vec::new(),
        },
    );
    leaf.prop_recursive(depth, 32, 3, |inner| {
        (
            arb_logic(),
            prop::collection::vec(arb_condition(), 0..3),
            prop::collection::vec(inner, 0..3),
        )
            .prop_map(|(logic, conditions, groups)| FilterGroup {
                logic,
                conditions,
                groups,
            })
    })
}

pub fn arb_sort() -> impl Strategy<Value = Vec<SortCondition>> {
    prop::collection::vec(
        (arb_field_name(), any::<bool>()).prop_map(|(field, desc)| {
            if desc {
                SortCondition::desc(field)
            } else {
                SortCondition::asc(field)
            }
        }),
        0..3,
    )
}

pub fn arb_effect() -> impl Strategy<Value = Effect> {
    prop_oneof![Just(Effect::Allow), Just(Effect::Deny)]
}

/// A well-formed `p` tuple.
pub fn arb_policy_tuple() -> impl Strategy<Value = PolicyTuple> {
    (arb_identifier(), arb_identifier(), arb_identifier(), arb_effect())
        .prop_map(|(sub, obj, act, eft)| PolicyTuple::rule(&sub, &obj, &act, eft))
}

/// Distinct `p` tuples.
pub fn arb_policy_set(max: usize) -> impl Strategy<Value = Vec<PolicyTuple>> {
    prop::collection::btree_set(arb_policy_tuple(), 0..max)
        .prop_map(|set| set.into_iter().collect())
}
