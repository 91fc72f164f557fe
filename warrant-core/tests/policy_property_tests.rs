use proptest::prelude::*;
use warrant_core::{ExplainResponse, PolicyFilter, PolicyKind, PolicyTuple};
use warrant_test_utils::{arb_policy_set, arb_policy_tuple, InMemoryPolicyStore};

proptest! {
    #[test]
    fn fingerprint_tracks_value_identity(a in arb_policy_tuple(), b in arb_policy_tuple()) {
        prop_assert_eq!(a == b, a.fingerprint() == b.fingerprint());
    }

    #[test]
    fn generated_tuples_are_well_formed(tuple in arb_policy_tuple()) {
        prop_assert!(tuple.validate(PolicyKind::P).is_ok());
        prop_assert_eq!(tuple.len(), 4);
    }

    #[test]
    fn empty_filter_matches_every_tuple(tuple in arb_policy_tuple()) {
        prop_assert!(PolicyFilter::any().matches(&tuple));
    }

    #[test]
    fn subject_filter_is_exact(tuple in arb_policy_tuple(), other in "[A-Z]{1,4}") {
        let subject = tuple.subject().unwrap().to_string();
        prop_assert!(PolicyFilter::any().subjects([subject]).matches(&tuple));
        prop_assert!(!PolicyFilter::any().subjects([other]).matches(&tuple));
    }

    // ========================================================================
    // Explain invariant: reason present exactly when allowed
    // ========================================================================

    #[test]
    fn explain_reason_iff_allowed(
        policies in arb_policy_set(12),
        request in arb_policy_tuple(),
    ) {
        let store = InMemoryPolicyStore::with_policies(policies);
        let decision = store
            .explain(request.subject().unwrap(), request.object().unwrap(), request.action().unwrap())
            .normalize()
            .unwrap();
        if decision.allow {
            let reason = decision.reason.clone().unwrap();
            prop_assert_eq!(reason.len(), 4);
        } else {
            prop_assert_eq!(decision, ExplainResponse::denied());
        }
    }

    #[test]
    fn serialized_tuple_is_plain_string_array(tuple in arb_policy_tuple()) {
        let value = serde_json::to_value(&tuple).unwrap();
        let array = value.as_array().unwrap();
        prop_assert_eq!(array.len(), tuple.len());
        prop_assert!(array.iter().all(|v| v.is_string()));
        let back: PolicyTuple = serde_json::from_value(value).unwrap();
        prop_assert_eq!(back, tuple);
    }
}
