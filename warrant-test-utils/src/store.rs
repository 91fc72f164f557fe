//! In-memory policy store with the remote service's batch semantics.

use std::collections::HashSet;
use warrant_core::{
    Effect, ExplainResponse, GroupingFilter, PolicyFilter, PolicyFilterResponse, PolicyTuple,
};

/// Why the store refused an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRejection {
    AlreadyExists(PolicyTuple),
    NotFound(PolicyTuple),
}

impl StoreRejection {
    pub fn code(&self) -> i64 {
        match self {
            StoreRejection::AlreadyExists(_) => 40901,
            StoreRejection::NotFound(_) => 40401,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            StoreRejection::AlreadyExists(_) => 409,
            StoreRejection::NotFound(_) => 404,
        }
    }

    pub fn message(&self) -> String {
        match self {
            StoreRejection::AlreadyExists(tuple) => format!("policy {} already exists", tuple),
            StoreRejection::NotFound(tuple) => format!("policy {} not found", tuple),
        }
    }
}

/// Ordered rule table with `p` and `g` sections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPolicyStore {
    policies: Vec<PolicyTuple>,
    groupings: Vec<PolicyTuple>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policies<I: IntoIterator<Item = PolicyTuple>>(policies: I) -> Self {
        Self {
            policies: policies.into_iter().collect(),
            groupings: Vec::new(),
        }
    }

    pub fn policies(&self) -> &[PolicyTuple] {
        &self.policies
    }

    pub fn groupings(&self) -> &[PolicyTuple] {
        &self.groupings
    }

    pub fn filter(&self, filter: &PolicyFilter) -> PolicyFilterResponse {
        let policies: Vec<PolicyTuple> = self
            .policies
            .iter()
            .filter(|tuple| filter.matches(tuple))
            .cloned()
            .collect();
        PolicyFilterResponse {
            total: policies.len() as u64,
            policies,
        }
    }

    pub fn filter_groupings(&self, filter: &GroupingFilter) -> Vec<PolicyTuple> {
        self.groupings
            .iter()
            .filter(|tuple| filter.matches(tuple))
            .cloned()
            .collect()
    }

    pub fn add(&mut self, batch: &[PolicyTuple], skip: bool) -> Result<(), StoreRejection> {
        insert_batch(&mut self.policies, batch, skip)
    }

    pub fn delete(&mut self, batch: &[PolicyTuple]) -> Result<(), StoreRejection> {
        remove_batch(&mut self.policies, batch)
    }

    pub fn add_groupings(&mut self, batch: &[PolicyTuple], skip: bool) -> Result<(), StoreRejection> {
        insert_batch(&mut self.groupings, batch, skip)
    }

    pub fn delete_groupings(&mut self, batch: &[PolicyTuple]) -> Result<(), StoreRejection> {
        remove_batch(&mut self.groupings, batch)
    }

    /// Replace one rule in place, keeping its position.
    pub fn edit(&mut self, old: &PolicyTuple, new: &PolicyTuple) -> Result<(), StoreRejection> {
        let index = self
            .policies
            .iter()
            .position(|tuple| tuple == old)
            .ok_or_else(|| StoreRejection::NotFound(old.clone()))?;
        if old != new && self.policies.contains(new) {
            return Err(StoreRejection::AlreadyExists(new.clone()));
        }
        self.policies[index] = new.clone();
        Ok(())
    }

    /// Allow-and-deny evaluation with role inheritance through `g` lines.
    ///
    /// Any matching deny wins. Otherwise the first matching allow is cited.
    pub fn explain(&self, sub: &str, obj: &str, act: &str) -> ExplainResponse {
        let subjects = self.subjects_for(sub);
        let matching = self.policies.iter().filter(|tuple| {
            tuple.subject().is_some_and(|s| subjects.contains(s))
                && tuple.object() == Some(obj)
                && tuple.action() == Some(act)
        });
        let mut allow = None;
        for tuple in matching {
            match tuple.effect() {
                Some(Effect::Deny) => return ExplainResponse::denied(),
                Some(Effect::Allow) if allow.is_none() => {
                    allow = Some(PolicyTuple::new(tuple.as_slice().iter().take(4).cloned()))
                }
                _ => {}
            }
        }
        allow.map_or_else(ExplainResponse::denied, ExplainResponse::allowed)
    }

    fn subjects_for(&self, sub: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut pending = vec![sub.to_string()];
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            for grouping in &self.groupings {
                if grouping.get(0) == Some(current.as_str()) {
                    if let Some(role) = grouping.get(1) {
                        pending.push(role.to_string());
                    }
                }
            }
        }
        seen
    }
}

fn insert_batch(
    table: &mut Vec<PolicyTuple>,
    batch: &[PolicyTuple],
    skip: bool,
) -> Result<(), StoreRejection> {
    if !skip {
        if let Some(existing) = batch.iter().find(|tuple| table.contains(tuple)) {
            return Err(StoreRejection::AlreadyExists(existing.clone()));
        }
    }
    for tuple in batch {
        if !table.contains(tuple) {
            table.push(tuple.clone());
        }
    }
    Ok(())
}

fn remove_batch(table: &mut Vec<PolicyTuple>, batch: &[PolicyTuple]) -> Result<(), StoreRejection> {
    if let Some(missing) = batch.iter().find(|tuple| !table.contains(tuple)) {
        return Err(StoreRejection::NotFound(missing.clone()));
    }
    table.retain(|tuple| !batch.contains(tuple));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(sub: &str, obj: &str, act: &str, eft: &str) -> PolicyTuple {
        PolicyTuple::from([sub, obj, act, eft])
    }

    #[test]
    fn add_without_skip_is_atomic() {
        let a = tuple("alice", "doc1", "read", "allow");
        let b = tuple("bob", "doc1", "read", "allow");
        let mut store = InMemoryPolicyStore::with_policies([a.clone()]);
        assert!(store.add(&[a.clone(), b.clone()], false).is_err());
        assert_eq!(store.policies(), &[a.clone()]);
        assert!(store.add(&[a.clone(), b.clone()], true).is_ok());
        assert_eq!(store.policies(), &[a, b]);
    }

    #[test]
    fn delete_is_atomic() {
        let a = tuple("alice", "doc1", "read", "allow");
        let b = tuple("bob", "doc1", "read", "allow");
        let c = tuple("carol", "doc1", "read", "allow");
        let mut store = InMemoryPolicyStore::with_policies([a.clone(), b.clone()]);
        assert_eq!(store.delete(&[a.clone(), c.clone()]), Err(StoreRejection::NotFound(c)));
        assert_eq!(store.policies().len(), 2);
    }

    #[test]
    fn explain_follows_roles_and_deny() {
        let mut store = InMemoryPolicyStore::with_policies([tuple("editors", "doc1", "write", "allow")]);
        store
            .add_groupings(&[PolicyTuple::grouping("alice", "editors")], false)
            .unwrap();
        let decision = store.explain("alice", "doc1", "write");
        assert!(decision.allow);
        assert_eq!(decision.reason, Some(tuple("editors", "doc1", "write", "allow")));

        store.add(&[tuple("alice", "doc1", "write", "deny")], false).unwrap();
        assert_eq!(store.explain("alice", "doc1", "write"), ExplainResponse::denied());
        assert_eq!(store.explain("bob", "doc1", "write"), ExplainResponse::denied());
    }
}
