//! Policy tuples and the request/response shapes of the policy endpoints.
//!
//! A tuple has no surrogate key. Two tuples are the same rule exactly when
//! every element matches position by position, so lookups, deletes and edits
//! all work by value.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Rule-table line type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// `[subject, object, action, effect, ...extra]`
    P,
    /// `[user, role, ...extra]`
    G,
}

impl PolicyKind {
    pub fn min_len(self) -> usize {
        match self {
            PolicyKind::P => 4,
            PolicyKind::G => 2,
        }
    }
}

/// Decision carried in the effect position of a `p` tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(self) -> &'static str {
        match self {
            Effect::Allow => "allow",
            Effect::Deny => "deny",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "allow" => Some(Effect::Allow),
            "deny" => Some(Effect::Deny),
            _ => None,
        }
    }
}

/// Ordered string tuple identifying one rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyTuple(Vec<String>);

impl PolicyTuple {
    pub fn new<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(elements.into_iter().map(Into::into).collect())
    }

    /// A `p` line.
    pub fn rule(subject: &str, object: &str, action: &str, effect: Effect) -> Self {
        Self::new([subject, object, action, effect.as_str()])
    }

    /// A `g` line.
    pub fn grouping(user: &str, role: &str) -> Self {
        Self::new([user, role])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn object(&self) -> Option<&str> {
        self.get(1)
    }

    pub fn action(&self) -> Option<&str> {
        self.get(2)
    }

    pub fn effect(&self) -> Option<Effect> {
        self.get(3).and_then(Effect::parse)
    }

    /// Stable hex digest of the full tuple contents.
    ///
    /// Elements are length-prefixed so `["ab","c"]` and `["a","bc"]` differ.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for element in &self.0 {
            hasher.update((element.len() as u64).to_be_bytes());
            hasher.update(element.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    pub fn validate(&self, kind: PolicyKind) -> ValidationResult<()> {
        if self.0.len() < kind.min_len() {
            return Err(self.malformed(format!(
                "expected at least {} elements, got {}",
                kind.min_len(),
                self.0.len()
            )));
        }
        if let Some(position) = self.0.iter().position(|e| e.trim().is_empty()) {
            return Err(self.malformed(format!("element {} is empty", position)));
        }
        if kind == PolicyKind::P && self.effect().is_none() {
            return Err(self.malformed("effect must be 'allow' or 'deny'"));
        }
        Ok(())
    }

    fn malformed(&self, reason: impl Into<String>) -> ValidationError {
        ValidationError::MalformedTuple {
            tuple: self.0.clone(),
            reason: reason.into(),
        }
    }
}

impl From<Vec<String>> for PolicyTuple {
    fn from(elements: Vec<String>) -> Self {
        Self(elements)
    }
}

impl<const N: usize> From<[&str; N]> for PolicyTuple {
    fn from(elements: [&str; N]) -> Self {
        Self::new(elements)
    }
}

impl std::fmt::Display for PolicyTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Check a batch before sending: non-empty, well-formed, no repeats.
pub fn validate_batch(
    tuples: &[PolicyTuple],
    kind: PolicyKind,
    operation: &'static str,
) -> ValidationResult<()> {
    if tuples.is_empty() {
        return Err(ValidationError::EmptyBatch { operation });
    }
    let mut seen = HashSet::with_capacity(tuples.len());
    for tuple in tuples {
        tuple.validate(kind)?;
        if !seen.insert(tuple) {
            return Err(ValidationError::DuplicateInBatch {
                tuple: tuple.as_slice().to_vec(),
            });
        }
    }
    Ok(())
}

/// Positional restriction for `POST /auth/admin/policies/filter`.
///
/// An empty list places no restriction on its position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acts: Vec<String>,
}

impl PolicyFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn subjects<S: Into<String>>(mut self, subs: impl IntoIterator<Item = S>) -> Self {
        self.subs = subs.into_iter().map(Into::into).collect();
        self
    }

    pub fn objects<S: Into<String>>(mut self, objs: impl IntoIterator<Item = S>) -> Self {
        self.objs = objs.into_iter().map(Into::into).collect();
        self
    }

    pub fn actions<S: Into<String>>(mut self, acts: impl IntoIterator<Item = S>) -> Self {
        self.acts = acts.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches(&self, tuple: &PolicyTuple) -> bool {
        position_matches(&self.subs, tuple.subject())
            && position_matches(&self.objs, tuple.object())
            && position_matches(&self.acts, tuple.action())
    }
}

fn position_matches(allowed: &[String], value: Option<&str>) -> bool {
    allowed.is_empty() || value.is_some_and(|v| allowed.iter().any(|a| a == v))
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyFilterResponse {
    pub policies: Vec<PolicyTuple>,
    pub total: u64,
}

/// Body of the add endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPoliciesRequest {
    pub policies: Vec<PolicyTuple>,
    /// Ignore tuples that already exist instead of rejecting the batch.
    #[serde(default)]
    pub skip: bool,
}

/// Body of the delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePoliciesRequest {
    pub policies: Vec<PolicyTuple>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPolicyRequest {
    pub old_policy: PolicyTuple,
    pub new_policy: PolicyTuple,
}

/// Restriction for `POST /auth/admin/groupings/filter`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupingFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl GroupingFilter {
    pub fn matches(&self, tuple: &PolicyTuple) -> bool {
        position_matches(&self.users, tuple.get(0)) && position_matches(&self.roles, tuple.get(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupingFilterResponse {
    pub groups: Vec<PolicyTuple>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub sub: String,
    pub obj: String,
    pub act: String,
}

/// Decision plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub allow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<PolicyTuple>,
}

impl ExplainResponse {
    pub fn denied() -> Self {
        Self {
            allow: false,
            reason: None,
        }
    }

    pub fn allowed(reason: PolicyTuple) -> Self {
        Self {
            allow: true,
            reason: Some(reason),
        }
    }

    /// Enforce the reason invariant.
    ///
    /// A denial never carries a reason, whatever the service sent. An allow
    /// must name a four-element rule.
    pub fn normalize(self) -> ValidationResult<Self> {
        if !self.allow {
            return Ok(Self::denied());
        }
        match self.reason {
            Some(reason) if reason.len() == 4 && !reason.as_slice().iter().any(String::is_empty) => {
                Ok(Self::allowed(reason))
            }
            Some(reason) => Err(ValidationError::MalformedTuple {
                tuple: reason.into_inner(),
                reason: "allow decision must cite a 4-element rule".to_string(),
            }),
            None => Err(ValidationError::RequiredFieldMissing {
                field: "reason".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alice() -> PolicyTuple {
        PolicyTuple::from(["alice", "doc1", "read", "allow"])
    }

    #[test]
    fn identity_is_positional() {
        assert_eq!(alice(), PolicyTuple::rule("alice", "doc1", "read", Effect::Allow));
        assert_ne!(alice(), PolicyTuple::from(["doc1", "alice", "read", "allow"]));
        assert_eq!(alice().fingerprint(), alice().fingerprint());
        assert_ne!(
            PolicyTuple::from(["ab", "c"]).fingerprint(),
            PolicyTuple::from(["a", "bc"]).fingerprint()
        );
    }

    #[test]
    fn serializes_as_plain_array() {
        assert_eq!(
            serde_json::to_value(alice()).unwrap(),
            json!(["alice", "doc1", "read", "allow"])
        );
    }

    #[test]
    fn validate_rejects_short_and_blank() {
        assert!(alice().validate(PolicyKind::P).is_ok());
        assert!(PolicyTuple::from(["alice", "doc1"]).validate(PolicyKind::P).is_err());
        assert!(PolicyTuple::from(["alice", "", "read", "allow"])
            .validate(PolicyKind::P)
            .is_err());
        assert!(PolicyTuple::from(["alice", "doc1", "read", "maybe"])
            .validate(PolicyKind::P)
            .is_err());
        assert!(PolicyTuple::grouping("alice", "admin").validate(PolicyKind::G).is_ok());
    }

    #[test]
    fn batch_rejects_duplicates_and_empty() {
        assert_eq!(
            validate_batch(&[], PolicyKind::P, "add"),
            Err(ValidationError::EmptyBatch { operation: "add" })
        );
        assert!(matches!(
            validate_batch(&[alice(), alice()], PolicyKind::P, "add"),
            Err(ValidationError::DuplicateInBatch { .. })
        ));
    }

    #[test]
    fn empty_filter_lists_match_any() {
        assert!(PolicyFilter::any().matches(&alice()));
        assert!(PolicyFilter::any().subjects(["alice"]).matches(&alice()));
        assert!(!PolicyFilter::any().subjects(["bob"]).matches(&alice()));
        assert!(PolicyFilter::any()
            .subjects(["bob", "alice"])
            .actions(["read"])
            .matches(&alice()));
        assert_eq!(
            serde_json::to_value(PolicyFilter::any().subjects(["alice"])).unwrap(),
            json!({"subs": ["alice"]})
        );
    }

    #[test]
    fn edit_request_is_camel_case() {
        let request = EditPolicyRequest {
            old_policy: alice(),
            new_policy: PolicyTuple::from(["alice", "doc1", "write", "allow"]),
        };
        let value = serde_json::to_value(request).unwrap();
        assert!(value.get("oldPolicy").is_some());
        assert!(value.get("newPolicy").is_some());
    }

    #[test]
    fn denial_drops_reason() {
        let raw: ExplainResponse =
            serde_json::from_value(json!({"allow": false, "reason": []})).unwrap();
        assert_eq!(raw.normalize().unwrap(), ExplainResponse::denied());
    }

    #[test]
    fn allow_requires_four_element_reason() {
        let raw: ExplainResponse = serde_json::from_value(
            json!({"allow": true, "reason": ["alice", "doc1", "read", "allow"]}),
        )
        .unwrap();
        assert_eq!(raw.normalize().unwrap().reason, Some(alice()));

        let short: ExplainResponse =
            serde_json::from_value(json!({"allow": true, "reason": ["alice"]})).unwrap();
        assert!(short.normalize().is_err());

        let missing: ExplainResponse = serde_json::from_value(json!({"allow": true})).unwrap();
        assert!(missing.normalize().is_err());
    }
}
