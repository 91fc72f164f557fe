//! Abstract-group membership rules and their operator-facing lifecycle.
//!
//! Rules are stored and transmitted only; the service evaluates them when a
//! sync is requested.

use crate::error::{LifecycleError, ValidationError, ValidationResult, WarrantError};
use crate::filter::{FilterCondition, FilterGroup, Logic};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl From<LogicalOperator> for Logic {
    fn from(op: LogicalOperator) -> Self {
        match op {
            LogicalOperator::And => Logic::And,
            LogicalOperator::Or => Logic::Or,
        }
    }
}

/// Attribute-based rule evaluated against user records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IttoolsRule {
    pub logical_operator: LogicalOperator,
    pub conditions: Vec<FilterCondition>,
}

/// Explicit member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualRule {
    pub upns: Vec<String>,
}

/// Exactly one populated branch, serialized as `{"ittools": ...}` or
/// `{"manual": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbstractGroupRule {
    Ittools(IttoolsRule),
    Manual(ManualRule),
}

impl AbstractGroupRule {
    pub fn attributes(logical_operator: LogicalOperator, conditions: Vec<FilterCondition>) -> Self {
        Self::Ittools(IttoolsRule {
            logical_operator,
            conditions,
        })
    }

    pub fn manual<S: Into<String>>(upns: impl IntoIterator<Item = S>) -> Self {
        Self::Manual(ManualRule {
            upns: upns.into_iter().map(Into::into).collect(),
        })
    }

    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            AbstractGroupRule::Ittools(rule) => {
                if rule.conditions.is_empty() {
                    return Err(ValidationError::RequiredFieldMissing {
                        field: "ittools.conditions".to_string(),
                    });
                }
                rule.conditions.iter().try_for_each(FilterCondition::validate)
            }
            AbstractGroupRule::Manual(rule) => {
                if rule.upns.is_empty() {
                    return Err(ValidationError::RequiredFieldMissing {
                        field: "manual.upns".to_string(),
                    });
                }
                if rule.upns.iter().any(|upn| upn.trim().is_empty()) {
                    return Err(ValidationError::invalid("manual.upns", "contains a blank UPN"));
                }
                Ok(())
            }
        }
    }

    /// The same rule as a one-level filter tree, for previewing matches
    /// through the user search endpoint.
    pub fn as_filter(&self) -> Option<FilterGroup> {
        match self {
            AbstractGroupRule::Ittools(rule) => Some(FilterGroup {
                logic: rule.logical_operator.into(),
                conditions: rule.conditions.clone(),
                groups: Vec::new(),
            }),
            AbstractGroupRule::Manual(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupState {
    #[default]
    Draft,
    Created,
    Synced,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupEvent {
    Submit,
    Sync,
    Delete,
}

impl GroupState {
    /// Next state after `event`. Sync may repeat.
    pub fn apply(self, event: GroupEvent) -> Result<GroupState, LifecycleError> {
        match (self, event) {
            (GroupState::Draft, GroupEvent::Submit) => Ok(GroupState::Created),
            (GroupState::Created | GroupState::Synced, GroupEvent::Sync) => Ok(GroupState::Synced),
            (GroupState::Created | GroupState::Synced, GroupEvent::Delete) => Ok(GroupState::Deleted),
            (from, event) => Err(LifecycleError::InvalidTransition { from, event }),
        }
    }
}

/// Stored group as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractGroupRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rule: AbstractGroupRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAbstractGroupRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rule: AbstractGroupRule,
}

/// Response of `POST .../abstract-groups/{id}/sync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub synced_users: u64,
}

/// Caller-owned group being edited by an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractGroupDraft {
    pub name: String,
    pub description: Option<String>,
    pub rule: AbstractGroupRule,
    id: Option<String>,
    state: GroupState,
}

impl AbstractGroupDraft {
    pub fn new(name: impl Into<String>, rule: AbstractGroupRule) -> Self {
        Self {
            name: name.into(),
            description: None,
            rule,
            id: None,
            state: GroupState::Draft,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Track an already-stored group.
    pub fn from_record(record: AbstractGroupRecord) -> Self {
        Self {
            name: record.name,
            description: record.description,
            rule: record.rule,
            id: Some(record.id),
            state: GroupState::Created,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn state(&self) -> GroupState {
        self.state
    }

    /// Request body for submission. Fails unless the draft may be submitted.
    pub fn create_request(&self) -> Result<CreateAbstractGroupRequest, WarrantError> {
        self.state.apply(GroupEvent::Submit)?;
        if self.name.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "name".to_string(),
            }
            .into());
        }
        self.rule.validate()?;
        Ok(CreateAbstractGroupRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            rule: self.rule.clone(),
        })
    }

    /// Server id, required for sync and delete.
    pub fn require_id(&self) -> Result<&str, LifecycleError> {
        self.id.as_deref().ok_or(LifecycleError::NotCreated)
    }

    /// Record a successful create.
    pub fn mark_created(&mut self, id: impl Into<String>) -> Result<(), LifecycleError> {
        self.state = self.state.apply(GroupEvent::Submit)?;
        self.id = Some(id.into());
        Ok(())
    }

    /// Record a successful `event` other than submit.
    pub fn record(&mut self, event: GroupEvent) -> Result<GroupState, LifecycleError> {
        self.state = self.state.apply(event)?;
        Ok(self.state)
    }
}
