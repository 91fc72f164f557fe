//! Searchable resource collections and their row types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A collection reachable through a generic filter endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    I18n,
    QuotaPoolRules,
    /// Any other collection speaking the same filter contract.
    Custom {
        path: String,
        keyword_fields: Vec<String>,
    },
}

impl ResourceKind {
    pub fn filter_path(&self) -> &str {
        match self {
            ResourceKind::Users => "/userinfos/filter",
            ResourceKind::I18n => "/config/i18n/filter",
            ResourceKind::QuotaPoolRules => "/quota/pool-rules/filter",
            ResourceKind::Custom { path, .. } => path,
        }
    }

    /// Fields a free-text search box expands across.
    pub fn keyword_fields(&self) -> Vec<&str> {
        match self {
            ResourceKind::Users => vec!["upn", "display_name", "email", "department"],
            ResourceKind::I18n => vec!["key", "value"],
            ResourceKind::QuotaPoolRules => vec!["name", "pool", "description"],
            ResourceKind::Custom { keyword_fields, .. } => {
                keyword_fields.iter().map(String::as_str).collect()
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::I18n => "i18n",
            ResourceKind::QuotaPoolRules => "quota-rules",
            ResourceKind::Custom { path, .. } => path,
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" | "userinfos" => Ok(ResourceKind::Users),
            "i18n" => Ok(ResourceKind::I18n),
            "quota-rules" | "quota-pool-rules" => Ok(ResourceKind::QuotaPoolRules),
            other => Err(crate::error::ValidationError::invalid(
                "resource",
                format!("unknown resource '{}'", other),
            )),
        }
    }
}

/// Hydrated user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub upn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One translated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct I18nEntry {
    pub key: String,
    pub locale: String,
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Quota-pool rule row. Quota arithmetic lives on the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaPoolRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
