//! Warrant Client - HTTP access to the authorization admin service
//!
//! - [`FilterEngine`]: generic `/.../filter` endpoints, never failing past
//!   the caller
//! - [`PolicyClient`]: policy and grouping tuples, atomic batches, explain
//! - [`AbstractGroupClient`]: rule-defined groups and their sync trigger
//! - [`ListView`] and [`RequestSequence`]: caller-owned list state that
//!   ignores stale responses

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod groups;
pub mod policy;
pub mod rest;
pub mod telemetry;
pub mod view;

pub use client::WarrantClient;
pub use config::{AuthConfig, ClientConfig, ConfigError, LogConfig, CONFIG_ENV_VAR};
pub use engine::FilterEngine;
pub use error::{ApiClientError, ClientResult, ErrorCategory};
pub use groups::AbstractGroupClient;
pub use policy::PolicyClient;
pub use rest::RestClient;
pub use view::{Completion, ListQuery, ListView, RequestSequence, RowKey, Ticket};
