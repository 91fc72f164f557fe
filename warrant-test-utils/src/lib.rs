//! Warrant Test Utilities
//!
//! Shared test infrastructure for the Warrant workspace:
//! - Proptest generators for filter trees and policy tuples
//! - An in-memory policy store with the service's atomic batch semantics
//! - A wiremock responder serving the policy endpoints from that store
//! - Fixtures for common scenarios

pub mod generators;
pub mod responder;
pub mod store;

pub use generators::*;
pub use responder::{
    mount_policy_service, shared, start_policy_service, PolicyStoreResponder, SharedStore,
};
pub use store::{InMemoryPolicyStore, StoreRejection};

use serde_json::{json, Value};
use warrant_core::PolicyTuple;

// ============================================================================
// FIXTURES
// ============================================================================

/// `["alice", "doc1", "read", "allow"]`
pub fn alice_reads_doc1() -> PolicyTuple {
    PolicyTuple::from(["alice", "doc1", "read", "allow"])
}

/// A well-formed filter page body as the service would send it.
pub fn filter_page(items: Vec<Value>, total: u64, page: u32, page_size: u32) -> Value {
    json!({
        "total": total,
        "page": page,
        "pageSize": page_size,
        "totalPages": warrant_core::total_pages(total, page_size),
        "isAll": false,
        "items": items
    })
}

/// A non-verbose filter page body.
pub fn identifier_page(identifiers: Vec<&str>, total: u64, page: u32, page_size: u32) -> Value {
    json!({
        "total": total,
        "page": page,
        "pageSize": page_size,
        "totalPages": warrant_core::total_pages(total, page_size),
        "isAll": false,
        "identifiers": identifiers
    })
}

pub fn user_row(upn: &str) -> Value {
    json!({"upn": upn, "display_name": upn.split('@').next().unwrap_or(upn)})
}
