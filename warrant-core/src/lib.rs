//! Warrant Core - request/response types
//!
//! Data types shared by the Warrant admin client: the recursive filter
//! contract used by every search screen, policy tuples, abstract-group rules
//! and the service envelope. This crate performs no I/O.

pub mod envelope;
pub mod error;
pub mod filter;
pub mod group;
pub mod pagination;
pub mod policy;
pub mod query;
pub mod resource;

pub use envelope::{unwrap_envelope, Envelope, ServiceRejection, REJECTED_WITHOUT_MESSAGE};
pub use error::{LifecycleError, ValidationError, ValidationResult, WarrantError};
pub use filter::{
    FilterBuilder, FilterCondition, FilterGroup, FilterOperator, FilterValue, Logic, Scalar,
    SortCondition, SortOrder, MAX_FILTER_DEPTH,
};
pub use group::{
    AbstractGroupDraft, AbstractGroupRecord, AbstractGroupRule, CreateAbstractGroupRequest,
    GroupEvent, GroupState, IttoolsRule, LogicalOperator, ManualRule, SyncResponse,
};
pub use pagination::{total_pages, PaginationRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use policy::{
    validate_batch, AddPoliciesRequest, DeletePoliciesRequest, EditPolicyRequest, Effect,
    ExplainRequest, ExplainResponse, GroupingFilter, GroupingFilterResponse, PolicyFilter,
    PolicyFilterResponse, PolicyKind, PolicyTuple,
};
pub use query::{FilterRequest, FilterResponse, ListResult, PageInfo, QueryState};
pub use resource::{I18nEntry, QuotaPoolRule, ResourceKind, UserInfo};
