//! Policy and grouping tuple operations.
//!
//! Batch add and delete are atomic at the service. A failed batch is surfaced
//! verbatim; callers re-query before assuming anything about the store.

use crate::error::{ApiClientError, ClientResult};
use crate::rest::RestClient;
use tracing::info;
use warrant_core::{
    validate_batch, AddPoliciesRequest, DeletePoliciesRequest, EditPolicyRequest, ExplainRequest,
    ExplainResponse, GroupingFilter, GroupingFilterResponse, ListResult, PolicyFilter,
    PolicyFilterResponse, PolicyKind, PolicyTuple, ValidationError,
};

const POLICIES_FILTER: &str = "/auth/admin/policies/filter";
const POLICIES_ADD: &str = "/auth/admin/policies/add";
const POLICIES_DELETE: &str = "/auth/admin/policies/delete";
const POLICIES_EDIT: &str = "/auth/admin/policies/edit";
const POLICIES_EXPLAIN: &str = "/auth/admin/policies/explain";
const GROUPINGS_FILTER: &str = "/auth/admin/groupings/filter";
const GROUPINGS_ADD: &str = "/auth/admin/groupings/add";
const GROUPINGS_DELETE: &str = "/auth/admin/groupings/delete";

#[derive(Clone)]
pub struct PolicyClient {
    rest: RestClient,
}

impl PolicyClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Tuples matching `filter`. Empty lists restrict nothing.
    #[tracing::instrument(skip(self))]
    pub async fn filter(&self, filter: &PolicyFilter) -> ClientResult<PolicyFilterResponse> {
        self.rest.post_json(POLICIES_FILTER, filter).await
    }

    /// [`PolicyClient::filter`] for list views.
    ///
    /// A malformed tuple in the response makes the whole page a failure.
    pub async fn list(&self, filter: &PolicyFilter) -> ListResult<PolicyTuple> {
        let outcome = self.filter(filter).await.and_then(|response| {
            for tuple in &response.policies {
                tuple.validate(PolicyKind::P)?;
            }
            Ok(response)
        });
        match outcome {
            Ok(response) => ListResult::ok(response.total, response.policies),
            Err(err) => {
                tracing::warn!(category = ?err.category(), error = %err, "policy list failed");
                ListResult::failure(err.user_message())
            }
        }
    }

    /// Insert `policies`. Without `skip` one existing tuple rejects the batch.
    #[tracing::instrument(skip(self, policies), fields(count = policies.len()))]
    pub async fn add(&self, policies: Vec<PolicyTuple>, skip: bool) -> ClientResult<()> {
        validate_batch(&policies, PolicyKind::P, "add")?;
        let count = policies.len();
        let body = AddPoliciesRequest { policies, skip };
        self.rest.post_ack(POLICIES_ADD, &body).await?;
        info!(count, skip, "policies added");
        Ok(())
    }

    /// Remove `policies`. One unknown tuple rejects the batch.
    #[tracing::instrument(skip(self, policies), fields(count = policies.len()))]
    pub async fn delete(&self, policies: Vec<PolicyTuple>) -> ClientResult<()> {
        validate_batch(&policies, PolicyKind::P, "delete")?;
        let count = policies.len();
        let body = DeletePoliciesRequest { policies };
        self.rest.post_ack(POLICIES_DELETE, &body).await?;
        info!(count, "policies deleted");
        Ok(())
    }

    /// Replace `old` by value. The full prior tuple identifies the row.
    #[tracing::instrument(skip(self))]
    pub async fn edit(&self, old: PolicyTuple, new: PolicyTuple) -> ClientResult<()> {
        old.validate(PolicyKind::P)?;
        new.validate(PolicyKind::P)?;
        let body = EditPolicyRequest {
            old_policy: old,
            new_policy: new,
        };
        self.rest.post_ack(POLICIES_EDIT, &body).await?;
        info!(count = 1, "policy edited");
        Ok(())
    }

    /// Which rule, if any, allows `sub` to `act` on `obj`.
    ///
    /// A denial never carries a reason. An allow without a four-element
    /// reason is a shape failure.
    #[tracing::instrument(skip(self))]
    pub async fn explain(&self, sub: &str, obj: &str, act: &str) -> ClientResult<ExplainResponse> {
        for (field, value) in [("sub", sub), ("obj", obj), ("act", act)] {
            if value.trim().is_empty() {
                return Err(ValidationError::RequiredFieldMissing {
                    field: field.to_string(),
                }
                .into());
            }
        }
        let body = ExplainRequest {
            sub: sub.to_string(),
            obj: obj.to_string(),
            act: act.to_string(),
        };
        let response: ExplainResponse = self.rest.post_json(POLICIES_EXPLAIN, &body).await?;
        response
            .normalize()
            .map_err(|err| ApiClientError::InvalidResponse(err.to_string()))
    }

    #[tracing::instrument(skip(self))]
    pub async fn filter_groupings(
        &self,
        filter: &GroupingFilter,
    ) -> ClientResult<GroupingFilterResponse> {
        self.rest.post_json(GROUPINGS_FILTER, filter).await
    }

    #[tracing::instrument(skip(self, groupings), fields(count = groupings.len()))]
    pub async fn add_groupings(&self, groupings: Vec<PolicyTuple>, skip: bool) -> ClientResult<()> {
        validate_batch(&groupings, PolicyKind::G, "add groupings")?;
        let count = groupings.len();
        let body = AddPoliciesRequest {
            policies: groupings,
            skip,
        };
        self.rest.post_ack(GROUPINGS_ADD, &body).await?;
        info!(count, skip, "groupings added");
        Ok(())
    }

    #[tracing::instrument(skip(self, groupings), fields(count = groupings.len()))]
    pub async fn delete_groupings(&self, groupings: Vec<PolicyTuple>) -> ClientResult<()> {
        validate_batch(&groupings, PolicyKind::G, "delete groupings")?;
        let count = groupings.len();
        let body = DeletePoliciesRequest {
            policies: groupings,
        };
        self.rest.post_ack(GROUPINGS_DELETE, &body).await?;
        info!(count, "groupings deleted");
        Ok(())
    }
}
