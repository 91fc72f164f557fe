//! Abstract-group storage and sync.
//!
//! The lifecycle is checked before a call is made and recorded on the draft
//! only after the service accepted it.

use crate::error::{ApiClientError, ClientResult};
use crate::rest::{path_segment, RestClient};
use tracing::info;
use warrant_core::{AbstractGroupDraft, AbstractGroupRecord, GroupEvent, GroupState, SyncResponse};

const ABSTRACT_GROUPS: &str = "/api/v1/admin/abstract-groups";

#[derive(Clone)]
pub struct AbstractGroupClient {
    rest: RestClient,
}

impl AbstractGroupClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Submit a draft. On success the draft holds the server id.
    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: &mut AbstractGroupDraft) -> ClientResult<AbstractGroupRecord> {
        let body = draft.create_request()?;
        let record: AbstractGroupRecord = self.rest.post_json(ABSTRACT_GROUPS, &body).await?;
        if record.id.trim().is_empty() {
            return Err(ApiClientError::InvalidResponse(
                "created group has no id".to_string(),
            ));
        }
        draft.mark_created(record.id.clone())?;
        info!(id = %record.id, "abstract group created");
        Ok(record)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &str) -> ClientResult<AbstractGroupRecord> {
        let id = path_segment("id", id)?;
        self.rest
            .get_json(&format!("{}/{}", ABSTRACT_GROUPS, id))
            .await
    }

    /// Ask the service to re-evaluate the draft's rule. Safe to repeat.
    #[tracing::instrument(skip(self, draft), fields(id = ?draft.id()))]
    pub async fn sync(&self, draft: &mut AbstractGroupDraft) -> ClientResult<SyncResponse> {
        draft.state().apply(GroupEvent::Sync)?;
        let response = self.sync_by_id(draft.require_id()?).await?;
        draft.record(GroupEvent::Sync)?;
        Ok(response)
    }

    /// Sync a stored group known only by id.
    #[tracing::instrument(skip(self))]
    pub async fn sync_by_id(&self, id: &str) -> ClientResult<SyncResponse> {
        let id = path_segment("id", id)?;
        let response: SyncResponse = self
            .rest
            .post_empty(&format!("{}/{}/sync", ABSTRACT_GROUPS, id))
            .await?;
        info!(id, synced_users = response.synced_users, "abstract group synced");
        Ok(response)
    }

    #[tracing::instrument(skip(self, draft), fields(id = ?draft.id()))]
    pub async fn delete(&self, draft: &mut AbstractGroupDraft) -> ClientResult<GroupState> {
        draft.state().apply(GroupEvent::Delete)?;
        self.delete_by_id(draft.require_id()?).await?;
        Ok(draft.record(GroupEvent::Delete)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> ClientResult<()> {
        let id = path_segment("id", id)?;
        self.rest
            .delete(&format!("{}/{}", ABSTRACT_GROUPS, id))
            .await?;
        info!(id, "abstract group deleted");
        Ok(())
    }
}
