//! Execute side of the filter contract.
//!
//! [`FilterEngine::execute`] never returns an error. Transport failures,
//! service rejections and ill-shaped bodies are logged and folded into
//! [`ListResult::failure`] so list views render one empty-with-error state.

use crate::error::{ApiClientError, ClientResult};
use crate::rest::RestClient;
use serde::de::DeserializeOwned;
use warrant_core::{
    FilterRequest, FilterResponse, ListResult, PaginationRequest, ResourceKind, ValidationError,
};

#[derive(Clone)]
pub struct FilterEngine {
    rest: RestClient,
    max_page_size: u32,
}

impl FilterEngine {
    pub fn new(rest: RestClient, max_page_size: u32) -> Self {
        Self {
            rest,
            max_page_size,
        }
    }

    /// Copy of `request` that is safe to send.
    ///
    /// Page 0 becomes 1, a zero page size becomes the default, the size is
    /// capped at the configured maximum and empty nested groups are pruned.
    pub fn prepare(&self, request: &FilterRequest) -> Result<FilterRequest, ValidationError> {
        request.filter.check_depth()?;
        let raw = request.pagination;
        let pagination = PaginationRequest {
            all: raw.all,
            ..PaginationRequest::new(i64::from(raw.page), i64::from(raw.page_size))
        }
        .capped(self.max_page_size);

        let prepared = FilterRequest {
            filter: request.filter.clone().prune(),
            sort: request.sort.clone(),
            pagination,
            verbose: request.verbose,
        };
        prepared.validate()?;
        Ok(prepared)
    }

    /// One round trip to the resource's filter endpoint, errors included.
    #[tracing::instrument(skip(self, resource, request), fields(resource = resource.name()))]
    pub async fn search<T: DeserializeOwned>(
        &self,
        resource: &ResourceKind,
        request: &FilterRequest,
    ) -> ClientResult<FilterResponse<T>> {
        let prepared = self.prepare(request)?;
        tracing::debug!(
            page = prepared.pagination.page,
            page_size = prepared.pagination.page_size,
            all = prepared.pagination.all,
            conditions = prepared.filter.condition_count(),
            "filter request"
        );
        let response: FilterResponse<T> = self
            .rest
            .post_json(resource.filter_path(), &prepared)
            .await?;
        if !prepared.pagination.all
            && (response.page != prepared.pagination.page
                || response.page_size != prepared.pagination.page_size)
        {
            tracing::warn!(
                sent_page = prepared.pagination.page,
                sent_page_size = prepared.pagination.page_size,
                page = response.page,
                page_size = response.page_size,
                "service did not echo paging parameters"
            );
        }
        Ok(response)
    }

    /// Hydrated rows. The request is sent with `verbose = true`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        resource: &ResourceKind,
        request: &FilterRequest,
    ) -> ListResult<T> {
        let request = FilterRequest {
            verbose: true,
            ..request.clone()
        };
        let outcome = self.search::<T>(resource, &request).await;
        normalize(resource, outcome, FilterResponse::into_list_result)
    }

    /// Identifier rows. The request is sent with `verbose = false`.
    pub async fn execute_identifiers(
        &self,
        resource: &ResourceKind,
        request: &FilterRequest,
    ) -> ListResult<String> {
        let request = FilterRequest {
            verbose: false,
            ..request.clone()
        };
        let outcome = self.search::<serde_json::Value>(resource, &request).await;
        normalize(resource, outcome, FilterResponse::into_identifier_result)
    }
}

/// Fold a search outcome into a list result.
pub fn normalize<T, R>(
    resource: &ResourceKind,
    outcome: Result<FilterResponse<T>, ApiClientError>,
    read: impl FnOnce(FilterResponse<T>) -> ListResult<R>,
) -> ListResult<R> {
    match outcome {
        Ok(response) => {
            if !response.is_consistent() {
                tracing::warn!(
                    resource = resource.name(),
                    total = response.total,
                    total_pages = response.total_pages,
                    "inconsistent paging metadata"
                );
            }
            let result = read(response);
            if let Some(reason) = result.message.as_deref().filter(|_| !result.success) {
                tracing::warn!(resource = resource.name(), reason, "ill-shaped filter response");
            }
            result
        }
        Err(err) => {
            tracing::warn!(
                resource = resource.name(),
                category = ?err.category(),
                error = %err,
                "filter request failed"
            );
            ListResult::failure(err.user_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, ClientConfig, LogConfig};
    use warrant_core::{FilterGroup, MAX_FILTER_DEPTH};

    fn engine(max_page_size: u32) -> FilterEngine {
        let config = ClientConfig {
            api_base_url: "http://localhost:1".to_string(),
            tenant_id: None,
            auth: AuthConfig {
                api_key: Some("k".to_string()),
                jwt: None,
            },
            request_timeout_ms: 1000,
            max_page_size,
            log: LogConfig::default(),
        };
        FilterEngine::new(RestClient::new(&config).unwrap(), max_page_size)
    }

    #[test]
    fn prepare_clamps_and_caps() {
        let engine = engine(50);
        let mut request = FilterRequest::default();
        request.pagination.page = 0;
        request.pagination.page_size = 900;
        let prepared = engine.prepare(&request).unwrap();
        assert_eq!(prepared.pagination.page, 1);
        assert_eq!(prepared.pagination.page_size, 50);
    }

    #[test]
    fn prepare_keeps_all_flag_and_prunes() {
        let engine = engine(100);
        let request = FilterRequest {
            filter: FilterGroup::and().with_group(FilterGroup::or()),
            pagination: PaginationRequest::all(),
            ..FilterRequest::default()
        };
        let prepared = engine.prepare(&request).unwrap();
        assert!(prepared.pagination.all);
        assert!(prepared.filter.groups.is_empty());
    }

    #[test]
    fn prepare_rejects_deep_trees() {
        let engine = engine(100);
        let mut group = FilterGroup::and().with_condition(warrant_core::FilterCondition::eq("a", 1));
        for _ in 0..MAX_FILTER_DEPTH {
            group = FilterGroup::and().with_group(group);
        }
        let request = FilterRequest::new(group);
        assert!(matches!(
            engine.prepare(&request),
            Err(ValidationError::FilterTooDeep { .. })
        ));
    }

    #[test]
    fn prepare_refuses_very_deep_trees_before_pruning() {
        let engine = engine(100);
        let mut group = FilterGroup::and();
        for _ in 0..200_000 {
            group = FilterGroup::and().with_group(group);
        }
        let request = FilterRequest::new(group);
        assert!(matches!(
            engine.prepare(&request),
            Err(ValidationError::FilterTooDeep { .. })
        ));

        // Take the tree apart one level at a time; recursive drop would overflow.
        let mut group = request.filter;
        while let Some(child) = group.groups.pop() {
            group = child;
        }
    }

    #[test]
    fn normalize_folds_errors() {
        let result: ListResult<String> = normalize(
            &ResourceKind::Users,
            Err::<FilterResponse<String>, _>(ApiClientError::Service {
                code: 5001,
                message: "backend down".to_string(),
            }),
            FilterResponse::into_list_result,
        );
        assert!(!result.success);
        assert_eq!(result.total, 0);
        assert!(result.data.is_empty());
        assert_eq!(result.message.as_deref(), Some("backend down"));
    }
}
