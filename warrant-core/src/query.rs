//! Filter request/response envelopes and the normalized list result.

use crate::error::ValidationResult;
use crate::filter::{FilterGroup, SortCondition};
use crate::pagination::{total_pages, PaginationRequest};
use serde::{Deserialize, Serialize};

/// Generic search request accepted by every `/.../filter` endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[serde(default)]
    pub filter: FilterGroup,
    #[serde(default)]
    pub sort: Vec<SortCondition>,
    #[serde(default)]
    pub pagination: PaginationRequest,
    /// `false` returns identifiers only, `true` returns hydrated records.
    #[serde(default)]
    pub verbose: bool,
}

impl FilterRequest {
    pub fn new(filter: FilterGroup) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        self.filter.validate()?;
        self.pagination.validate()
    }
}

/// Raw page returned by a filter endpoint.
///
/// Every field is optional on the wire so that an ill-shaped body can still
/// be read and then judged by [`FilterResponse::into_list_result`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub is_all: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<Vec<String>>,
}

impl<T> FilterResponse<T> {
    /// Paging metadata as reported by the service.
    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            is_all: self.is_all,
        }
    }

    /// Whether `total`, `items` and `totalPages` agree with each other.
    pub fn is_consistent(&self) -> bool {
        let rows = self
            .items
            .as_ref()
            .map(Vec::len)
            .or_else(|| self.identifiers.as_ref().map(Vec::len))
            .unwrap_or(0) as u64;
        if self.is_all {
            return true;
        }
        self.total >= rows && self.total_pages == total_pages(self.total, self.page_size)
    }

    /// Hydrated rows, or a failure when the `items` array is missing.
    pub fn into_list_result(self) -> ListResult<T> {
        let page = self.page_info();
        match self.items {
            Some(items) => ListResult::ok(self.total, items).with_page(page),
            None => ListResult::failure("response is missing the items array"),
        }
    }

    /// Identifier rows, or a failure when the `identifiers` array is missing.
    pub fn into_identifier_result(self) -> ListResult<String> {
        let page = self.page_info();
        match self.identifiers {
            Some(identifiers) => ListResult::ok(self.total, identifiers).with_page(page),
            None => ListResult::failure("response is missing the identifiers array"),
        }
    }
}

/// Paging metadata echoed back by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    pub is_all: bool,
}

/// What a list view renders: rows on success, an empty failure otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub success: bool,
    pub total: u64,
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ListResult<T> {
    pub fn ok(total: u64, data: Vec<T>) -> Self {
        Self {
            success: true,
            total,
            data,
            page: None,
            message: None,
        }
    }

    /// `{ success: false, total: 0, data: [] }` with a user-visible message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            total: 0,
            data: Vec::new(),
            page: None,
            message: Some(message.into()),
        }
    }

    pub fn with_page(mut self, page: PageInfo) -> Self {
        self.page = Some(page);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Caller-owned search state for one list view.
///
/// [`QueryState::to_request`] is pure: the same state always yields the same
/// request, and the returned request shares nothing with the state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryState {
    filter: FilterGroup,
    sort: Vec<SortCondition>,
    pagination: PaginationRequest,
    verbose: bool,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.set_page_size(page_size);
        self
    }

    /// Replace the filter. A new filter starts again from page 1.
    pub fn set_filter(&mut self, filter: FilterGroup) {
        self.filter = filter;
        self.reset_page();
    }

    pub fn set_sort(&mut self, sort: Vec<SortCondition>) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: i64) {
        self.pagination = self.pagination.with_page(page);
    }

    /// Change the page size; the page resets to 1.
    pub fn set_page_size(&mut self, page_size: i64) {
        self.pagination = PaginationRequest {
            all: self.pagination.all,
            ..PaginationRequest::new(1, page_size)
        };
    }

    pub fn set_all(&mut self, all: bool) {
        self.pagination.all = all;
    }

    pub fn reset_page(&mut self) {
        self.pagination.page = 1;
    }

    pub fn filter(&self) -> &FilterGroup {
        &self.filter
    }

    pub fn pagination(&self) -> PaginationRequest {
        self.pagination
    }

    pub fn to_request(&self) -> FilterRequest {
        FilterRequest {
            filter: self.filter.clone().prune(),
            sort: self.sort.clone(),
            pagination: self.pagination,
            verbose: self.verbose,
        }
    }
}
