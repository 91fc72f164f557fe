//! Caller-owned list state and the stale-response guard.
//!
//! A list view may have several requests in flight when the user pages or
//! edits the filter quickly. Responses can arrive out of order, so each
//! request carries a [`Ticket`] and only the latest ticket's result is shown.

use std::sync::atomic::{AtomicU64, Ordering};
use warrant_core::{
    FilterRequest, I18nEntry, ListResult, PolicyFilter, PolicyTuple, QueryState, QuotaPoolRule,
    UserInfo,
};

/// Token attached to one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic ticket issuer. Shareable across tasks.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True when no ticket was issued after `ticket`.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Search state a list view re-issues.
pub trait ListQuery {
    type Request;

    fn request(&self) -> Self::Request;

    /// Return to the first page, if the query pages at all.
    fn reset_page(&mut self);
}

impl ListQuery for QueryState {
    type Request = FilterRequest;

    fn request(&self) -> FilterRequest {
        self.to_request()
    }

    fn reset_page(&mut self) {
        QueryState::reset_page(self);
    }
}

impl ListQuery for PolicyFilter {
    type Request = PolicyFilter;

    fn request(&self) -> PolicyFilter {
        self.clone()
    }

    fn reset_page(&mut self) {}
}

/// Stable identity of a row, independent of its position.
pub trait RowKey {
    fn row_key(&self) -> String;
}

impl RowKey for PolicyTuple {
    fn row_key(&self) -> String {
        self.fingerprint()
    }
}

impl RowKey for UserInfo {
    fn row_key(&self) -> String {
        self.upn.clone()
    }
}

impl RowKey for I18nEntry {
    fn row_key(&self) -> String {
        format!("{}:{}", self.locale, self.key)
    }
}

impl RowKey for QuotaPoolRule {
    fn row_key(&self) -> String {
        match &self.id {
            Some(id) => id.to_string(),
            None => self.name.clone(),
        }
    }
}

impl RowKey for String {
    fn row_key(&self) -> String {
        self.clone()
    }
}

/// Outcome of [`ListView::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request was issued; the result was discarded.
    Stale,
}

/// Rows, selection and request bookkeeping for one table.
#[derive(Debug)]
pub struct ListView<Q, T> {
    query: Q,
    rows: Vec<T>,
    total: u64,
    selected: Option<String>,
    loading: bool,
    last_error: Option<String>,
    sequence: RequestSequence,
}

impl<Q: ListQuery, T: RowKey> ListView<Q, T> {
    pub fn new(query: Q) -> Self {
        Self {
            query,
            rows: Vec::new(),
            total: 0,
            selected: None,
            loading: false,
            last_error: None,
            sequence: RequestSequence::new(),
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Edit the query. Call [`ListView::begin`] afterwards to re-issue it.
    pub fn query_mut(&mut self) -> &mut Q {
        &mut self.query
    }

    /// Issue a ticket and snapshot the request to send with it.
    pub fn begin(&mut self) -> (Ticket, Q::Request) {
        self.loading = true;
        (self.sequence.issue(), self.query.request())
    }

    /// Apply `result` if `ticket` is still the latest.
    pub fn complete(&mut self, ticket: Ticket, result: ListResult<T>) -> Completion {
        if !self.sequence.is_latest(ticket) {
            tracing::debug!(ticket = ticket.value(), "discarding stale list response");
            return Completion::Stale;
        }
        self.loading = false;
        self.last_error = if result.success { None } else { result.message };
        self.total = result.total;
        self.rows = result.data;
        if let Some(key) = &self.selected {
            if !self.rows.iter().any(|row| &row.row_key() == key) {
                self.selected = None;
            }
        }
        Completion::Applied
    }

    /// Forget local row positions after a batch add, delete or edit.
    ///
    /// Rows are never patched locally. The page goes back to 1, the
    /// selection is cleared and the returned request must be re-issued.
    pub fn after_batch_mutation(&mut self) -> (Ticket, Q::Request) {
        self.query.reset_page();
        self.selected = None;
        self.begin()
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_row(&self) -> Option<&T> {
        let key = self.selected.as_ref()?;
        self.rows.iter().find(|row| &row.row_key() == key)
    }

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            self.selected = None;
            return;
        }
        let next = match self.selected_index() {
            Some(index) => (index + 1) % self.rows.len(),
            None => 0,
        };
        self.selected = Some(self.rows[next].row_key());
    }

    pub fn select_previous(&mut self) {
        if self.rows.is_empty() {
            self.selected = None;
            return;
        }
        let prev = match self.selected_index() {
            Some(0) | None => self.rows.len() - 1,
            Some(index) => index - 1,
        };
        self.selected = Some(self.rows[prev].row_key());
    }

    fn selected_index(&self) -> Option<usize> {
        let key = self.selected.as_ref()?;
        self.rows.iter().position(|row| &row.row_key() == key)
    }
}
