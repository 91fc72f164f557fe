//! Pagination parameters. Pages are 1-based.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound the service accepts for one page.
pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
    pub page: u32,
    pub page_size: u32,
    /// Ignore paging and return every row, subject to the service's row cap.
    #[serde(default)]
    pub all: bool,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            all: false,
        }
    }
}

impl PaginationRequest {
    /// Build from raw UI input. `page < 1` becomes 1, `page_size < 1` becomes
    /// the default, and sizes above [`MAX_PAGE_SIZE`] are capped.
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: clamp_page(page),
            page_size: clamp_page_size(page_size, MAX_PAGE_SIZE),
            all: false,
        }
    }

    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// Cap the page size at a caller-configured limit below the service maximum.
    pub fn capped(self, max_page_size: u32) -> Self {
        Self {
            page_size: self.page_size.min(max_page_size.clamp(1, MAX_PAGE_SIZE)),
            ..self
        }
    }

    pub fn with_page(self, page: i64) -> Self {
        Self {
            page: clamp_page(page),
            ..self
        }
    }

    /// Zero-based row offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.all {
            return Ok(());
        }
        if self.page < 1 {
            return Err(ValidationError::invalid("page", "must be >= 1"));
        }
        if self.page_size < 1 {
            return Err(ValidationError::invalid("pageSize", "must be >= 1"));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::invalid(
                "pageSize",
                format!("must be <= {}", MAX_PAGE_SIZE),
            ));
        }
        Ok(())
    }
}

fn clamp_page(page: i64) -> u32 {
    page.clamp(1, i64::from(u32::MAX)) as u32
}

fn clamp_page_size(page_size: i64, max: u32) -> u32 {
    if page_size < 1 {
        DEFAULT_PAGE_SIZE.min(max)
    } else {
        page_size.min(i64::from(max)) as u32
    }
}

/// `ceil(total / page_size)`, or 0 when `page_size` is 0.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}
