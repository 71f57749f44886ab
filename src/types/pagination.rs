//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_NUMBER, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult};

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    /// 0-based page index; page 0 is read as the first page.
    ///
    /// # Errors
    /// `BadRequest` when the page lies beyond [`MAX_PAGE_NUMBER`].
    pub fn page_index(&self) -> AppResult<u64> {
        if self.page > MAX_PAGE_NUMBER {
            return Err(AppError::BadRequest(format!(
                "page must not exceed {}",
                MAX_PAGE_NUMBER
            )));
        }
        Ok(self.page.saturating_sub(1))
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if per_page > 0 {
            total.div_ceil(per_page)
        } else {
            0
        };

        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }

    /// Convert the items, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        let params = PaginationParams {
            page: 3,
            per_page: 0,
        };
        assert_eq!(params.limit(), 1);
        assert_eq!(params.page_index().unwrap(), 2);

        let params = PaginationParams {
            page: 1,
            per_page: MAX_PAGE_SIZE + 50,
        };
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_index_bounds() {
        let first = PaginationParams {
            page: 0,
            per_page: 10,
        };
        assert_eq!(first.page_index().unwrap(), 0);

        let last = PaginationParams {
            page: MAX_PAGE_NUMBER,
            per_page: MAX_PAGE_SIZE,
        };
        let index = last.page_index().unwrap();
        assert!(index.checked_mul(last.limit()).is_some());

        let beyond = PaginationParams {
            page: u64::MAX,
            per_page: MAX_PAGE_SIZE,
        };
        assert!(matches!(beyond.page_index(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Paginated::new(vec![1, 2], 1, 10, 21);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.map(|n| n * 2).data, vec![2, 4]);
    }
}
