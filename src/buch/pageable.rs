use crate::config::SucheConfig;
use crate::error::{AppError, AppResult};

/// Pagination descriptor for the criteria search.
///
/// `size == 0` is the sentinel for "no paging": the query returns all matches
/// in default order. Otherwise the page offset is `number * size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pageable {
    pub size: i64,
    pub number: i64,
}

impl Pageable {
    /// Builds a `Pageable` from raw query values; absent fields fall back to
    /// the configured defaults, oversized pages are clamped to
    /// `max_page_size`.
    pub fn new(size: Option<i64>, number: Option<i64>, cfg: &SucheConfig) -> AppResult<Self> {
        let size = size.unwrap_or(cfg.default_page_size);
        let number = number.unwrap_or(cfg.default_page_number);
        if size < 0 {
            return Err(AppError::InvalidInput(format!("size must not be negative: {}", size)));
        }
        if number < 0 {
            return Err(AppError::InvalidInput(format!("page must not be negative: {}", number)));
        }
        let size = if size > cfg.max_page_size { cfg.max_page_size } else { size };
        Ok(Self { size, number })
    }

    pub fn unpaged(&self) -> bool {
        self.size == 0
    }

    pub fn offset(&self) -> i64 {
        self.number * self.size
    }
}
