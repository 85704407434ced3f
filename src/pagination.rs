// ABOUTME: Page-based pagination helpers shared by list endpoints
// ABOUTME: Clamps page/per_page query values and wraps result pages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! Page-based pagination for list endpoints

use crate::constants::limits;
use serde::{Deserialize, Serialize};

/// Query parameters accepted by paginated list endpoints
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Page number, 1-based
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to the configured maximum
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(limits::DEFAULT_PAGE_SIZE)
            .clamp(1, limits::MAX_PAGE_SIZE)
    }

    /// SQL OFFSET for this page
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.per_page())
    }

    /// SQL LIMIT for this page
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page())
    }
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Wrap a fetched page of items
    #[must_use]
    pub fn new(items: Vec<T>, total: i64, query: &PageQuery) -> Self {
        Self {
            items,
            total,
            page: query.page(),
            per_page: query.per_page(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamps() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.per_page(), limits::DEFAULT_PAGE_SIZE);
        assert_eq!(q.offset(), 0);

        let q = PageQuery {
            page: Some(0),
            per_page: Some(10_000),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.per_page(), limits::MAX_PAGE_SIZE);

        let q = PageQuery {
            page: Some(3),
            per_page: Some(25),
        };
        assert_eq!(q.offset(), 50);
        assert_eq!(q.limit(), 25);
    }
}
