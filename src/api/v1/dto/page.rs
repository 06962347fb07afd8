/*
 * Responsibility
 * - Pagination query parameters and the page envelope shared by list
 *   endpoints
 */
use serde::{Deserialize, Serialize};

const DEFAULT_SIZE: i64 = 20;
const MAX_SIZE: i64 = 100;

/// `?page=0&size=20`, zero-based page numbers.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PageQuery {
    pub fn number(&self) -> i64 {
        self.page.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.size.unwrap_or(DEFAULT_SIZE).clamp(1, MAX_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.number() * self.limit()
    }
}

#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, query: &PageQuery, total_elements: i64) -> Self {
        let size = query.limit();
        // Inline of `i64::div_ceil`, which is unstable (`int_roundings`).
        let total_pages = {
            let d = total_elements / size;
            let r = total_elements % size;
            if (r > 0 && size > 0) || (r < 0 && size < 0) {
                d + 1
            } else {
                d
            }
        };
        Self {
            items,
            page: query.number(),
            size,
            total_elements,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamps() {
        let q = PageQuery::default();
        assert_eq!(q.number(), 0);
        assert_eq!(q.limit(), 20);
        assert_eq!(q.offset(), 0);

        let q = PageQuery {
            page: Some(-3),
            size: Some(100_000),
        };
        assert_eq!(q.number(), 0);
        assert_eq!(q.limit(), 100);

        let q = PageQuery {
            page: Some(2),
            size: Some(25),
        };
        assert_eq!(q.offset(), 50);
    }

    #[test]
    fn total_pages_rounds_up() {
        let q = PageQuery {
            page: Some(0),
            size: Some(10),
        };
        assert_eq!(PageResponse::<i32>::new(vec![], &q, 0).total_pages, 0);
        assert_eq!(PageResponse::<i32>::new(vec![], &q, 10).total_pages, 1);
        assert_eq!(PageResponse::<i32>::new(vec![], &q, 11).total_pages, 2);
    }
}
