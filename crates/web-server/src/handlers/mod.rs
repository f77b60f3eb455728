use serde::Serialize;

pub mod adoptions;
pub mod auth;
pub mod candidates;
pub mod pets;

/// The resolved page window for a list query: the caller's `page`/`limit`
/// reconciled with the configured defaults and ceiling.
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    page: u32,
    limit: u32,
}

impl PageWindow {
    pub fn resolve(
        page: Option<u32>,
        limit: Option<u32>,
        bounds: &configuration::Pagination,
    ) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(bounds.default_limit)
            .clamp(1, bounds.max_limit);
        Self { page, limit }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// Wraps one page of results in the pagination envelope every list
    /// endpoint responds with.
    pub fn paginate<T>(&self, data: Vec<T>, total_count: i64) -> Paginated<T> {
        let total_pages = (total_count + self.limit() - 1) / self.limit();
        Paginated {
            data,
            pagination: PageInfo {
                current_page: self.page,
                total_pages,
                total_count,
                has_next_page: i64::from(self.page) < total_pages,
                has_prev_page: self.page > 1,
                limit: self.limit,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: i64,
    pub total_count: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> configuration::Pagination {
        configuration::Pagination {
            default_limit: 10,
            max_limit: 50,
        }
    }

    #[test]
    fn missing_parameters_fall_back_to_the_defaults() {
        let window = PageWindow::resolve(None, None, &bounds());
        assert_eq!(window.limit(), 10);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn oversized_and_zero_limits_are_clamped() {
        assert_eq!(PageWindow::resolve(None, Some(500), &bounds()).limit(), 50);
        assert_eq!(PageWindow::resolve(None, Some(0), &bounds()).limit(), 1);
        assert_eq!(PageWindow::resolve(Some(0), None, &bounds()).offset(), 0);
    }

    #[test]
    fn the_envelope_reports_position_within_the_result_set() {
        let window = PageWindow::resolve(Some(2), Some(10), &bounds());
        assert_eq!(window.offset(), 10);

        let page = window.paginate(vec![(); 10], 25);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.total_count, 25);
        assert!(page.pagination.has_next_page);
        assert!(page.pagination.has_prev_page);
    }

    #[test]
    fn an_empty_result_set_has_no_pages_in_either_direction() {
        let window = PageWindow::resolve(None, None, &bounds());
        let page = window.paginate(Vec::<()>::new(), 0);
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_next_page);
        assert!(!page.pagination.has_prev_page);
    }
}
