//! Page-number pagination for catalog listings

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A requested page (1-based) of fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(number: i64, page_size: i64) -> Self {
        Self { number, page_size }
    }

    /// Parse the raw `?page=` query value. A missing value means the first page.
    pub fn parse(raw: Option<&str>, page_size: i64) -> AppResult<Self> {
        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some(value) => value.parse::<i64>().map_err(|_| {
                AppError::NotFound("Page is not a number".to_string())
            })?,
        };

        if number < 1 {
            return Err(AppError::NotFound("Page number is less than 1".to_string()));
        }

        Ok(Self::new(number, page_size))
    }

    /// Reject page numbers past the last page. An empty first page is allowed.
    pub fn check(&self, total: i64) -> AppResult<()> {
        let num_pages = num_pages(total, self.page_size);
        if self.number > num_pages {
            return Err(AppError::NotFound(format!(
                "Page {} does not exist ({} pages)",
                self.number, num_pages
            )));
        }
        Ok(())
    }

    /// SQL OFFSET value
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.page_size
    }

    /// SQL LIMIT value
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Number of pages for `total` rows; never less than one.
pub fn num_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 1;
    }
    (total + page_size - 1) / page_size
}

/// Navigation data for the current page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: i64,
    pub num_pages: i64,
    /// Total number of rows across all pages
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<i64>,
    pub previous_page_number: Option<i64>,
}

/// One page of a listing, shaped as a list view context
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub page_obj: PageInfo,
    pub is_paginated: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        let num_pages = num_pages(total, request.page_size);
        let has_next = request.number < num_pages;
        let has_previous = request.number > 1;

        Self {
            object_list: items,
            page_obj: PageInfo {
                number: request.number,
                num_pages,
                count: total,
                has_next,
                has_previous,
                next_page_number: has_next.then_some(request.number + 1),
                previous_page_number: has_previous.then_some(request.number - 1),
            },
            is_paginated: num_pages > 1,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page_obj.has_next
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            page_obj: self.page_obj,
            is_paginated: self.is_paginated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_first_page() {
        let request = PageRequest::parse(None, 4).unwrap();
        assert_eq!(request.number, 1);
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), 4);

        assert_eq!(PageRequest::parse(Some(""), 4).unwrap().number, 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(PageRequest::parse(Some("abc"), 4), Err(AppError::NotFound(_))));
        assert!(matches!(PageRequest::parse(Some("0"), 4), Err(AppError::NotFound(_))));
        assert!(matches!(PageRequest::parse(Some("-2"), 4), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_num_pages() {
        assert_eq!(num_pages(0, 4), 1);
        assert_eq!(num_pages(4, 4), 1);
        assert_eq!(num_pages(5, 4), 2);
        assert_eq!(num_pages(21, 10), 3);
    }

    #[test]
    fn test_check_out_of_range() {
        assert!(PageRequest::new(1, 4).check(0).is_ok());
        assert!(PageRequest::new(2, 4).check(5).is_ok());
        assert!(PageRequest::new(3, 4).check(8).is_err());
    }

    #[test]
    fn test_page_navigation() {
        let page = Page::new(vec![1, 2, 3, 4], 9, PageRequest::new(1, 4));
        assert!(page.is_paginated);
        assert!(page.has_next());
        assert!(!page.page_obj.has_previous);
        assert_eq!(page.page_obj.next_page_number, Some(2));
        assert_eq!(page.page_obj.previous_page_number, None);

        let last = Page::new(vec![9], 9, PageRequest::new(3, 4));
        assert!(!last.has_next());
        assert_eq!(last.page_obj.previous_page_number, Some(2));
    }

    #[test]
    fn test_single_page_is_not_paginated() {
        let page = Page::new(vec![1, 2], 2, PageRequest::new(1, 4));
        assert!(!page.is_paginated);
        assert!(!page.has_next());
    }

    #[test]
    fn test_walking_pages_covers_every_row_once() {
        let rows: Vec<i32> = (0..11).collect();
        let mut seen = Vec::new();
        let mut request = PageRequest::new(1, 4);

        loop {
            request.check(rows.len() as i64).unwrap();
            let slice = rows
                .iter()
                .copied()
                .skip(request.offset() as usize)
                .take(request.limit() as usize)
                .collect();
            let page = Page::new(slice, rows.len() as i64, request);
            seen.extend(page.object_list.iter().copied());
            match page.page_obj.next_page_number {
                Some(next) => request = PageRequest::new(next, 4),
                None => break,
            }
        }

        assert_eq!(seen, rows);
    }

    #[test]
    fn test_map() {
        let page = Page::new(vec![1, 2], 2, PageRequest::new(1, 4)).map(|x| x * 10);
        assert_eq!(page.object_list, vec![10, 20]);
        assert_eq!(page.page_obj.count, 2);
    }
}
