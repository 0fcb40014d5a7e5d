use serde::Serialize;

use super::ranking::{ordered, OrderKey};
use super::types::Media;

/// Items per page on listing views.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// One page of an ordered listing plus what a pager needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

/// Order `items` and cut out one page.
///
/// Pages are 1-based; anything below 1 is served as page 1. A page past the
/// end is empty rather than an error. A `page_size` of 0 falls back to
/// [`DEFAULT_PAGE_SIZE`].
pub fn list_page<'a, I>(items: I, order: OrderKey, page: i64, page_size: usize) -> Page<&'a Media>
where
    I: IntoIterator<Item = &'a Media>,
{
    let page_size = if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    let page = usize::try_from(page.max(1)).unwrap_or(usize::MAX);

    let all = ordered(items, order);
    let total_count = all.len();
    let total_pages = total_count.div_ceil(page_size);
    let offset = (page - 1).saturating_mul(page_size);

    let items: Vec<&Media> = all.into_iter().skip(offset).take(page_size).collect();

    Page {
        items,
        page,
        page_size,
        total_count,
        total_pages,
    }
}
