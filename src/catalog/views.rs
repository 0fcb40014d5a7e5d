use serde::Serialize;

use super::context::ContextSummary;
use crate::content::{FeedView, Media, OrderKey, Page};

/// Landing view: newest and most popular items of a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexView {
    pub scope: ContextSummary,
    pub latest: Vec<Media>,
    pub popular: Vec<Media>,
}

/// One page of a scope's items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingView {
    pub scope: ContextSummary,
    pub order: OrderKey,
    pub page: Page<Media>,
}

/// The newest items of a scope, titled for a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedResponse {
    pub scope: ContextSummary,
    pub feed: FeedView<Media>,
}

/// Number of media a response carries, reported to interceptors.
pub(crate) trait ItemCount {
    fn item_count(&self) -> usize;
}

impl ItemCount for IndexView {
    fn item_count(&self) -> usize {
        self.latest.len() + self.popular.len()
    }
}

impl ItemCount for ListingView {
    fn item_count(&self) -> usize {
        self.page.items.len()
    }
}

impl ItemCount for FeedResponse {
    fn item_count(&self) -> usize {
        self.feed.items.len()
    }
}
