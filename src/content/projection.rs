use serde::Serialize;

use super::ranking::{ordered, OrderKey};
use super::types::Media;

/// Feed size when the caller does not ask for one.
pub const DEFAULT_FEED_LIMIT: usize = 30;

/// The newest items of a scope, ready for feed rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedView<T> {
    pub title: String,
    pub items: Vec<T>,
}

/// Newest first, cut to `limit`. A limit of 0 or less means [`DEFAULT_FEED_LIMIT`].
///
/// The limit is trusted otherwise; clamping belongs to the caller's validator.
pub fn project_feed<'a, I>(items: I, limit: i64, title: impl Into<String>) -> FeedView<&'a Media>
where
    I: IntoIterator<Item = &'a Media>,
{
    let limit = if limit <= 0 {
        DEFAULT_FEED_LIMIT
    } else {
        usize::try_from(limit).unwrap_or(usize::MAX)
    };

    let mut items = ordered(items, OrderKey::Latest);
    items.truncate(limit);

    FeedView {
        title: title.into(),
        items,
    }
}
