use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::types::{Media, MediaId};
use crate::category::{Category, CategoryId, CategoryTree};

/// An immutable description of which media to keep.
///
/// Each combinator consumes the filter and returns a new one, so a filter can
/// be assembled step by step and handed around without shared mutable state.
/// Criteria are conjunctive and order-independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFilter {
    published_at: Option<DateTime<Utc>>,
    categories: Option<HashSet<CategoryId>>,
    excluded: HashSet<MediaId>,
}

impl MediaFilter {
    /// A filter that keeps everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only items published at `now`.
    pub fn published_at(self, now: DateTime<Utc>) -> Self {
        Self {
            published_at: Some(now),
            ..self
        }
    }

    /// Keep only items attached to `category` or one of its descendants.
    ///
    /// A category unknown to the tree matches only its own id.
    pub fn in_subtree(self, category: &Category, tree: &CategoryTree) -> Self {
        let ids = match tree.subtree_ids(category.id) {
            Some(ids) => ids.clone(),
            None => {
                tracing::warn!(
                    category_id = category.id,
                    "Category not present in tree, matching it alone"
                );
                HashSet::from([category.id])
            }
        };
        let categories = match self.categories {
            Some(existing) => existing.intersection(&ids).copied().collect(),
            None => ids,
        };
        Self {
            categories: Some(categories),
            ..self
        }
    }

    /// Drop the given media ids.
    pub fn excluding<I>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = MediaId>,
    {
        let mut excluded = self.excluded;
        excluded.extend(ids);
        Self { excluded, ..self }
    }

    pub fn matches(&self, media: &Media) -> bool {
        if let Some(now) = self.published_at {
            if !media.is_published_at(now) {
                return false;
            }
        }
        if let Some(ref categories) = self.categories {
            if !media.category_ids.iter().any(|id| categories.contains(id)) {
                return false;
            }
        }
        !self.excluded.contains(&media.id)
    }

    /// Apply the filter, preserving input order.
    pub fn apply<'a, I>(&self, items: I) -> Vec<&'a Media>
    where
        I: IntoIterator<Item = &'a Media>,
    {
        items.into_iter().filter(|media| self.matches(media)).collect()
    }
}

/// Items that are published at `now`.
pub fn select_published<'a, I>(items: I, now: DateTime<Utc>) -> Vec<&'a Media>
where
    I: IntoIterator<Item = &'a Media>,
{
    MediaFilter::new().published_at(now).apply(items)
}

/// Items attached to `category` or any of its descendants.
pub fn select_in_subtree<'a, I>(items: I, category: &Category, tree: &CategoryTree) -> Vec<&'a Media>
where
    I: IntoIterator<Item = &'a Media>,
{
    MediaFilter::new().in_subtree(category, tree).apply(items)
}
