use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::category::{aggregate_counts, leaf_counts, Category, CategoryId, CategoryRecord, CategoryTree};
use crate::content::MediaFilter;
use crate::error::CatalogError;

/// Everything an endpoint knows about the category side of a request.
///
/// Built once per call and passed down explicitly; nothing here outlives the
/// request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub now: DateTime<Utc>,
    pub tree: CategoryTree,
    /// Subtree-inclusive published counts for every category.
    pub counts: HashMap<CategoryId, u64>,
    /// The category the request is scoped to, if any.
    pub category: Option<Category>,
    /// Root-to-category path, empty when unscoped.
    pub breadcrumb: Vec<Category>,
}

/// One row of the category sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub depth: usize,
    pub count: u64,
}

/// The renderable part of a [`RequestContext`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSummary {
    pub category: Option<Category>,
    pub breadcrumb: Vec<Category>,
    pub sidebar: Vec<SidebarEntry>,
}

impl RequestContext {
    /// Build the tree and counts from repository records and resolve `slug`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Integrity`] when the records do not form a forest
    /// - [`CatalogError::NotFound`] when `slug` names no category
    pub fn build(
        records: Vec<CategoryRecord>,
        slug: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, CatalogError> {
        let leaves = leaf_counts(&records);
        let tree = CategoryTree::build(records.into_iter().map(|record| record.category))?;
        let counts = aggregate_counts(&tree, &leaves);

        let category = match slug {
            Some(slug) => Some(tree.find(slug)?.clone()),
            None => None,
        };
        let breadcrumb = category
            .as_ref()
            .map(|c| tree.breadcrumb(c.id).into_iter().cloned().collect())
            .unwrap_or_default();

        Ok(Self {
            now,
            tree,
            counts,
            category,
            breadcrumb,
        })
    }

    pub fn slug(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.slug.as_str())
    }

    pub fn count(&self, id: CategoryId) -> u64 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Published items, limited to the scoped subtree when there is one.
    pub fn scope_filter(&self) -> MediaFilter {
        let filter = MediaFilter::new().published_at(self.now);
        match &self.category {
            Some(category) => filter.in_subtree(category, &self.tree),
            None => filter,
        }
    }

    /// "<name> Media", or "All Media" when unscoped.
    pub fn feed_title(&self) -> String {
        match &self.category {
            Some(category) => format!("{} Media", category.name),
            None => "All Media".to_string(),
        }
    }

    /// The full tree in display order with rolled-up counts.
    pub fn sidebar(&self) -> Vec<SidebarEntry> {
        self.tree
            .traverse()
            .map(|(category, depth)| SidebarEntry {
                id: category.id,
                name: category.name.clone(),
                slug: category.slug.clone(),
                depth,
                count: self.count(category.id),
            })
            .collect()
    }

    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            category: self.category.clone(),
            breadcrumb: self.breadcrumb.clone(),
            sidebar: self.sidebar(),
        }
    }
}
