use serde::{Deserialize, Serialize};

/// Identifier of a category.
pub type CategoryId = i64;

/// A node in the content taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Display name, also the sort key among siblings.
    pub name: String,
    /// Unique, URL-safe identifier used for lookup.
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

impl Category {
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        slug: impl Into<String>,
        parent_id: Option<CategoryId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            parent_id,
        }
    }
}

/// A category as supplied by a repository, with the number of currently
/// published items attached directly to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    #[serde(flatten)]
    pub category: Category,
    #[serde(default)]
    pub leaf_count: u64,
}

impl CategoryRecord {
    pub fn new(category: Category, leaf_count: u64) -> Self {
        Self {
            category,
            leaf_count,
        }
    }
}
