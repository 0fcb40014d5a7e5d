//! Contracts for the collaborators the catalog reads from.
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::category::{Category, CategoryId, CategoryRecord};
use crate::content::Media;
use crate::error::DataAccessError;

/// Supplies the flat category set for a request.
#[allow(async_fn_in_trait)]
pub trait CategoryRepository {
    /// Every category with its count of items published at `now`.
    async fn categories(&self, now: DateTime<Utc>) -> Result<Vec<CategoryRecord>, DataAccessError>;

    /// One category by slug, `None` when no category carries it.
    async fn category_by_slug(
        &self,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CategoryRecord>, DataAccessError> {
        Ok(self
            .categories(now)
            .await?
            .into_iter()
            .find(|record| record.category.slug == slug))
    }
}

/// Supplies the content snapshot for a request.
#[allow(async_fn_in_trait)]
pub trait ContentRepository {
    /// All media with their category associations, published or not.
    async fn media_snapshot(&self) -> Result<Vec<Media>, DataAccessError>;
}

/// Permission-based culling applied after scope selection.
pub trait VisibilityFilter: Send + Sync {
    fn is_visible(&self, media: &Media) -> bool;
}

/// Lets every item through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllVisible;

impl VisibilityFilter for AllVisible {
    fn is_visible(&self, _media: &Media) -> bool {
        true
    }
}

impl<F> VisibilityFilter for F
where
    F: Fn(&Media) -> bool + Send + Sync,
{
    fn is_visible(&self, media: &Media) -> bool {
        self(media)
    }
}

/// Feature switches read per request.
pub trait Settings: Send + Sync {
    fn feed_enabled(&self) -> bool;
}

// ============================================================================
// In-memory repository
// ============================================================================

/// A repository over owned vectors, used for fixtures and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    categories: Vec<Category>,
    media: Vec<Media>,
    unavailable: Option<String>,
}

impl MemoryCatalog {
    pub fn new(categories: Vec<Category>, media: Vec<Media>) -> Self {
        Self {
            categories,
            media,
            unavailable: None,
        }
    }

    /// A repository whose every call fails with [`DataAccessError::Unavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), DataAccessError> {
        match &self.unavailable {
            Some(reason) => Err(DataAccessError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl CategoryRepository for MemoryCatalog {
    async fn categories(&self, now: DateTime<Utc>) -> Result<Vec<CategoryRecord>, DataAccessError> {
        self.check()?;

        let mut leaf: HashMap<CategoryId, u64> = HashMap::new();
        for media in self.media.iter().filter(|m| m.is_published_at(now)) {
            for &id in &media.category_ids {
                *leaf.entry(id).or_default() += 1;
            }
        }

        let mut records: Vec<CategoryRecord> = self
            .categories
            .iter()
            .map(|category| {
                CategoryRecord::new(
                    category.clone(),
                    leaf.get(&category.id).copied().unwrap_or(0),
                )
            })
            .collect();
        records.sort_by(|a, b| a.category.name.cmp(&b.category.name));
        Ok(records)
    }
}

impl ContentRepository for MemoryCatalog {
    async fn media_snapshot(&self) -> Result<Vec<Media>, DataAccessError> {
        self.check()?;
        Ok(self.media.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::{in_categories, media, now};

    #[tokio::test]
    async fn test_memory_leaf_counts_only_published() {
        let mut draft = in_categories(media(2, 1, 0), &[1]);
        draft.published = false;
        let repo = MemoryCatalog::new(
            vec![
                Category::new(1, "Music", "music", None),
                Category::new(2, "Jazz", "jazz", Some(1)),
            ],
            vec![
                in_categories(media(1, 1, 0), &[1, 2]),
                draft,
                in_categories(media(3, 1, 0), &[2]),
            ],
        );

        let records = repo.categories(now()).await.unwrap();
        // Sorted by name
        assert_eq!(records[0].category.slug, "jazz");
        assert_eq!(records[0].leaf_count, 2);
        assert_eq!(records[1].category.slug, "music");
        assert_eq!(records[1].leaf_count, 1);
    }

    #[tokio::test]
    async fn test_unavailable_repository_fails() {
        let repo = MemoryCatalog::unavailable("connection refused");
        assert!(matches!(
            repo.categories(now()).await,
            Err(DataAccessError::Unavailable(_))
        ));
        assert!(repo.media_snapshot().await.is_err());
    }

    #[tokio::test]
    async fn test_category_by_slug_default() {
        let repo = MemoryCatalog::new(
            vec![Category::new(1, "Music", "music", None)],
            vec![in_categories(media(1, 1, 0), &[1])],
        );
        let record = repo.category_by_slug("music", now()).await.unwrap().unwrap();
        assert_eq!(record.leaf_count, 1);
        assert!(repo.category_by_slug("video", now()).await.unwrap().is_none());
    }

    #[test]
    fn test_closure_visibility_filter() {
        let only_even = |m: &Media| m.id % 2 == 0;
        assert!(only_even.is_visible(&media(2, 1, 0)));
        assert!(!only_even.is_visible(&media(3, 1, 0)));
        assert!(AllVisible.is_visible(&media(3, 1, 0)));
    }
}
