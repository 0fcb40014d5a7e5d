use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schema::Database;
use crate::category::Category;
use crate::content::Media;
use crate::error::{DataAccessError, ValidationError};
use crate::util::{sanitize_name, validate_slug};

/// Categories and media loaded together, as read from a JSON fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub media: Vec<Media>,
}

/// Rows written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories: usize,
    pub media: usize,
    pub links: usize,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid fixture: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

impl Database {
    // ========================================================================
    // Import
    // ========================================================================

    /// Upsert a fixture in one transaction.
    ///
    /// Names and titles are sanitized and slugs validated before anything is
    /// written. Parent ids are stored as given; hierarchy problems surface
    /// when the tree is built. A media item's links are replaced wholesale.
    pub async fn import(&self, fixture: &Fixture) -> Result<ImportSummary, ImportError> {
        let mut categories = Vec::with_capacity(fixture.categories.len());
        for category in &fixture.categories {
            validate_slug(&category.slug)?;
            categories.push(Category {
                name: sanitize_name(&category.name)?,
                ..category.clone()
            });
        }

        let mut media = Vec::with_capacity(fixture.media.len());
        for item in &fixture.media {
            validate_slug(&item.slug)?;
            media.push(Media {
                title: sanitize_name(&item.title)?,
                ..item.clone()
            });
        }

        let summary = self
            .write_fixture(&categories, &media)
            .await
            .map_err(DataAccessError::from_sqlx)?;

        tracing::info!(
            categories = summary.categories,
            media = summary.media,
            links = summary.links,
            "Imported fixture"
        );
        Ok(summary)
    }

    async fn write_fixture(
        &self,
        categories: &[Category],
        media: &[Media],
    ) -> Result<ImportSummary, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut summary = ImportSummary::default();

        for category in categories {
            sqlx::query(
                "INSERT INTO categories (id, name, slug, parent_id) VALUES (?, ?, ?, ?) \
                 ON CONFLICT(id) DO UPDATE SET \
                 name = excluded.name, slug = excluded.slug, parent_id = excluded.parent_id",
            )
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(category.parent_id)
            .execute(&mut *tx)
            .await?;
            summary.categories += 1;
        }

        for item in media {
            sqlx::query(
                "INSERT INTO media (id, title, slug, description, publish_on, popularity_points, published) \
                 VALUES (?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(id) DO UPDATE SET \
                 title = excluded.title, slug = excluded.slug, description = excluded.description, \
                 publish_on = excluded.publish_on, popularity_points = excluded.popularity_points, \
                 published = excluded.published",
            )
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.slug)
            .bind(&item.description)
            .bind(item.publish_on.timestamp_millis())
            .bind(item.popularity_points)
            .bind(item.published)
            .execute(&mut *tx)
            .await?;
            summary.media += 1;

            sqlx::query("DELETE FROM media_categories WHERE media_id = ?")
                .bind(item.id)
                .execute(&mut *tx)
                .await?;
            for &category_id in &item.category_ids {
                sqlx::query("INSERT INTO media_categories (media_id, category_id) VALUES (?, ?)")
                    .bind(item.id)
                    .bind(category_id)
                    .execute(&mut *tx)
                    .await?;
                summary.links += 1;
            }
        }

        tx.commit().await?;
        Ok(summary)
    }
}
