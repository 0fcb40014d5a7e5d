use std::collections::{BTreeSet, HashMap};

use chrono::DateTime;

use super::schema::Database;
use crate::content::Media;
use crate::error::DataAccessError;

/// Internal row type for media queries (used by sqlx FromRow).
/// Converts to Media via into_media() once category links are known.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MediaDbRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    /// Unix milliseconds.
    pub publish_on: i64,
    pub popularity_points: i64,
    pub published: bool,
}

impl MediaDbRow {
    pub(crate) fn into_media(self, category_ids: BTreeSet<i64>) -> Result<Media, DataAccessError> {
        let publish_on = DateTime::from_timestamp_millis(self.publish_on).ok_or_else(|| {
            DataAccessError::Corrupt(format!(
                "media {} has out-of-range publish_on {}",
                self.id, self.publish_on
            ))
        })?;
        Ok(Media {
            id: self.id,
            title: self.title,
            slug: self.slug,
            description: self.description,
            publish_on,
            popularity_points: self.popularity_points,
            published: self.published,
            category_ids,
        })
    }
}

impl Database {
    // ========================================================================
    // Media Queries
    // ========================================================================

    /// Every media row with its category links, in id order.
    ///
    /// No publication filtering happens here; selection is done by the caller
    /// against its own clock.
    pub async fn get_media_snapshot(&self) -> Result<Vec<Media>, DataAccessError> {
        let rows: Vec<MediaDbRow> = sqlx::query_as(
            "SELECT id, title, slug, description, publish_on, popularity_points, published \
             FROM media ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DataAccessError::from_sqlx)?;

        let links: Vec<(i64, i64)> =
            sqlx::query_as("SELECT media_id, category_id FROM media_categories")
                .fetch_all(&self.pool)
                .await
                .map_err(DataAccessError::from_sqlx)?;

        let mut by_media: HashMap<i64, BTreeSet<i64>> = HashMap::new();
        for (media_id, category_id) in links {
            by_media.entry(media_id).or_default().insert(category_id);
        }

        rows.into_iter()
            .map(|row| {
                let category_ids = by_media.remove(&row.id).unwrap_or_default();
                row.into_media(category_ids)
            })
            .collect()
    }
}
