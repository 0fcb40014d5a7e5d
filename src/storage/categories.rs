use chrono::{DateTime, Utc};

use super::schema::Database;
use crate::category::{Category, CategoryRecord};
use crate::error::DataAccessError;

/// Row type for the category query with its leaf count
type CategoryRow = (i64, String, String, Option<i64>, i64);

const CATEGORY_COLUMNS: &str = r#"
    SELECT c.id, c.name, c.slug, c.parent_id,
           (SELECT COUNT(*)
              FROM media_categories mc
              JOIN media m ON m.id = mc.media_id
             WHERE mc.category_id = c.id
               AND m.published = 1
               AND m.publish_on <= ?) AS leaf_count
    FROM categories c
"#;

impl Database {
    // ========================================================================
    // Category Queries
    // ========================================================================

    /// All categories ordered by name, each with the number of media attached
    /// directly to it that are published at `now`.
    pub async fn get_category_records(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<CategoryRecord>, DataAccessError> {
        let sql = format!("{CATEGORY_COLUMNS} ORDER BY c.name, c.id");
        let rows: Vec<CategoryRow> = sqlx::query_as(&sql)
            .bind(now.timestamp_millis())
            .fetch_all(&self.pool)
            .await
            .map_err(DataAccessError::from_sqlx)?;

        Ok(rows.into_iter().map(into_record).collect())
    }

    /// A single category by slug, with its leaf count at `now`.
    pub async fn get_category_by_slug(
        &self,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CategoryRecord>, DataAccessError> {
        let sql = format!("{CATEGORY_COLUMNS} WHERE c.slug = ?");
        let row: Option<CategoryRow> = sqlx::query_as(&sql)
            .bind(now.timestamp_millis())
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(DataAccessError::from_sqlx)?;

        Ok(row.map(into_record))
    }
}

fn into_record((id, name, slug, parent_id, leaf_count): CategoryRow) -> CategoryRecord {
    CategoryRecord::new(
        Category {
            id,
            name,
            slug,
            parent_id,
        },
        u64::try_from(leaf_count).unwrap_or(0),
    )
}
