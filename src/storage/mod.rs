//! SQLite data-access boundary for the catalog.
//!
//! [`Database`] implements [`CategoryRepository`] and [`ContentRepository`]
//! with plain read queries; [`Database::import`] loads JSON fixtures.

mod categories;
mod import;
mod media;
mod schema;

use chrono::{DateTime, Utc};

pub use import::{Fixture, ImportError, ImportSummary};
pub use schema::Database;

use crate::catalog::{CategoryRepository, ContentRepository};
use crate::category::CategoryRecord;
use crate::content::Media;
use crate::error::DataAccessError;

impl CategoryRepository for Database {
    async fn categories(&self, now: DateTime<Utc>) -> Result<Vec<CategoryRecord>, DataAccessError> {
        self.get_category_records(now).await
    }

    async fn category_by_slug(
        &self,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CategoryRecord>, DataAccessError> {
        self.get_category_by_slug(slug, now).await
    }
}

impl ContentRepository for Database {
    async fn media_snapshot(&self) -> Result<Vec<Media>, DataAccessError> {
        self.get_media_snapshot().await
    }
}
