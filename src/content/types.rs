use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::CategoryId;

/// Identifier of a media item.
pub type MediaId = i64;

/// A content item as read from the content repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: MediaId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    /// May lie in the future; such items are not yet published.
    pub publish_on: DateTime<Utc>,
    #[serde(default)]
    pub popularity_points: i64,
    pub published: bool,
    #[serde(default)]
    pub category_ids: BTreeSet<CategoryId>,
}

impl Media {
    /// Published means flagged as published and not scheduled past `now`.
    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        self.published && self.publish_on <= now
    }
}
