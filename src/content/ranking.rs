use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::selector::MediaFilter;
use super::types::{Media, MediaId};
use crate::error::ValidationError;

/// Size of each list on the landing view.
pub const DEFAULT_LANDING_COUNT: usize = 5;

/// How a listing is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKey {
    /// Newest `publish_on` first.
    Latest,
    /// Highest `popularity_points` first.
    Popular,
}

impl OrderKey {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderKey::Latest => "latest",
            OrderKey::Popular => "popular",
        }
    }

    /// Total order for this key; ties fall back to ascending id.
    pub fn compare(self, a: &Media, b: &Media) -> Ordering {
        let primary = match self {
            OrderKey::Latest => b.publish_on.cmp(&a.publish_on),
            OrderKey::Popular => b.popularity_points.cmp(&a.popularity_points),
        };
        primary.then(a.id.cmp(&b.id))
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "latest" => Ok(OrderKey::Latest),
            "popular" => Ok(OrderKey::Popular),
            other => Err(ValidationError::InvalidOrder(other.to_string())),
        }
    }
}

/// Sort items by `order`, keeping the first occurrence of each id.
pub fn ordered<'a, I>(items: I, order: OrderKey) -> Vec<&'a Media>
where
    I: IntoIterator<Item = &'a Media>,
{
    let mut seen = HashSet::new();
    let mut items: Vec<&Media> = items
        .into_iter()
        .filter(|media| seen.insert(media.id))
        .collect();
    items.sort_by(|a, b| order.compare(a, b));
    items
}

/// The landing view lists. `latest` and `popular` never share an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<'a> {
    pub latest: Vec<&'a Media>,
    pub popular: Vec<&'a Media>,
}

/// Take the `n` newest items, then the `n` most popular of what remains.
///
/// Popularity is ranked over the pool with the latest items already removed,
/// so `popular` is only short when fewer than `2 * n` distinct items exist.
pub fn rank_latest_and_popular<'a, I>(items: I, n: usize) -> Ranked<'a>
where
    I: IntoIterator<Item = &'a Media>,
{
    let pool: Vec<&Media> = items.into_iter().collect();

    let mut latest = ordered(pool.iter().copied(), OrderKey::Latest);
    latest.truncate(n);

    let remaining = MediaFilter::new()
        .excluding(latest.iter().map(|media| media.id))
        .apply(pool.iter().copied());
    let mut popular = ordered(remaining, OrderKey::Popular);
    popular.truncate(n);

    tracing::trace!(
        pool = pool.len(),
        latest = latest.len(),
        popular = popular.len(),
        "Ranked landing lists"
    );

    Ranked { latest, popular }
}

impl Ranked<'_> {
    pub fn latest_ids(&self) -> Vec<MediaId> {
        self.latest.iter().map(|media| media.id).collect()
    }

    pub fn popular_ids(&self) -> Vec<MediaId> {
        self.popular.iter().map(|media| media.id).collect()
    }
}
