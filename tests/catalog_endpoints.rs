//! Integration tests for the catalog endpoints over an in-memory repository.
//!
//! Every test pins the clock so publication cut-offs are deterministic.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use mediacat::catalog::{Catalog, MemoryCatalog, ViewOptions};
use mediacat::category::{Category, CategoryId};
use mediacat::content::{FixedClock, Media, MediaId, OrderKey};
use mediacat::error::{CatalogError, TreeError, ValidationError};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn item(id: MediaId, age_hours: i64, points: i64, categories: &[CategoryId]) -> Media {
    Media {
        id,
        title: format!("Item {id}"),
        slug: format!("item-{id}"),
        description: Some(format!("Description of item {id}")),
        publish_on: now() - Duration::hours(age_hours),
        popularity_points: points,
        published: true,
        category_ids: categories.iter().copied().collect::<BTreeSet<_>>(),
    }
}

fn categories() -> Vec<Category> {
    vec![
        Category::new(1, "Music", "music", None),
        Category::new(2, "Jazz", "jazz", Some(1)),
        Category::new(3, "Rock", "rock", Some(1)),
        Category::new(4, "Video", "video", None),
    ]
}

fn catalog(media: Vec<Media>) -> Catalog<MemoryCatalog> {
    Catalog::new(MemoryCatalog::new(categories(), media)).with_clock(FixedClock(now()))
}

fn ids(items: &[Media]) -> Vec<MediaId> {
    items.iter().map(|m| m.id).collect()
}

// ============================================================================
// Paging
// ============================================================================

#[tokio::test]
async fn test_more_pages_forty_five_items() {
    let media: Vec<Media> = (1..=45).map(|id| item(id, id, 0, &[2])).collect();
    let catalog = catalog(media);

    let mut sizes = Vec::new();
    for page in 1..=4 {
        let view = catalog.more("jazz", OrderKey::Latest, page).await.unwrap();
        assert_eq!(view.page.total_count, 45);
        assert_eq!(view.page.total_pages, 3);
        sizes.push(view.page.items.len());
    }
    assert_eq!(sizes, vec![20, 20, 5, 0]);

    let third = catalog.more("jazz", OrderKey::Latest, 3).await.unwrap();
    assert_eq!(ids(&third.page.items), (41..=45).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_more_nonpositive_page_is_first_page() {
    let media: Vec<Media> = (1..=25).map(|id| item(id, id, id, &[2])).collect();
    let catalog = catalog(media);

    let first = catalog.more("jazz", OrderKey::Popular, 1).await.unwrap();
    let zero = catalog.more("jazz", OrderKey::Popular, 0).await.unwrap();
    let negative = catalog.more("jazz", OrderKey::Popular, -3).await.unwrap();

    assert_eq!(zero.page.page, 1);
    assert_eq!(ids(&zero.page.items), ids(&first.page.items));
    assert_eq!(ids(&negative.page.items), ids(&first.page.items));
    assert_eq!(first.page.items[0].id, 25);
}

#[tokio::test]
async fn test_more_includes_descendants() {
    let media = vec![
        item(1, 1, 0, &[1]),
        item(2, 2, 0, &[2]),
        item(3, 3, 0, &[3]),
        item(4, 4, 0, &[4]),
    ];
    let view = catalog(media).more("music", OrderKey::Latest, 1).await.unwrap();
    assert_eq!(ids(&view.page.items), vec![1, 2, 3]);
}

// ============================================================================
// Feed
// ============================================================================

#[tokio::test]
async fn test_feed_limit_over_thirty_items() {
    let media: Vec<Media> = (1..=30).map(|id| item(id, id, 0, &[3])).collect();
    let catalog = catalog(media);

    let view = catalog.feed(Some("rock"), Some("5")).await.unwrap();
    assert_eq!(ids(&view.feed.items), vec![1, 2, 3, 4, 5]);
    assert_eq!(view.feed.title, "Rock Media");

    let all = catalog.feed(None, None).await.unwrap();
    assert_eq!(all.feed.items.len(), 30);
    assert_eq!(all.feed.title, "All Media");
}

#[tokio::test]
async fn test_feed_limit_clamped_to_max() {
    let media: Vec<Media> = (1..=30).map(|id| item(id, id, 0, &[4])).collect();
    let catalog = catalog(media).with_options(ViewOptions {
        feed_max_limit: 10,
        ..ViewOptions::default()
    });

    let view = catalog.feed(Some("video"), Some("500")).await.unwrap();
    assert_eq!(view.feed.items.len(), 10);
}

#[tokio::test]
async fn test_feed_rejects_bad_limits() {
    let catalog = catalog(vec![item(1, 1, 0, &[1])]);
    for raw in ["0", "-4", "ten"] {
        let err = catalog.feed(None, Some(raw)).await.unwrap_err();
        assert!(
            matches!(err, CatalogError::Validation(ValidationError::InvalidLimit(_))),
            "limit {raw:?} gave {err:?}"
        );
    }
}

// ============================================================================
// Landing view
// ============================================================================

#[tokio::test]
async fn test_index_six_items_leave_one_popular() {
    let media: Vec<Media> = (1..=6).map(|id| item(id, id, 100 - id, &[2])).collect();
    let view = catalog(media).index(Some("jazz")).await.unwrap();

    assert_eq!(ids(&view.latest), vec![1, 2, 3, 4, 5]);
    assert_eq!(ids(&view.popular), vec![6]);
}

#[tokio::test]
async fn test_index_lists_are_full_and_disjoint() {
    let media: Vec<Media> = (1..=14)
        .map(|id| item(id, id, (id * 7) % 11, &[if id % 2 == 0 { 2 } else { 3 }]))
        .collect();
    let view = catalog(media).index(Some("music")).await.unwrap();

    assert_eq!(view.latest.len(), 5);
    assert_eq!(view.popular.len(), 5);
    let latest: HashSet<_> = ids(&view.latest).into_iter().collect();
    let popular: HashSet<_> = ids(&view.popular).into_iter().collect();
    assert!(latest.is_disjoint(&popular));
}

#[tokio::test]
async fn test_index_skips_unpublished_and_future_items() {
    let mut draft = item(1, 1, 50, &[2]);
    draft.published = false;
    let scheduled = item(2, -24, 60, &[2]);
    let live = item(3, 5, 10, &[2]);

    let view = catalog(vec![draft, scheduled, live]).index(None).await.unwrap();
    assert_eq!(ids(&view.latest), vec![3]);
    assert!(view.popular.is_empty());

    let counts: Vec<_> = view
        .scope
        .sidebar
        .iter()
        .map(|entry| (entry.slug.as_str(), entry.depth, entry.count))
        .collect();
    assert_eq!(
        counts,
        vec![("music", 0, 1), ("jazz", 1, 1), ("rock", 1, 0), ("video", 0, 0)]
    );
}

#[tokio::test]
async fn test_index_breadcrumb_for_nested_scope() {
    let view = catalog(Vec::new()).index(Some("jazz")).await.unwrap();
    let crumbs: Vec<_> = view.scope.breadcrumb.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(crumbs, vec!["music", "jazz"]);
    assert_eq!(view.scope.category.map(|c| c.id), Some(2));
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
    let catalog = catalog(vec![item(1, 1, 0, &[1])]);

    let index = catalog.index(Some("polka")).await.unwrap_err();
    let more = catalog.more("polka", OrderKey::Latest, 1).await.unwrap_err();
    let feed = catalog.feed(Some("polka"), None).await.unwrap_err();

    for err in [index, more, feed] {
        assert!(matches!(err, CatalogError::NotFound(ref slug) if slug == "polka"));
        assert!(err.is_not_found());
    }
}

#[tokio::test]
async fn test_dangling_parent_is_integrity_error() {
    let mut broken = categories();
    broken.push(Category::new(5, "Orphan", "orphan", Some(99)));
    let catalog = Catalog::new(MemoryCatalog::new(broken, Vec::new()));

    let err = catalog.index(None).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Integrity(TreeError::DanglingParent { id: 5, parent_id: 99 })
    ));
}

#[tokio::test]
async fn test_cycle_is_integrity_error() {
    let looped = vec![
        Category::new(1, "Music", "music", None),
        Category::new(2, "A", "a", Some(3)),
        Category::new(3, "B", "b", Some(2)),
    ];
    let catalog = Catalog::new(MemoryCatalog::new(looped, Vec::new()));

    let err = catalog.feed(Some("music"), None).await.unwrap_err();
    assert!(matches!(err, CatalogError::Integrity(TreeError::Cycle { .. })));
}
