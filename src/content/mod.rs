//! Content selection and ordering.
//!
//! The pipeline is a chain of pure functions over a request-scoped snapshot:
//!
//! - [`selector`] - published / subtree filtering via an immutable [`MediaFilter`]
//! - [`ranking`] - ordering keys and the deduplicated latest/popular lists
//! - [`paging`] - fixed-size pages for listing views
//! - [`projection`] - size-bounded feed views
//!
//! The current time is always passed in (see [`Clock`]) so selection is
//! deterministic for a given request.

mod clock;
mod paging;
mod projection;
mod ranking;
mod selector;
mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use paging::{list_page, Page, DEFAULT_PAGE_SIZE};
pub use projection::{project_feed, FeedView, DEFAULT_FEED_LIMIT};
pub use ranking::{ordered, rank_latest_and_popular, OrderKey, Ranked, DEFAULT_LANDING_COUNT};
pub use selector::{select_in_subtree, select_published, MediaFilter};
pub use types::{Media, MediaId};
