//! The catalog endpoints and their request-scoped plumbing.
//!
//! A [`Catalog`] answers three read operations over a category subtree:
//!
//! - `index` - top latest and top popular items, never overlapping
//! - `more` - one ordered page of items
//! - `feed` - the newest items, bounded, for feed rendering
//!
//! Each call loads a fresh [`RequestContext`] (tree, rolled-up counts,
//! resolved category and breadcrumb) from the repository, then runs the pure
//! selection and ranking functions from [`crate::content`]. Cross-cutting
//! concerns attach through [`Interceptor`]s and [`Hooks`] rather than living
//! inside the endpoints.

mod context;
mod hooks;
mod repository;
mod service;
mod views;

pub use context::{ContextSummary, RequestContext, SidebarEntry};
pub use hooks::{
    Endpoint, ExtensionPoint, HookEvent, Hooks, Interceptor, Invocation, Outcome,
    TracingInterceptor,
};
pub use repository::{
    AllVisible, CategoryRepository, ContentRepository, MemoryCatalog, Settings, VisibilityFilter,
};
pub use service::{Catalog, ViewOptions};
pub use views::{FeedResponse, IndexView, ListingView};
