//! A hierarchical media catalog.
//!
//! Categories form a forest ([`category::CategoryTree`]); media items belong
//! to any number of categories. The [`catalog::Catalog`] service answers the
//! landing (`index`), paged listing (`more`) and `feed` views for a whole
//! catalog or for one category subtree.

pub mod catalog;
pub mod category;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod storage;
pub mod util;
