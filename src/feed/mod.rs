//! Feed rendering for the catalog's feed view.
//!
//! - [`render_mrss`] - RSS 2.0 with the Media RSS namespace, written with `quick-xml`

mod mrss;

pub use mrss::render_mrss;
