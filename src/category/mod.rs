//! Category taxonomy: records, the traversable tree, and rolled-up counts.
//!
//! - [`tree`] - builds a [`CategoryTree`] from flat parent-linked records
//! - [`counts`] - propagates per-category leaf counts to every ancestor
//!
//! # Example
//!
//! ```
//! use mediacat::category::{aggregate_counts, Category, CategoryTree};
//! use std::collections::HashMap;
//!
//! let tree = CategoryTree::build(vec![
//!     Category::new(1, "Music", "music", None),
//!     Category::new(2, "Jazz", "jazz", Some(1)),
//! ])
//! .unwrap();
//!
//! let counts = aggregate_counts(&tree, &HashMap::from([(1, 2), (2, 3)]));
//! assert_eq!(counts[&1], 5);
//! ```

mod counts;
mod tree;
mod types;

pub use counts::{aggregate_counts, leaf_counts};
pub use tree::{CategoryTree, Traverse};
pub use types::{Category, CategoryId, CategoryRecord};
