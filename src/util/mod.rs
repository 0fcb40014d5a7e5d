//! Request parameter validation and text helpers.
//!
//! - **Parameters**: feed limits, page numbers, order keys and slugs arrive as
//!   raw strings and are checked before any selection work starts
//! - **Text**: control-character stripping for names read from fixtures
//!
//! # Examples
//!
//! ```
//! use mediacat::util::{validate_limit, validate_page};
//!
//! assert_eq!(validate_limit(None, 30, 100).unwrap(), 30);
//! assert_eq!(validate_limit(Some("500"), 30, 100).unwrap(), 100);
//! assert_eq!(validate_page(Some("0")).unwrap(), 1);
//! ```

mod params;
mod text;

pub use params::{validate_limit, validate_order, validate_page, validate_slug};
pub use text::sanitize_name;

/// Maximum accepted slug length
pub const MAX_SLUG_LENGTH: usize = 128;
