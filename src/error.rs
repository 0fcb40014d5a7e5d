//! Error taxonomy shared by the category tree, the selectors and the catalog
//! endpoints.
//!
//! Tree construction failures are [`TreeError`], request parameter problems are
//! [`ValidationError`], repository failures are [`DataAccessError`], and the
//! endpoint layer folds all of them into [`CatalogError`].
use thiserror::Error;

use crate::category::CategoryId;

// ============================================================================
// Tree Errors
// ============================================================================

/// Errors raised while building or querying a [`CategoryTree`](crate::category::CategoryTree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A category points at a parent id that is not part of the record set.
    #[error("Category {id} references missing parent {parent_id}")]
    DanglingParent {
        id: CategoryId,
        parent_id: CategoryId,
    },

    /// The parent relation loops back on itself.
    #[error("Category hierarchy contains a cycle through category {id}")]
    Cycle { id: CategoryId },

    /// Two records share the same id.
    #[error("Duplicate category id {0}")]
    DuplicateId(CategoryId),

    /// Two records share the same slug.
    #[error("Duplicate category slug '{0}'")]
    DuplicateSlug(String),

    /// Slug lookup did not match any category.
    #[error("Category not found: {slug}")]
    NotFound { slug: String },
}

impl TreeError {
    /// True for malformed category input, false for lookup misses.
    pub fn is_integrity(&self) -> bool {
        !matches!(self, TreeError::NotFound { .. })
    }
}

// ============================================================================
// Validation Errors
// ============================================================================

/// Malformed or out-of-range request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid limit '{0}': expected a positive integer")]
    InvalidLimit(String),

    #[error("Invalid page '{0}': expected an integer")]
    InvalidPage(String),

    #[error("Invalid order '{0}': expected 'latest' or 'popular'")]
    InvalidOrder(String),

    #[error("Invalid slug '{0}': use lowercase letters, digits, '-' or '_'")]
    InvalidSlug(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),
}

// ============================================================================
// Data Access Errors
// ============================================================================

/// Failures reported by a repository.
#[derive(Debug, Error)]
pub enum DataAccessError {
    /// Another process holds a lock on the catalog database
    #[error("The catalog database is locked by another process. Please try again.")]
    Locked,

    /// A stored value could not be mapped to the domain model
    #[error("Corrupt catalog data: {0}")]
    Corrupt(String),

    /// The backing store is not reachable
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DataAccessError {
    /// Classify a sqlx error, separating lock contention from everything else.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5), SQLITE_LOCKED (6)
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
        {
            return DataAccessError::Locked;
        }

        DataAccessError::Database(err)
    }
}

// ============================================================================
// Catalog Errors
// ============================================================================

/// Errors surfaced by the `index`, `more` and `feed` endpoints.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Category input is malformed; no tree could be built.
    #[error("Category integrity error: {0}")]
    Integrity(TreeError),

    /// The requested slug does not resolve to a category.
    #[error("Category not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested view is switched off in settings.
    #[error("Feature disabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

impl CatalogError {
    /// Whether a transport layer should answer with "not found".
    ///
    /// Disabled features are reported as missing, matching how the feed is
    /// hidden when switched off.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::NotFound(_) | CatalogError::FeatureDisabled(_)
        )
    }
}

impl From<TreeError> for CatalogError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NotFound { slug } => CatalogError::NotFound(slug),
            other => CatalogError::Integrity(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_not_found_maps_to_catalog_not_found() {
        let err: CatalogError = TreeError::NotFound {
            slug: "missing".to_string(),
        }
        .into();
        assert!(matches!(err, CatalogError::NotFound(ref s) if s == "missing"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_integrity_errors_stay_integrity() {
        let err: CatalogError = TreeError::Cycle { id: 3 }.into();
        assert!(matches!(err, CatalogError::Integrity(TreeError::Cycle { id: 3 })));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_feature_disabled_is_rendered_as_not_found() {
        let err = CatalogError::FeatureDisabled("feed");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("feed"));
    }

    #[test]
    fn test_data_access_error_is_transparent() {
        let err: CatalogError = DataAccessError::Unavailable("timeout".to_string()).into();
        assert_eq!(err.to_string(), "Repository unavailable: timeout");
    }

    #[test]
    fn test_is_integrity() {
        assert!(TreeError::DuplicateId(1).is_integrity());
        assert!(TreeError::DanglingParent { id: 1, parent_id: 9 }.is_integrity());
        assert!(!TreeError::NotFound {
            slug: "x".to_string()
        }
        .is_integrity());
    }
}
