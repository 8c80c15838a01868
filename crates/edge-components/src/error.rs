//! Loader errors.

use edge_core::{FragmentId, TargetSelector};
use edge_data::FetchError;
use edge_dom::DomError;

/// Error type for a single load.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// Network failure or non-success status. Nothing was cached or injected.
    #[error("failed to load component {id}: {source}")]
    Retrieval {
        id: FragmentId,
        #[source]
        source: FetchError,
    },

    /// No element matches the target selector.
    #[error("Target element not found: {selector}")]
    TargetNotFound { selector: TargetSelector },

    /// The fragment identifier is empty.
    #[error("fragment identifier is empty")]
    EmptyFragmentId,

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl LoadError {
    /// Whether trying the same load again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retrieval { .. })
    }
}

/// Error type for `load_many`: at least one load failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{failed} of {total} components failed to load")]
pub struct BatchError {
    pub failed: usize,
    pub total: usize,
    /// The individual failures, in request order.
    pub errors: Vec<LoadError>,
}
