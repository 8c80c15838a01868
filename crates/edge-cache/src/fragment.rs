//! Session-lifetime fragment cache.

use std::cell::RefCell;
use std::collections::HashMap;

use edge_core::FragmentId;
use serde::{Deserialize, Serialize};

/// Status of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from the cache.
    Hit,
    /// Retrieved and stored.
    Miss,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
        }
    }
}

/// Lifecycle of a fragment identifier within a session.
///
/// `Unfetched -> Cached` happens once, on the first successful retrieval.
/// Failures leave an identifier `Unfetched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentState {
    Unfetched,
    Cached,
}

/// In-memory fragment cache owned by one loader.
///
/// Entries live for the lifetime of the cache: there is no TTL, no eviction
/// and no refresh. The cache assumes a single-threaded event loop and uses
/// `RefCell` rather than locks.
#[derive(Debug, Default)]
pub struct FragmentCache {
    entries: RefCell<HashMap<FragmentId, String>>,
}

impl FragmentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached markup for `id`.
    pub fn get(&self, id: &FragmentId) -> Option<String> {
        self.entries.borrow().get(id).cloned()
    }

    /// Store markup for `id`. A second insert for the same id overwrites the
    /// first.
    pub fn insert(&self, id: FragmentId, markup: impl Into<String>) {
        self.entries.borrow_mut().insert(id, markup.into());
    }

    /// Whether `id` has an entry.
    pub fn contains(&self, id: &FragmentId) -> bool {
        self.entries.borrow().contains_key(id)
    }

    /// Current state of `id`.
    pub fn state(&self, id: &FragmentId) -> FragmentState {
        if self.contains(id) {
            FragmentState::Cached
        } else {
            FragmentState::Unfetched
        }
    }

    /// Number of cached fragments.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Cached identifiers, sorted.
    pub fn keys(&self) -> Vec<FragmentId> {
        let mut keys: Vec<FragmentId> = self.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }
}
