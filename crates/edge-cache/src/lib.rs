//! Fragment cache for the edge component loader.
//!
//! This crate provides:
//! - `FragmentCache` - Owned in-memory cache, one entry per fragment, never invalidated
//! - `CacheStatus` - Whether a lookup was served from the cache
//! - `FragmentState` - `Unfetched` / `Cached` per fragment
//!
//! # Example
//!
//! ```ignore
//! use edge_cache::{FragmentCache, FragmentState};
//! use edge_core::FragmentId;
//!
//! let cache = FragmentCache::new();
//! let id = FragmentId::new("components/footer.html");
//! assert_eq!(cache.state(&id), FragmentState::Unfetched);
//!
//! cache.insert(id.clone(), "<footer></footer>");
//! assert_eq!(cache.state(&id), FragmentState::Cached);
//! ```

mod fragment;

pub use fragment::*;
