//! Component loader.
//!
//! This crate provides:
//! - `ComponentLoader` - Fetch a fragment once, cache it, inject it into a target element
//! - `LoadOutcome` - What a single load did (cache status, injection)
//! - `LoadError` / `BatchError` - Failures of `load` and `load_many`
//! - `COMPONENT_LOADED` - Signal raised on the target after injection
//!
//! # Example
//!
//! ```ignore
//! let loader = ComponentLoader::new(SpinRetriever::new(), document, StructuredLogger::new());
//! loader.load("components/contact-section.html", "#contact-placeholder").await?;
//! ```

mod error;
mod loader;
mod signal;

pub use error::*;
pub use loader::*;
pub use signal::*;

pub use edge_cache::{CacheStatus, FragmentCache};
