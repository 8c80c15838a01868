//! Core abstractions for the edge component loader.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `FragmentId` - Identifier of a retrievable HTML fragment
//! - `TargetSelector` - Selector naming the element that receives a fragment
//! - `LoadRequest` - Ephemeral (fragment, target) pairing
//! - `SiteConfig` - Loader, service page, notification and logging settings

mod config;
mod fragment;

pub use config::*;
pub use fragment::*;
