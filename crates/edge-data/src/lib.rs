//! Fragment retrieval channel.
//!
//! This crate provides:
//! - `Retriever` - Fetch a fragment by identifier, get status + text body
//! - `SpinRetriever` - Outbound HTTP through the Spin SDK
//! - `StaticRetriever` - In-memory routes with call counting

mod client;
mod static_routes;

pub use client::*;
pub use static_routes::*;
