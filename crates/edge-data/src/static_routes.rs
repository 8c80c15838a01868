//! In-memory retriever for development and tests.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use edge_core::FragmentId;

use crate::client::{FetchError, Retrieved, Retriever};

/// Canned response for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticResponse {
    /// Respond with a status and body.
    Respond(Retrieved),
    /// Fail at the network level.
    NetworkError(String),
}

/// Retriever serving fixed responses and counting calls per identifier.
///
/// Unknown identifiers answer 404 with an empty body.
#[derive(Debug, Default)]
pub struct StaticRetriever {
    routes: RefCell<HashMap<FragmentId, StaticResponse>>,
    calls: RefCell<HashMap<FragmentId, usize>>,
}

impl StaticRetriever {
    /// Create a retriever with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 for `id`.
    pub fn with_fragment(self, id: impl Into<FragmentId>, body: impl Into<String>) -> Self {
        self.set(id, StaticResponse::Respond(Retrieved::ok(body)));
        self
    }

    /// Serve `status` with an empty body for `id`.
    pub fn with_status(self, id: impl Into<FragmentId>, status: u16) -> Self {
        self.set(id, StaticResponse::Respond(Retrieved::new(status, "")));
        self
    }

    /// Fail `id` at the network level.
    pub fn with_network_error(self, id: impl Into<FragmentId>, message: impl Into<String>) -> Self {
        self.set(id, StaticResponse::NetworkError(message.into()));
        self
    }

    /// Replace the response for `id`.
    pub fn set(&self, id: impl Into<FragmentId>, response: StaticResponse) {
        self.routes.borrow_mut().insert(id.into(), response);
    }

    /// Number of retrievals issued for `id`.
    pub fn calls(&self, id: &str) -> usize {
        self.calls
            .borrow()
            .get(&FragmentId::new(id))
            .copied()
            .unwrap_or(0)
    }

    /// Number of retrievals issued in total.
    pub fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }
}

#[async_trait(?Send)]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, id: &FragmentId) -> Result<Retrieved, FetchError> {
        *self.calls.borrow_mut().entry(id.clone()).or_insert(0) += 1;

        let response = self.routes.borrow().get(id).cloned();
        match response {
            Some(StaticResponse::Respond(retrieved)) => Ok(retrieved),
            Some(StaticResponse::NetworkError(message)) => Err(FetchError::Connection(message)),
            None => Ok(Retrieved::new(404, "")),
        }
    }
}
