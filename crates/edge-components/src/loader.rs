//! Fetch-once component loader.

use edge_cache::{CacheStatus, FragmentCache};
use edge_core::{FragmentId, LoadRequest, TargetSelector};
use edge_data::{FetchError, Retriever};
use edge_dom::{Dom, NodeId};
use edge_observability::{DiagnosticSink, LogBuilder, LogLevel};
use futures::future::join_all;

use crate::error::{BatchError, LoadError};
use crate::signal::ComponentLoadedDetail;

const COMPONENT: &str = "component-loader";

/// What happened to the target element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    /// Content replaced and `componentLoaded` dispatched.
    Injected {
        node: NodeId,
        /// Listeners that saw the signal.
        delivered: usize,
    },
    /// No element matched. Logged as a warning, not a failure.
    TargetMissing,
}

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub id: FragmentId,
    pub target: TargetSelector,
    /// `Hit` when no retrieval was made.
    pub cache: CacheStatus,
    pub injection: Injection,
}

impl LoadOutcome {
    /// Whether the markup reached the document.
    pub fn injected(&self) -> bool {
        matches!(self.injection, Injection::Injected { .. })
    }

    /// Treat a missing target as a failure.
    pub fn require_target(self) -> Result<Self, LoadError> {
        match self.injection {
            Injection::Injected { .. } => Ok(self),
            Injection::TargetMissing => Err(LoadError::TargetNotFound {
                selector: self.target,
            }),
        }
    }
}

/// Loads HTML fragments into a document, retrieving each identifier at most
/// once per successful fetch.
///
/// The cache belongs to this loader and lives as long as it does. Concurrent
/// loads of an uncached identifier each retrieve it; the last to finish
/// writes the cache entry.
pub struct ComponentLoader<R, D, S> {
    retriever: R,
    dom: D,
    sink: S,
    cache: FragmentCache,
}

impl<R, D, S> ComponentLoader<R, D, S>
where
    R: Retriever,
    D: Dom,
    S: DiagnosticSink,
{
    /// Create a loader with an empty cache.
    pub fn new(retriever: R, dom: D, sink: S) -> Self {
        Self {
            retriever,
            dom,
            sink,
            cache: FragmentCache::new(),
        }
    }

    /// Start from an existing cache.
    pub fn with_cache(mut self, cache: FragmentCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &FragmentCache {
        &self.cache
    }

    pub fn retriever(&self) -> &R {
        &self.retriever
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Load fragment `id` into the element matching `target`.
    ///
    /// Retrieval failures are logged and returned; the cache is untouched so
    /// a later call retries. A missing target is logged as a warning and the
    /// load still succeeds with `Injection::TargetMissing`.
    pub async fn load(
        &self,
        id: impl Into<FragmentId>,
        target: impl Into<TargetSelector>,
    ) -> Result<LoadOutcome, LoadError> {
        let id = id.into();
        let target = target.into();

        match self.try_load(&id, &target).await {
            Ok(outcome) => {
                if !outcome.injected() {
                    let missing = LoadError::TargetNotFound {
                        selector: target.clone(),
                    };
                    LogBuilder::warn(&self.sink, missing.to_string())
                        .component(COMPONENT)
                        .field("fragment", id.as_str())
                        .field("selector", target.as_str())
                        .emit();
                }
                Ok(outcome)
            }
            Err(e) => {
                LogBuilder::error(&self.sink, "Component loading error")
                    .component(COMPONENT)
                    .field("fragment", id.as_str())
                    .field("selector", target.as_str())
                    .field("error", e.to_string())
                    .emit();
                Err(e)
            }
        }
    }

    /// Load every request concurrently and wait for all of them.
    ///
    /// Fails when any load fails. Successful loads stay in the document.
    pub async fn load_many<I>(&self, requests: I) -> Result<(), BatchError>
    where
        I: IntoIterator<Item = LoadRequest>,
    {
        let loads: Vec<_> = requests
            .into_iter()
            .map(|request| self.load(request.path, request.target))
            .collect();
        let total = loads.len();

        let errors: Vec<LoadError> = join_all(loads)
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect();

        if errors.is_empty() {
            LogBuilder::info(&self.sink, "All components loaded successfully")
                .component(COMPONENT)
                .field_i64("total", total as i64)
                .emit();
            return Ok(());
        }

        let err = BatchError {
            failed: errors.len(),
            total,
            errors,
        };
        LogBuilder::error(&self.sink, "Error loading components")
            .component(COMPONENT)
            .field_i64("failed", err.failed as i64)
            .field_i64("total", total as i64)
            .field("error", err.to_string())
            .emit();
        Err(err)
    }

    async fn try_load(
        &self,
        id: &FragmentId,
        target: &TargetSelector,
    ) -> Result<LoadOutcome, LoadError> {
        if id.is_empty() {
            return Err(LoadError::EmptyFragmentId);
        }

        let (markup, cache) = match self.cache.get(id) {
            Some(markup) => (markup, CacheStatus::Hit),
            None => (self.fetch(id).await?, CacheStatus::Miss),
        };

        let injection = self.inject(&markup, target)?;
        Ok(LoadOutcome {
            id: id.clone(),
            target: target.clone(),
            cache,
            injection,
        })
    }

    async fn fetch(&self, id: &FragmentId) -> Result<String, LoadError> {
        let retrieval_error = |source: FetchError| LoadError::Retrieval {
            id: id.clone(),
            source,
        };

        let retrieved = self.retriever.retrieve(id).await.map_err(retrieval_error)?;
        if !retrieved.is_success() {
            return Err(retrieval_error(FetchError::Http {
                status: retrieved.status,
                url: id.to_string(),
            }));
        }

        self.cache.insert(id.clone(), retrieved.body.clone());
        LogBuilder::new(&self.sink, LogLevel::Debug, "Component cached")
            .component(COMPONENT)
            .field("fragment", id.as_str())
            .field_i64("bytes", retrieved.body.len() as i64)
            .emit();
        Ok(retrieved.body)
    }

    fn inject(&self, markup: &str, target: &TargetSelector) -> Result<Injection, LoadError> {
        let Some(node) = self.dom.query_selector(target.as_str())? else {
            return Ok(Injection::TargetMissing);
        };

        self.dom.set_inner_html(node, markup)?;
        let signal = ComponentLoadedDetail::new(target.as_str()).into_signal();
        let delivered = self.dom.dispatch(node, signal)?;
        Ok(Injection::Injected { node, delivered })
    }
}

impl<R, D, S> std::fmt::Debug for ComponentLoader<R, D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentLoader")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
