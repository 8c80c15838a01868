//! DOM capability consumed by the component loader.
//!
//! This crate provides:
//! - `Dom` - Find an element by selector, replace its content, dispatch a signal
//! - `Signal` - Named application event with a JSON payload
//! - `InMemoryDocument` - Arena-backed document with a markup parser and selector engine
//! - `SelectorList` - Parsed CSS selectors (type, `#id`, `.class`, `[attr]`, descendant and child combinators)

mod document;
mod parser;
mod selector;
mod signal;

pub use document::*;
pub use parser::{decode_entities, escape_attribute, escape_text};
pub use selector::*;
pub use signal::*;

use std::rc::Rc;

/// Node handle inside a document. Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node.
    pub const ROOT: NodeId = NodeId(0);

    /// Get the raw index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// DOM operation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The selector could not be parsed.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The node was removed or never existed.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The node is text or markup, not an element.
    #[error("{0} is not an element")]
    NotAnElement(NodeId),

    /// Markup meant to create an element contained none.
    #[error("markup contains no element")]
    NoElementInMarkup,
}

/// Find elements, replace their content and raise signals on them.
pub trait Dom {
    /// First element in document order matching `selector`.
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError>;

    /// Replace the entire content of `node` with `markup`. No sanitising.
    fn set_inner_html(&self, node: NodeId, markup: &str) -> Result<(), DomError>;

    /// Dispatch `signal` on `node`. Returns the number of listeners invoked.
    fn dispatch(&self, node: NodeId, signal: Signal) -> Result<usize, DomError>;
}

impl<D: Dom + ?Sized> Dom for Rc<D> {
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        (**self).query_selector(selector)
    }

    fn set_inner_html(&self, node: NodeId, markup: &str) -> Result<(), DomError> {
        (**self).set_inner_html(node, markup)
    }

    fn dispatch(&self, node: NodeId, signal: Signal) -> Result<usize, DomError> {
        (**self).dispatch(node, signal)
    }
}
