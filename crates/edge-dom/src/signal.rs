//! Application-level signals dispatched on elements.

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::NodeId;

/// A named event with a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Event name, e.g. `componentLoaded`.
    pub name: String,
    /// Payload.
    #[serde(default)]
    pub detail: serde_json::Value,
    /// Whether listeners on ancestors see the signal too.
    #[serde(default = "default_bubbles")]
    pub bubbles: bool,
}

fn default_bubbles() -> bool {
    true
}

impl Signal {
    /// Create a bubbling signal with a null payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: serde_json::Value::Null,
            bubbles: true,
        }
    }

    /// Create a bubbling signal with a serialized payload.
    pub fn with_detail<T: Serialize>(
        name: impl Into<String>,
        detail: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: name.into(),
            detail: serde_json::to_value(detail)?,
            bubbles: true,
        })
    }

    /// Stop the signal from reaching ancestors.
    pub fn non_bubbling(mut self) -> Self {
        self.bubbles = false;
        self
    }

    /// Deserialize the payload.
    pub fn detail_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.detail.clone())
    }
}

/// What a listener sees when a signal reaches it.
#[derive(Debug, Clone, Copy)]
pub struct SignalEvent<'a> {
    pub signal: &'a Signal,
    /// Element the signal was dispatched on.
    pub target: NodeId,
    /// Element the listener is attached to.
    pub current_target: NodeId,
}

/// Signal callback.
pub type Listener = Rc<dyn Fn(&SignalEvent<'_>)>;

/// Log entry for one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub target: NodeId,
    pub signal: Signal,
    /// Listeners invoked.
    pub delivered: usize,
}
