//! The `componentLoaded` signal.

use edge_dom::Signal;
use serde::{Deserialize, Serialize};

/// Name of the signal raised on a target after its content is replaced.
pub const COMPONENT_LOADED: &str = "componentLoaded";

/// Payload of `componentLoaded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLoadedDetail {
    /// Selector the fragment was loaded into, as given to `load`.
    pub selector: String,
}

impl ComponentLoadedDetail {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    /// Bubbling `componentLoaded` signal carrying this payload.
    pub fn into_signal(self) -> Signal {
        let mut signal = Signal::new(COMPONENT_LOADED);
        signal.detail = serde_json::json!({ "selector": self.selector });
        signal
    }

    /// Read the payload back from a signal. `None` for other signals.
    pub fn from_signal(signal: &Signal) -> Option<Self> {
        if signal.name != COMPONENT_LOADED {
            return None;
        }
        signal.detail_as().ok()
    }
}
