//! Fragment identifiers and load requests.

use serde::{Deserialize, Serialize};

/// Identifier of an HTML fragment, typically a relative path or URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(String);

impl FragmentId {
    /// Create a new fragment identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (and therefore not retrievable).
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FragmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FragmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Selector string naming the element that should receive a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSelector(String);

impl TargetSelector {
    /// Create a new target selector.
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// Get the selector as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TargetSelector {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TargetSelector {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single (fragment, target) pairing. Lives only for one load operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    /// Fragment to retrieve.
    pub path: FragmentId,
    /// Element that receives the markup.
    pub target: TargetSelector,
}

impl LoadRequest {
    /// Create a new load request.
    pub fn new(path: impl Into<FragmentId>, target: impl Into<TargetSelector>) -> Self {
        Self {
            path: path.into(),
            target: target.into(),
        }
    }
}

impl<P, T> From<(P, T)> for LoadRequest
where
    P: Into<FragmentId>,
    T: Into<TargetSelector>,
{
    fn from((path, target): (P, T)) -> Self {
        Self::new(path, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_id_display() {
        let id = FragmentId::new("components/contact-section.html");
        assert_eq!(format!("{}", id), "components/contact-section.html");
    }

    #[test]
    fn test_fragment_id_is_empty() {
        assert!(FragmentId::new("").is_empty());
        assert!(FragmentId::new("   ").is_empty());
        assert!(!FragmentId::new("a.html").is_empty());
    }

    #[test]
    fn test_load_request_from_tuple() {
        let req: LoadRequest = ("footer.html", "#footer").into();
        assert_eq!(req.path.as_str(), "footer.html");
        assert_eq!(req.target.as_str(), "#footer");
    }

    #[test]
    fn test_load_request_deserializes_from_path_and_target() {
        let req: LoadRequest =
            serde_json::from_str(r##"{"path":"nav.html","target":"#nav"}"##).unwrap();
        assert_eq!(req, LoadRequest::new("nav.html", "#nav"));
    }
}
