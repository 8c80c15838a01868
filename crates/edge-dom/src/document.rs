//! Arena-backed in-memory document.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::parser::{decode_entities, escape_attribute, escape_text, parse_fragment, ParsedNode};
use crate::selector::{MatchTarget, SelectorList};
use crate::signal::{DispatchRecord, Listener, Signal, SignalEvent};
use crate::{Dom, DomError, NodeId};

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Raw(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    /// Original opening tag; dropped once attributes or styles change.
    raw_open: Option<String>,
    closed: bool,
    styles: Vec<(String, String)>,
    /// Current form value, overriding the default from markup.
    value: Option<String>,
}

impl ElementData {
    fn new(tag: String, attrs: Vec<(String, String)>, raw_open: Option<String>, closed: bool) -> Self {
        let styles = attrs
            .iter()
            .find(|(k, _)| k == "style")
            .map(|(_, v)| parse_styles(v))
            .unwrap_or_default();
        Self {
            tag,
            attrs,
            raw_open,
            closed,
            styles,
            value: None,
        }
    }

    fn open_tag(&self) -> String {
        if let Some(raw) = &self.raw_open {
            return raw.clone();
        }

        let mut s = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            if name == "style" {
                continue;
            }
            if value.is_empty() {
                s.push_str(&format!(" {}", name));
            } else {
                s.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
            }
        }
        if !self.styles.is_empty() {
            s.push_str(&format!(" style=\"{}\"", escape_attribute(&render_styles(&self.styles))));
        }
        s.push('>');
        s
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "style" {
            self.styles = parse_styles(value);
        }
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name, value.to_string())),
        }
        self.raw_open = None;
    }

    fn remove_attribute(&mut self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        let before = self.attrs.len();
        self.attrs.retain(|(k, _)| *k != name);
        if name == "style" {
            self.styles.clear();
        }
        let removed = self.attrs.len() != before;
        if removed {
            self.raw_open = None;
        }
        removed
    }
}

impl MatchTarget for ElementData {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn parse_styles(s: &str) -> Vec<(String, String)> {
    s.split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            (!prop.is_empty()).then(|| (prop, value.to_string()))
        })
        .collect()
}

fn render_styles(styles: &[(String, String)]) -> String {
    styles
        .iter()
        .map(|(k, v)| format!("{}: {};", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Tree {
    /// Removed nodes leave `None` behind so ids stay stable.
    nodes: Vec<Option<Node>>,
}

impl Tree {
    fn new() -> Self {
        Self {
            nodes: vec![Some(Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            })],
        }
    }

    fn get(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(DomError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(DomError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        match &self.get(id)?.kind {
            NodeKind::Element(e) => Ok(e),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Element(e) => Ok(e),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    fn alloc(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        }));
        if let Some(Some(p)) = self.nodes.get_mut(parent.index()) {
            p.children.push(id);
        }
        id
    }

    /// Append parsed nodes under `parent`; returns the new top-level ids.
    fn insert_parsed(&mut self, parent: NodeId, parsed: Vec<ParsedNode>) -> Vec<NodeId> {
        parsed
            .into_iter()
            .map(|node| match node {
                ParsedNode::Text(text) => self.alloc(NodeKind::Text(text), parent),
                ParsedNode::Raw(raw) => self.alloc(NodeKind::Raw(raw), parent),
                ParsedNode::Element(e) => {
                    let data = ElementData::new(e.tag, e.attrs, Some(e.raw_open), e.closed);
                    let id = self.alloc(NodeKind::Element(data), parent);
                    self.insert_parsed(id, e.children);
                    id
                }
            })
            .collect()
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(id.index()).and_then(Option::take) {
            Some(node) => node.children,
            None => return,
        };
        for child in children {
            self.free_subtree(child);
        }
    }

    fn clear_children(&mut self, id: NodeId) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.get_mut(id)?.children);
        for child in children {
            self.free_subtree(child);
        }
        Ok(())
    }

    fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        let parent = self.get(id)?.parent;
        if let Some(parent) = parent {
            if let Ok(p) = self.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        self.free_subtree(id);
        Ok(())
    }

    /// Descendants of `id` in document order, excluding `id`.
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(id) {
            Ok(node) => node.children.iter().rev().copied().collect(),
            Err(_) => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Ok(node) = self.get(next) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Ancestor ids from the parent outwards, document node included.
    fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.get(id).ok().and_then(|n| n.parent);
        while let Some(next) = current {
            out.push(next);
            current = self.get(next).ok().and_then(|n| n.parent);
        }
        out
    }

    fn matches(&self, selectors: &SelectorList, id: NodeId) -> bool {
        let Ok(element) = self.element(id) else {
            return false;
        };
        let ancestors: Vec<&dyn MatchTarget> = self
            .ancestors(id)
            .into_iter()
            .filter_map(|a| self.element(a).ok())
            .map(|e| e as &dyn MatchTarget)
            .collect();
        selectors.matches(element, &ancestors)
    }

    fn select_in(&self, scope: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.matches(selectors, *id))
            .collect()
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Document => self.write_children(id, out),
            NodeKind::Element(e) => {
                out.push_str(&e.open_tag());
                self.write_children(id, out);
                if e.closed {
                    out.push_str(&format!("</{}>", e.tag));
                }
            }
            NodeKind::Text(s) | NodeKind::Raw(s) => out.push_str(s),
        }
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        if let Ok(node) = self.get(id) {
            for child in &node.children {
                self.write_node(*child, out);
            }
        }
    }

    fn write_text(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(s) => out.push_str(&decode_entities(s)),
            NodeKind::Raw(_) => {}
            NodeKind::Document | NodeKind::Element(_) => {
                for child in &node.children {
                    self.write_text(*child, out);
                }
            }
        }
    }

    fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_text(id, &mut out);
        out
    }

    fn default_value(&self, id: NodeId, element: &ElementData) -> String {
        match element.tag.as_str() {
            "textarea" => self.text(id),
            "select" => {
                let options: Vec<NodeId> = self
                    .descendants(id)
                    .into_iter()
                    .filter(|o| self.element(*o).is_ok_and(|e| e.tag == "option"))
                    .collect();
                let chosen = options
                    .iter()
                    .find(|o| {
                        self.element(**o)
                            .is_ok_and(|e| e.attribute("selected").is_some())
                    })
                    .or(options.first());
                match chosen {
                    Some(option) => match self.element(*option).ok().and_then(|e| e.attribute("value")) {
                        Some(value) => value.to_string(),
                        None => self.text(*option).trim().to_string(),
                    },
                    None => String::new(),
                }
            }
            _ => element.attribute("value").unwrap_or_default().to_string(),
        }
    }
}

/// In-memory document.
///
/// Markup is parsed into an arena of nodes; `inner_html` serializes the
/// subtree back, reproducing parsed markup byte for byte until an element's
/// attributes or styles are changed. Signals bubble from the target through
/// every ancestor up to the document node.
pub struct InMemoryDocument {
    tree: RefCell<Tree>,
    listeners: RefCell<HashMap<NodeId, Vec<(String, Listener)>>>,
    dispatched: RefCell<Vec<DispatchRecord>>,
}

impl std::fmt::Debug for InMemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocument")
            .field("nodes", &self.tree.borrow().nodes.len())
            .field("dispatched", &self.dispatched.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            tree: RefCell::new(Tree::new()),
            listeners: RefCell::new(HashMap::new()),
            dispatched: RefCell::new(Vec::new()),
        }
    }

    /// Create a document from page markup.
    pub fn parse(markup: &str) -> Self {
        let doc = Self::new();
        doc.tree
            .borrow_mut()
            .insert_parsed(NodeId::ROOT, parse_fragment(markup));
        doc
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The `body` element, or the document node when there is none.
    pub fn body(&self) -> NodeId {
        let tree = self.tree.borrow();
        tree.descendants(NodeId::ROOT)
            .into_iter()
            .find(|id| tree.element(*id).is_ok_and(|e| e.tag == "body"))
            .unwrap_or(NodeId::ROOT)
    }

    /// Whether `node` is still part of the document.
    pub fn contains(&self, node: NodeId) -> bool {
        self.tree.borrow().contains(node)
    }

    /// Parent of `node`.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().get(node).ok().and_then(|n| n.parent)
    }

    /// Element children of `node`.
    pub fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        let tree = self.tree.borrow();
        Ok(tree
            .get(node)?
            .children
            .iter()
            .copied()
            .filter(|c| tree.element(*c).is_ok())
            .collect())
    }

    /// All elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        self.query_selector_all_in(NodeId::ROOT, selector)
    }

    /// First descendant of `scope` matching `selector`.
    pub fn query_selector_in(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all_in(scope, selector)?.into_iter().next())
    }

    /// All descendants of `scope` matching `selector`.
    pub fn query_selector_all_in(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, DomError> {
        let selectors = SelectorList::parse(selector)?;
        let tree = self.tree.borrow();
        tree.get(scope)?;
        Ok(tree.select_in(scope, &selectors))
    }

    /// Whether `node` matches `selector`.
    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool, DomError> {
        let selectors = SelectorList::parse(selector)?;
        let tree = self.tree.borrow();
        tree.element(node)?;
        Ok(tree.matches(&selectors, node))
    }

    /// Lowercased tag name.
    pub fn tag_name(&self, node: NodeId) -> Result<String, DomError> {
        Ok(self.tree.borrow().element(node)?.tag.clone())
    }

    /// Attribute value; valueless attributes read as `""`.
    pub fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self
            .tree
            .borrow()
            .element(node)?
            .attribute(&name.to_ascii_lowercase())
            .map(str::to_string))
    }

    /// Whether the attribute is present.
    pub fn has_attribute(&self, node: NodeId, name: &str) -> Result<bool, DomError> {
        Ok(self.attribute(node, name)?.is_some())
    }

    /// Set or replace an attribute.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.tree.borrow_mut().element_mut(node)?.set_attribute(name, value);
        Ok(())
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<bool, DomError> {
        Ok(self.tree.borrow_mut().element_mut(node)?.remove_attribute(name))
    }

    /// Whether the element's class list contains `class`.
    pub fn has_class(&self, node: NodeId, class: &str) -> Result<bool, DomError> {
        Ok(self.tree.borrow().element(node)?.has_class(class))
    }

    /// Inline style property.
    pub fn style(&self, node: NodeId, property: &str) -> Result<Option<String>, DomError> {
        let property = property.to_ascii_lowercase();
        Ok(self
            .tree
            .borrow()
            .element(node)?
            .styles
            .iter()
            .find(|(k, _)| *k == property)
            .map(|(_, v)| v.clone()))
    }

    /// Set an inline style property.
    pub fn set_style(&self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        let element = tree.element_mut(node)?;
        let property = property.to_ascii_lowercase();
        match element.styles.iter_mut().find(|(k, _)| *k == property) {
            Some((_, v)) => *v = value.to_string(),
            None => element.styles.push((property, value.to_string())),
        }
        element.raw_open = None;
        Ok(())
    }

    /// Current value of a form control.
    pub fn value(&self, node: NodeId) -> Result<String, DomError> {
        let tree = self.tree.borrow();
        let element = tree.element(node)?;
        Ok(match &element.value {
            Some(value) => value.clone(),
            None => tree.default_value(node, element),
        })
    }

    /// Set the current value of a form control.
    pub fn set_value(&self, node: NodeId, value: &str) -> Result<(), DomError> {
        self.tree.borrow_mut().element_mut(node)?.value = Some(value.to_string());
        Ok(())
    }

    /// Restore every control under `node` to its markup default.
    pub fn reset(&self, node: NodeId) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        tree.element(node)?;
        for id in tree.descendants(node) {
            if let Ok(element) = tree.element_mut(id) {
                element.value = None;
            }
        }
        Ok(())
    }

    /// Serialized content of `node`.
    pub fn inner_html(&self, node: NodeId) -> Result<String, DomError> {
        let tree = self.tree.borrow();
        tree.get(node)?;
        let mut out = String::new();
        tree.write_children(node, &mut out);
        Ok(out)
    }

    /// Serialized `node` including itself.
    pub fn outer_html(&self, node: NodeId) -> Result<String, DomError> {
        let tree = self.tree.borrow();
        tree.get(node)?;
        let mut out = String::new();
        tree.write_node(node, &mut out);
        Ok(out)
    }

    /// Serialized document.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.tree.borrow().write_children(NodeId::ROOT, &mut out);
        out
    }

    /// Decoded text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> Result<String, DomError> {
        let tree = self.tree.borrow();
        tree.get(node)?;
        Ok(tree.text(node))
    }

    /// Replace the content of `node` with a single text node.
    pub fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), DomError> {
        {
            let mut tree = self.tree.borrow_mut();
            tree.clear_children(node)?;
            if !text.is_empty() {
                tree.alloc(NodeKind::Text(escape_text(text)), node);
            }
        }
        self.prune_listeners();
        Ok(())
    }

    /// Parse `markup` and append it to `parent`. Returns the new elements.
    pub fn append_html(&self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>, DomError> {
        let mut tree = self.tree.borrow_mut();
        tree.get(parent)?;
        let created = tree.insert_parsed(parent, parse_fragment(markup));
        Ok(created
            .into_iter()
            .filter(|id| tree.element(*id).is_ok())
            .collect())
    }

    /// Append `markup` to `parent` and return its first top-level element.
    ///
    /// Nothing is appended when the markup holds no element.
    pub fn append_element(&self, parent: NodeId, markup: &str) -> Result<NodeId, DomError> {
        let parsed = parse_fragment(markup);
        if !parsed.iter().any(|node| matches!(node, ParsedNode::Element(_))) {
            return Err(DomError::NoElementInMarkup);
        }
        let mut tree = self.tree.borrow_mut();
        tree.get(parent)?;
        tree.insert_parsed(parent, parsed)
            .into_iter()
            .find(|id| tree.element(*id).is_ok())
            .ok_or(DomError::NoElementInMarkup)
    }

    /// Detach and drop `node` and its subtree.
    pub fn remove(&self, node: NodeId) -> Result<(), DomError> {
        if node == NodeId::ROOT {
            return Err(DomError::NotAnElement(node));
        }
        self.tree.borrow_mut().remove(node)?;
        self.prune_listeners();
        Ok(())
    }

    /// Listen for signals named `name` on `node` (and, by bubbling, its descendants).
    pub fn add_listener<F>(&self, node: NodeId, name: &str, listener: F) -> Result<(), DomError>
    where
        F: Fn(&SignalEvent<'_>) + 'static,
    {
        self.tree.borrow().get(node)?;
        let listener: Listener = Rc::new(listener);
        self.listeners
            .borrow_mut()
            .entry(node)
            .or_default()
            .push((name.to_string(), listener));
        Ok(())
    }

    /// Every dispatch so far, oldest first.
    pub fn dispatched(&self) -> Vec<DispatchRecord> {
        self.dispatched.borrow().clone()
    }

    /// Dispatches of signals named `name`.
    pub fn dispatched_named(&self, name: &str) -> Vec<DispatchRecord> {
        self.dispatched
            .borrow()
            .iter()
            .filter(|r| r.signal.name == name)
            .cloned()
            .collect()
    }

    fn prune_listeners(&self) {
        let tree = self.tree.borrow();
        self.listeners.borrow_mut().retain(|id, _| tree.contains(*id));
    }
}

impl Dom for InMemoryDocument {
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        self.query_selector_in(NodeId::ROOT, selector)
    }

    fn set_inner_html(&self, node: NodeId, markup: &str) -> Result<(), DomError> {
        {
            let mut tree = self.tree.borrow_mut();
            tree.clear_children(node)?;
            tree.insert_parsed(node, parse_fragment(markup));
        }
        self.prune_listeners();
        Ok(())
    }

    fn dispatch(&self, node: NodeId, signal: Signal) -> Result<usize, DomError> {
        let path = {
            let tree = self.tree.borrow();
            tree.get(node)?;
            let mut path = vec![node];
            if signal.bubbles {
                path.extend(tree.ancestors(node));
            }
            path
        };

        let mut delivered = 0;
        for current in path {
            let matching: Vec<Listener> = self
                .listeners
                .borrow()
                .get(&current)
                .map(|ls| {
                    ls.iter()
                        .filter(|(name, _)| *name == signal.name)
                        .map(|(_, l)| Rc::clone(l))
                        .collect()
                })
                .unwrap_or_default();

            for listener in matching {
                listener(&SignalEvent {
                    signal: &signal,
                    target: node,
                    current_target: current,
                });
                delivered += 1;
            }
        }

        self.dispatched.borrow_mut().push(DispatchRecord {
            target: node,
            signal,
            delivered,
        });
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    const PAGE: &str = r#"<html><head><title>Svc</title></head><body class="service-page"><main><div id="contact-placeholder"></div><div id="other"></div></main></body></html>"#;

    #[test]
    fn test_parse_round_trips() {
        let doc = InMemoryDocument::parse(PAGE);
        assert_eq!(doc.to_html(), PAGE);
    }

    #[test]
    fn test_query_selector_by_id_and_class() {
        let doc = InMemoryDocument::parse(PAGE);
        let placeholder = doc.query_selector("#contact-placeholder").unwrap().unwrap();
        assert_eq!(doc.tag_name(placeholder).unwrap(), "div");

        let body = doc.body();
        assert!(doc.has_class(body, "service-page").unwrap());
        assert_eq!(doc.query_selector("#missing").unwrap(), None);
    }

    #[test]
    fn test_invalid_selector_is_error() {
        let doc = InMemoryDocument::parse(PAGE);
        assert!(matches!(
            doc.query_selector("div:hover"),
            Err(DomError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_set_inner_html_replaces_content() {
        let doc = InMemoryDocument::parse(PAGE);
        let target = doc.query_selector("#contact-placeholder").unwrap().unwrap();

        doc.set_inner_html(target, "<p class=\"a\">one</p>").unwrap();
        doc.set_inner_html(target, "<p class=\"b\">two</p>").unwrap();

        assert_eq!(doc.inner_html(target).unwrap(), "<p class=\"b\">two</p>");
        assert_eq!(doc.query_selector_all("p").unwrap().len(), 1);
        assert!(doc.query_selector(".a").unwrap().is_none());
    }

    #[test]
    fn test_set_inner_html_on_void_element() {
        let doc = InMemoryDocument::parse(r#"<body><input id="i"></body>"#);
        let input = doc.query_selector("#i").unwrap().unwrap();

        doc.set_inner_html(input, "<p>x</p>").unwrap();

        assert_eq!(doc.inner_html(input).unwrap(), "<p>x</p>");
        assert_eq!(doc.query_selector("#i p").unwrap().map(|p| doc.parent(p)), Some(Some(input)));
    }

    #[test]
    fn test_injected_markup_is_queryable() {
        let doc = InMemoryDocument::parse(PAGE);
        let target = doc.query_selector("#contact-placeholder").unwrap().unwrap();
        doc.set_inner_html(
            target,
            r#"<form class="service-contact-form"><input type="email" name="email" required></form>"#,
        )
        .unwrap();

        let form = doc.query_selector(".service-contact-form").unwrap().unwrap();
        let email = doc
            .query_selector_in(form, r#"input[type="email"]"#)
            .unwrap()
            .unwrap();
        assert_eq!(doc.attribute(email, "name").unwrap().as_deref(), Some("email"));
        assert!(doc.matches(email, "#contact-placeholder input").unwrap());
    }

    #[test]
    fn test_text_content_decodes_and_set_text_escapes() {
        let doc = InMemoryDocument::parse("<h3>98%</h3><p>a &amp; b</p>");
        let p = doc.query_selector("p").unwrap().unwrap();
        assert_eq!(doc.text_content(p).unwrap(), "a & b");

        let h3 = doc.query_selector("h3").unwrap().unwrap();
        doc.set_text_content(h3, "<50%>").unwrap();
        assert_eq!(doc.inner_html(h3).unwrap(), "&lt;50%&gt;");
        assert_eq!(doc.text_content(h3).unwrap(), "<50%>");
    }

    #[test]
    fn test_attribute_change_regenerates_open_tag() {
        let doc = InMemoryDocument::parse("<form  class='f'></form>");
        let form = doc.query_selector(".f").unwrap().unwrap();
        assert_eq!(doc.outer_html(form).unwrap(), "<form  class='f'></form>");

        doc.set_attribute(form, "data-initialized", "true").unwrap();
        assert_eq!(
            doc.outer_html(form).unwrap(),
            "<form class=\"f\" data-initialized=\"true\"></form>"
        );
        assert!(doc.remove_attribute(form, "data-initialized").unwrap());
        assert!(!doc.has_attribute(form, "data-initialized").unwrap());
    }

    #[test]
    fn test_styles() {
        let doc = InMemoryDocument::parse(r#"<input style="border-color: red; width: 10px">"#);
        let input = doc.query_selector("input").unwrap().unwrap();
        assert_eq!(doc.style(input, "border-color").unwrap().as_deref(), Some("red"));

        doc.set_style(input, "border-color", "#ef4444").unwrap();
        assert_eq!(doc.style(input, "border-color").unwrap().as_deref(), Some("#ef4444"));
        assert_eq!(
            doc.outer_html(input).unwrap(),
            r#"<input style="border-color: #ef4444; width: 10px;">"#
        );
    }

    #[test]
    fn test_form_values_and_reset() {
        let doc = InMemoryDocument::parse(
            r#"<form><input name="n" value="preset"><textarea name="m">hello</textarea><select name="s"><option value="">choose</option><option value="web" selected>Web</option></select></form>"#,
        );
        let form = doc.query_selector("form").unwrap().unwrap();
        let input = doc.query_selector("input").unwrap().unwrap();
        let textarea = doc.query_selector("textarea").unwrap().unwrap();
        let select = doc.query_selector("select").unwrap().unwrap();

        assert_eq!(doc.value(input).unwrap(), "preset");
        assert_eq!(doc.value(textarea).unwrap(), "hello");
        assert_eq!(doc.value(select).unwrap(), "web");

        doc.set_value(input, "typed").unwrap();
        doc.set_value(select, "").unwrap();
        assert_eq!(doc.value(input).unwrap(), "typed");

        doc.reset(form).unwrap();
        assert_eq!(doc.value(input).unwrap(), "preset");
        assert_eq!(doc.value(select).unwrap(), "web");
    }

    #[test]
    fn test_append_and_remove() {
        let doc = InMemoryDocument::parse(PAGE);
        let body = doc.body();
        let created = doc
            .append_html(body, r#"<div class="toast">hi</div>"#)
            .unwrap();
        assert_eq!(created.len(), 1);
        assert!(doc.query_selector(".toast").unwrap().is_some());

        doc.remove(created[0]).unwrap();
        assert!(!doc.contains(created[0]));
        assert!(doc.query_selector(".toast").unwrap().is_none());
        assert!(matches!(doc.remove(created[0]), Err(DomError::UnknownNode(_))));
    }

    #[test]
    fn test_append_element() {
        let doc = InMemoryDocument::parse(PAGE);
        let body = doc.body();
        let before = doc.inner_html(body).unwrap();

        assert_eq!(
            doc.append_element(body, "just text"),
            Err(DomError::NoElementInMarkup)
        );
        assert_eq!(doc.inner_html(body).unwrap(), before);

        let toast = doc.append_element(body, r#" <div class="toast">hi</div>"#).unwrap();
        assert!(doc.has_class(toast, "toast").unwrap());
        assert_eq!(doc.parent(toast), Some(body));
    }

    #[test]
    fn test_dispatch_bubbles_to_ancestors() {
        let doc = InMemoryDocument::parse(PAGE);
        let target = doc.query_selector("#contact-placeholder").unwrap().unwrap();
        let body = doc.body();

        let on_target = Rc::new(Cell::new(0));
        let on_body = Rc::new(Cell::new(0));
        let seen_target = Rc::new(Cell::new(None));

        {
            let on_target = Rc::clone(&on_target);
            doc.add_listener(target, "componentLoaded", move |_| on_target.set(on_target.get() + 1))
                .unwrap();
        }
        {
            let on_body = Rc::clone(&on_body);
            let seen_target = Rc::clone(&seen_target);
            doc.add_listener(body, "componentLoaded", move |event| {
                on_body.set(on_body.get() + 1);
                seen_target.set(Some(event.target));
            })
            .unwrap();
        }
        doc.add_listener(body, "other", |_| panic!("wrong signal")).unwrap();

        let delivered = doc.dispatch(target, Signal::new("componentLoaded")).unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(on_target.get(), 1);
        assert_eq!(on_body.get(), 1);
        assert_eq!(seen_target.get(), Some(target));
        assert_eq!(doc.dispatched_named("componentLoaded").len(), 1);
    }

    #[test]
    fn test_non_bubbling_signal_stays_on_target() {
        let doc = InMemoryDocument::parse(PAGE);
        let target = doc.query_selector("#other").unwrap().unwrap();
        let hits = Rc::new(Cell::new(0));
        {
            let hits = Rc::clone(&hits);
            doc.add_listener(doc.body(), "ping", move |_| hits.set(hits.get() + 1))
                .unwrap();
        }

        doc.dispatch(target, Signal::new("ping").non_bubbling()).unwrap();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_listener_may_query_document() {
        let doc = Rc::new(InMemoryDocument::parse(PAGE));
        let target = doc.query_selector("#contact-placeholder").unwrap().unwrap();
        let found = Rc::new(Cell::new(false));
        {
            let weak = Rc::downgrade(&doc);
            let found = Rc::clone(&found);
            doc.add_listener(target, "componentLoaded", move |_| {
                if let Some(doc) = weak.upgrade() {
                    found.set(doc.query_selector("#other").unwrap().is_some());
                }
            })
            .unwrap();
        }

        doc.dispatch(target, Signal::new("componentLoaded")).unwrap();
        assert!(found.get());
    }

    #[test]
    fn test_replaced_subtree_drops_listeners() {
        let doc = InMemoryDocument::parse(PAGE);
        let main = doc.query_selector("main").unwrap().unwrap();
        let inner = doc.query_selector("#other").unwrap().unwrap();
        doc.add_listener(inner, "x", |_| {}).unwrap();

        doc.set_inner_html(main, "<p>gone</p>").unwrap();
        assert!(!doc.contains(inner));
        assert!(matches!(
            doc.dispatch(inner, Signal::new("x")),
            Err(DomError::UnknownNode(_))
        ));
    }
}
