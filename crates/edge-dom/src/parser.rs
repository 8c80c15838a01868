//! Lenient markup parser.
//!
//! Produces a node tree that serializes back to the exact input text: each
//! element keeps its original opening tag, text is stored undecoded, and
//! comments, doctypes and stray closing tags are kept as raw markup.

/// Elements that never have content or a closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is text up to the matching closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedNode {
    Element(ParsedElement),
    /// Undecoded text.
    Text(String),
    /// Comment, doctype or stray closing tag, kept verbatim.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    /// Opening tag exactly as written.
    pub raw_open: String,
    /// Whether an explicit closing tag was seen.
    pub closed: bool,
    pub children: Vec<ParsedNode>,
}

/// Parse a markup fragment into top-level nodes.
pub(crate) fn parse_fragment(input: &str) -> Vec<ParsedNode> {
    let mut parser = Parser {
        input,
        pos: 0,
        stack: Vec::new(),
        roots: Vec::new(),
    };
    parser.run();
    parser.roots
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    stack: Vec<ParsedElement>,
    roots: Vec<ParsedNode>,
}

impl<'a> Parser<'a> {
    fn run(&mut self) {
        let input = self.input;
        while self.pos < input.len() {
            let rest = &input[self.pos..];
            match next_tag_start(rest) {
                Some(0) => self.tag(),
                Some(offset) => {
                    self.push_text(&rest[..offset]);
                    self.pos += offset;
                }
                None => {
                    self.push_text(rest);
                    self.pos = input.len();
                }
            }
        }

        while let Some(mut open) = self.stack.pop() {
            open.closed = false;
            self.push(ParsedNode::Element(open));
        }
    }

    fn push(&mut self, node: ParsedNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Merge adjacent text so a lone '<' does not split a text node.
        let target = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        if let Some(ParsedNode::Text(prev)) = target.last_mut() {
            prev.push_str(text);
        } else {
            target.push(ParsedNode::Text(text.to_string()));
        }
    }

    fn tag(&mut self) {
        let input = self.input;
        let rest = &input[self.pos..];

        if rest.starts_with("<!--") {
            let end = rest[4..].find("-->").map(|i| i + 4 + 3).unwrap_or(rest.len());
            self.push(ParsedNode::Raw(rest[..end].to_string()));
            self.pos += end;
            return;
        }

        let end = find_tag_end(rest).map(|i| i + 1).unwrap_or(rest.len());
        let raw = &rest[..end];
        self.pos += end;

        if raw.starts_with("<!") || raw.starts_with("<?") {
            self.push(ParsedNode::Raw(raw.to_string()));
        } else if let Some(close) = raw.strip_prefix("</") {
            let name = close.trim_end_matches('>').trim().to_ascii_lowercase();
            self.close(&name, raw);
        } else {
            self.open(raw);
        }
    }

    fn open(&mut self, raw: &str) {
        let inner = raw.trim_start_matches('<').trim_end_matches('>');
        let self_closing = inner.ends_with('/');
        let inner = inner.trim_end_matches('/');

        let name_len = inner
            .find(|c: char| c.is_whitespace() || c == '/')
            .unwrap_or(inner.len());
        let tag = inner[..name_len].to_ascii_lowercase();
        let attrs = parse_attributes(&inner[name_len..]);

        let element = ParsedElement {
            tag: tag.clone(),
            attrs,
            raw_open: raw.to_string(),
            closed: false,
            children: Vec::new(),
        };

        if self_closing || is_void(&tag) {
            self.push(ParsedNode::Element(element));
            return;
        }

        self.stack.push(element);

        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let input = self.input;
            let rest = &input[self.pos..];
            let end = find_ascii_case_insensitive(rest, &format!("</{}", tag)).unwrap_or(rest.len());
            let text = &rest[..end];
            self.push_text(text);
            self.pos += end;
        }
    }

    fn close(&mut self, name: &str, raw: &str) {
        let Some(depth) = self.stack.iter().rposition(|e| e.tag == name) else {
            self.push(ParsedNode::Raw(raw.to_string()));
            return;
        };

        while self.stack.len() > depth + 1 {
            if let Some(mut unclosed) = self.stack.pop() {
                unclosed.closed = false;
                self.push(ParsedNode::Element(unclosed));
            }
        }
        if let Some(mut matched) = self.stack.pop() {
            matched.closed = true;
            self.push(ParsedNode::Element(matched));
        }
    }
}

/// Offset of the next '<' that starts a tag, comment or declaration.
fn next_tag_start(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut from = 0;
    while let Some(i) = s[from..].find('<') {
        let at = from + i;
        match bytes.get(at + 1) {
            Some(b) if b.is_ascii_alphabetic() || *b == b'/' || *b == b'!' || *b == b'?' => {
                return Some(at)
            }
            _ => from = at + 1,
        }
    }
    None
}

/// Index of the '>' closing the tag at the start of `s`, skipping quoted values.
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, b) in s.bytes().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Parse `name="value" flag other='x' bare=y` into decoded pairs.
fn parse_attributes(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = s;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            break;
        }

        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let end = body.find(q).unwrap_or(body.len());
                    rest = body.get(end + 1..).unwrap_or("");
                    decode_entities(&body[..end])
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    rest = &after_eq[end..];
                    decode_entities(&after_eq[..end])
                }
            }
        } else {
            String::new()
        };

        if !name.is_empty() {
            attrs.push((name, value));
        }
    }

    attrs
}

/// Decode the common named entities and numeric character references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                "times" => Some('\u{d7}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi + 1))
        });

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape text content for insertion as markup.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Escape an attribute value for a double-quoted attribute.
pub fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &ParsedNode) -> &ParsedElement {
        match node {
            ParsedNode::Element(e) => e,
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_elements() {
        let nodes = parse_fragment(r#"<section id="contact"><form class="a b"><input required></form></section>"#);
        assert_eq!(nodes.len(), 1);

        let section = element(&nodes[0]);
        assert_eq!(section.tag, "section");
        assert!(section.closed);
        assert_eq!(section.attrs, vec![("id".to_string(), "contact".to_string())]);

        let form = element(&section.children[0]);
        assert_eq!(form.tag, "form");
        let input = element(&form.children[0]);
        assert_eq!(input.tag, "input");
        assert_eq!(input.attrs, vec![("required".to_string(), String::new())]);
        assert!(input.children.is_empty());
    }

    #[test]
    fn test_parse_keeps_raw_open_tag() {
        let nodes = parse_fragment("<DIV  class='x'  data-n=3>hi</DIV>");
        let div = element(&nodes[0]);
        assert_eq!(div.tag, "div");
        assert_eq!(div.raw_open, "<DIV  class='x'  data-n=3>");
        assert_eq!(
            div.attrs,
            vec![
                ("class".to_string(), "x".to_string()),
                ("data-n".to_string(), "3".to_string())
            ]
        );
        assert_eq!(div.children, vec![ParsedNode::Text("hi".to_string())]);
    }

    #[test]
    fn test_parse_comment_and_doctype_raw() {
        let nodes = parse_fragment("<!DOCTYPE html><!-- a > b --><p>x</p>");
        assert_eq!(nodes[0], ParsedNode::Raw("<!DOCTYPE html>".to_string()));
        assert_eq!(nodes[1], ParsedNode::Raw("<!-- a > b -->".to_string()));
        assert_eq!(element(&nodes[2]).tag, "p");
    }

    #[test]
    fn test_parse_unclosed_element() {
        let nodes = parse_fragment("<ul><li>one<li>two</ul>");
        let ul = element(&nodes[0]);
        assert!(ul.closed);
        let first = element(&ul.children[0]);
        assert!(!first.closed);
        // Without implied end tags, the second li nests inside the first.
        let second = element(&first.children[1]);
        assert_eq!(second.tag, "li");
    }

    #[test]
    fn test_parse_stray_close_tag_kept() {
        let nodes = parse_fragment("a</b>c");
        assert_eq!(
            nodes,
            vec![
                ParsedNode::Text("a".to_string()),
                ParsedNode::Raw("</b>".to_string()),
                ParsedNode::Text("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_textarea_raw_text() {
        let nodes = parse_fragment("<textarea name=m><b>not a tag</b></textarea>");
        let textarea = element(&nodes[0]);
        assert!(textarea.closed);
        assert_eq!(
            textarea.children,
            vec![ParsedNode::Text("<b>not a tag</b>".to_string())]
        );
    }

    #[test]
    fn test_lone_less_than_is_text() {
        let nodes = parse_fragment("<p>1 < 2</p>");
        let p = element(&nodes[0]);
        assert_eq!(p.children, vec![ParsedNode::Text("1 < 2".to_string())]);
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let nodes = parse_fragment(r#"<a title="x > y">t</a>"#);
        let a = element(&nodes[0]);
        assert_eq!(a.attrs[0].1, "x > y");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&#10003; &#x2717;"), "\u{2713} \u{2717}");
        assert_eq!(decode_entities("&times;"), "\u{d7}");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("<a & b>"), "&lt;a &amp; b&gt;");
        assert_eq!(escape_attribute(r#"say "hi""#), "say &quot;hi&quot;");
    }
}
