//! CSS selector subset.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`
//! (quoted or bare), descendant (whitespace) and child (`>`) combinators, and
//! comma-separated lists.

use crate::DomError;

/// Attribute condition inside a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    /// `None` matches on presence only.
    pub value: Option<String>,
}

/// A compound selector, e.g. `input.field[type="email"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// Lowercased tag name; `None` for `*` or when omitted.
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
}

/// How a compound relates to the one on its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// Compounds joined by combinators, stored left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    pub combinators: Vec<Combinator>,
}

/// Comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

/// Element facts the matcher needs.
pub trait MatchTarget {
    /// Lowercased tag name.
    fn tag(&self) -> &str;
    /// Attribute value, empty string for valueless attributes.
    fn attribute(&self, name: &str) -> Option<&str>;

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}

impl CompoundSelector {
    /// Whether `element` satisfies every condition.
    pub fn matches(&self, element: &dyn MatchTarget) -> bool {
        if let Some(tag) = &self.tag {
            if element.tag() != tag.as_str() {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|a| match (&a.value, element.attribute(&a.name)) {
            (None, Some(_)) => true,
            (Some(want), Some(got)) => want == got,
            (_, None) => false,
        })
    }
}

impl ComplexSelector {
    /// Match against `element`. `ancestors` yields the element's ancestor
    /// elements from the nearest outwards.
    pub fn matches(&self, element: &dyn MatchTarget, ancestors: &[&dyn MatchTarget]) -> bool {
        let Some(last) = self.compounds.len().checked_sub(1) else {
            return false;
        };
        if !self.compounds[last].matches(element) {
            return false;
        }
        self.matches_left(last, ancestors)
    }

    /// Whether compounds `..index` match somewhere in `ancestors`.
    fn matches_left(&self, index: usize, ancestors: &[&dyn MatchTarget]) -> bool {
        if index == 0 {
            return true;
        }
        let (Some(compound), Some(combinator)) =
            (self.compounds.get(index - 1), self.combinators.get(index - 1))
        else {
            return false;
        };
        match combinator {
            Combinator::Child => match ancestors.first() {
                Some(parent) if compound.matches(*parent) => {
                    self.matches_left(index - 1, &ancestors[1..])
                }
                _ => false,
            },
            Combinator::Descendant => (0..ancestors.len()).any(|i| {
                compound.matches(ancestors[i]) && self.matches_left(index - 1, &ancestors[i + 1..])
            }),
        }
    }
}

impl SelectorList {
    /// Parse a selector list.
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let error = |reason: &str| DomError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let mut list = Vec::new();
        for part in split_top_level(input, ',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(error("empty selector"));
            }
            list.push(parse_complex(part).map_err(|reason| error(&reason))?);
        }
        Ok(Self(list))
    }

    /// Whether any selector in the list matches.
    pub fn matches(&self, element: &dyn MatchTarget, ancestors: &[&dyn MatchTarget]) -> bool {
        self.0.iter().any(|s| s.matches(element, ancestors))
    }
}

impl std::str::FromStr for SelectorList {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split on `sep` outside brackets and quotes.
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_complex(input: &str) -> Result<ComplexSelector, String> {
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut rest = input;

    loop {
        let trimmed = rest.trim_start();
        let had_space = trimmed.len() != rest.len();
        rest = trimmed;
        if rest.is_empty() {
            break;
        }

        if let Some(after) = rest.strip_prefix('>') {
            if compounds.is_empty() || pending == Some(Combinator::Child) {
                return Err("dangling '>' combinator".to_string());
            }
            pending = Some(Combinator::Child);
            rest = after;
            continue;
        }

        if !compounds.is_empty() {
            let combinator = match pending.take() {
                Some(c) => c,
                None if had_space => Combinator::Descendant,
                None => return Err(format!("unexpected input at '{}'", rest)),
            };
            combinators.push(combinator);
        }

        let (compound, remaining) = parse_compound(rest)?;
        compounds.push(compound);
        rest = remaining;
    }

    if pending.is_some() {
        return Err("dangling '>' combinator".to_string());
    }
    if compounds.is_empty() {
        return Err("empty selector".to_string());
    }
    Ok(ComplexSelector {
        compounds,
        combinators,
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len());
    (&s[..end], &s[end..])
}

fn parse_compound(input: &str) -> Result<(CompoundSelector, &str), String> {
    let mut compound = CompoundSelector::default();
    let mut rest = input;
    let mut any = false;

    if let Some(after) = rest.strip_prefix('*') {
        rest = after;
        any = true;
    } else {
        let (tag, after) = take_ident(rest);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
            rest = after;
            any = true;
        }
    }

    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some('#') => {
                let (id, after) = take_ident(chars.as_str());
                if id.is_empty() {
                    return Err("expected id after '#'".to_string());
                }
                compound.id = Some(id.to_string());
                rest = after;
            }
            Some('.') => {
                let (class, after) = take_ident(chars.as_str());
                if class.is_empty() {
                    return Err("expected class after '.'".to_string());
                }
                compound.classes.push(class.to_string());
                rest = after;
            }
            Some('[') => {
                let body = chars.as_str();
                let (attr, after) = parse_attribute(body)?;
                compound.attributes.push(attr);
                rest = after;
            }
            Some(c) if c.is_whitespace() || c == '>' => break,
            None => break,
            Some(c) => return Err(format!("unexpected character '{}'", c)),
        }
        any = true;
    }

    if !any {
        return Err("expected a selector".to_string());
    }
    Ok((compound, rest))
}

/// Parse the inside of `[...]`; `input` starts after the '['.
fn parse_attribute(input: &str) -> Result<(AttributeSelector, &str), String> {
    let input = input.trim_start();
    let (name, rest) = take_ident(input);
    if name.is_empty() {
        return Err("expected attribute name".to_string());
    }
    let rest = rest.trim_start();

    if let Some(after) = rest.strip_prefix(']') {
        return Ok((
            AttributeSelector {
                name: name.to_ascii_lowercase(),
                value: None,
            },
            after,
        ));
    }

    let Some(value_part) = rest.strip_prefix('=') else {
        return Err(format!("unsupported attribute operator in '[{}'", input));
    };
    let value_part = value_part.trim_start();

    let (value, rest) = match value_part.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let body = &value_part[1..];
            let end = body.find(q).ok_or("unterminated attribute value")?;
            (&body[..end], &body[end + 1..])
        }
        _ => take_ident(value_part),
    };

    let Some(after) = rest.trim_start().strip_prefix(']') else {
        return Err("expected ']'".to_string());
    };
    Ok((
        AttributeSelector {
            name: name.to_ascii_lowercase(),
            value: Some(value.to_string()),
        },
        after,
    ))
}
