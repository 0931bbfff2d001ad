//! Selector parsing and matching
//!
//! Supports the subset the page script needs: type, `#id`, `.class`,
//! `*`, attribute presence / equality / prefix (`[a]`, `[a=v]`, `[a^=v]`),
//! descendant and child combinators, and comma-separated lists.

use super::{Document, NodeId};
use anyhow::{bail, Result};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
enum AttrMatch {
    Exists(String),
    Equals(String, String),
    Prefix(String, String),
}

impl AttrMatch {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let el = doc.element(node);
        match self {
            AttrMatch::Exists(name) => el.attribute(name).is_some(),
            AttrMatch::Equals(name, value) => el.attribute(name) == Some(value.as_str()),
            AttrMatch::Prefix(name, prefix) => el
                .attribute(name)
                .is_some_and(|v| v.starts_with(prefix.as_str())),
        }
    }
}

/// One compound selector such as `a.nav-link[href^="#"]`
#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let el = doc.element(node);
        if let Some(tag) = &self.tag {
            if !el.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| el.has_class(c))
            && self.attrs.iter().all(|a| a.matches(doc, node))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

/// Compounds joined by combinators, e.g. `.linkedin-content > *`
#[derive(Debug, Clone, PartialEq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.matches_at(doc, node, self.compounds.len() - 1)
    }

    // Right-to-left with backtracking over ancestors for descendant steps
    fn matches_at(&self, doc: &Document, node: NodeId, idx: usize) -> bool {
        if !self.compounds[idx].matches(doc, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|p| self.matches_at(doc, p, idx - 1)),
            Combinator::Descendant => doc
                .ancestors(node)
                .any(|a| self.matches_at(doc, a, idx - 1)),
        }
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parse a selector list. Invalid input (for example a bare `#`) is an error.
    pub fn parse(source: &str) -> Result<Self> {
        let mut alternatives = Vec::new();
        for part in source.split(',') {
            alternatives.push(parse_complex(part.trim(), source)?);
        }
        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    /// Selector for a single class, built without parsing
    pub fn class(name: &str) -> Self {
        Self {
            source: format!(".{}", name),
            alternatives: vec![Complex {
                compounds: vec![Compound {
                    classes: vec![name.to_string()],
                    ..Compound::default()
                }],
                combinators: Vec::new(),
            }],
        }
    }

    /// Whether `node` matches any alternative in the list
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, node))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_complex(input: &str, full: &str) -> Result<Complex> {
    if input.is_empty() {
        bail!("'{}' is not a valid selector: empty selector", full);
    }

    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;
    let mut pending: Option<Combinator> = None;

    while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            if !compounds.is_empty() && pending.is_none() {
                pending = Some(Combinator::Descendant);
            }
            pos += 1;
            continue;
        }
        if c == '>' {
            if compounds.is_empty() || pending == Some(Combinator::Child) {
                bail!("'{}' is not a valid selector: dangling '>'", full);
            }
            pending = Some(Combinator::Child);
            pos += 1;
            continue;
        }

        if !compounds.is_empty() {
            match pending.take() {
                Some(comb) => combinators.push(comb),
                None => bail!("'{}' is not a valid selector", full),
            }
        }
        let (compound, next) = parse_compound(&chars, pos, full)?;
        compounds.push(compound);
        pos = next;
    }

    if pending == Some(Combinator::Child) {
        bail!("'{}' is not a valid selector: dangling '>'", full);
    }

    Ok(Complex {
        compounds,
        combinators,
    })
}

fn parse_ident(chars: &[char], mut pos: usize) -> (String, usize) {
    let start = pos;
    while pos < chars.len() && is_ident_char(chars[pos]) {
        pos += 1;
    }
    (chars[start..pos].iter().collect(), pos)
}

fn parse_compound(chars: &[char], mut pos: usize, full: &str) -> Result<(Compound, usize)> {
    let mut compound = Compound::default();
    let mut any = false;

    if chars[pos] == '*' {
        pos += 1;
        any = true;
    } else if is_ident_char(chars[pos]) {
        let (tag, next) = parse_ident(chars, pos);
        compound.tag = Some(tag.to_ascii_lowercase());
        pos = next;
        any = true;
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' | '.' => {
                let marker = chars[pos];
                let (name, next) = parse_ident(chars, pos + 1);
                if name.is_empty() {
                    bail!(
                        "'{}' is not a valid selector: expected name after '{}'",
                        full,
                        marker
                    );
                }
                if marker == '#' {
                    compound.id = Some(name);
                } else {
                    compound.classes.push(name);
                }
                pos = next;
            }
            '[' => {
                let (attr, next) = parse_attr(chars, pos + 1, full)?;
                compound.attrs.push(attr);
                pos = next;
            }
            _ => break,
        }
        any = true;
    }

    if !any {
        bail!(
            "'{}' is not a valid selector: unexpected '{}'",
            full,
            chars[pos]
        );
    }
    Ok((compound, pos))
}

fn parse_attr(chars: &[char], pos: usize, full: &str) -> Result<(AttrMatch, usize)> {
    let (name, mut pos) = parse_ident(chars, pos);
    if name.is_empty() {
        bail!("'{}' is not a valid selector: empty attribute name", full);
    }

    let op = match chars.get(pos) {
        Some(']') => return Ok((AttrMatch::Exists(name), pos + 1)),
        Some('=') => {
            pos += 1;
            '='
        }
        Some('^') if chars.get(pos + 1) == Some(&'=') => {
            pos += 2;
            '^'
        }
        _ => bail!("'{}' is not a valid selector: bad attribute matcher", full),
    };

    let value = match chars.get(pos) {
        Some(&quote) if quote == '"' || quote == '\'' => {
            let start = pos + 1;
            let Some(len) = chars[start..].iter().position(|&c| c == quote) else {
                bail!("'{}' is not a valid selector: unterminated string", full);
            };
            pos = start + len + 1;
            chars[start..start + len].iter().collect::<String>()
        }
        _ => {
            let (value, next) = parse_ident(chars, pos);
            pos = next;
            value
        }
    };

    if chars.get(pos) != Some(&']') {
        bail!("'{}' is not a valid selector: expected ']'", full);
    }

    let matcher = if op == '=' {
        AttrMatch::Equals(name, value)
    } else {
        AttrMatch::Prefix(name, value)
    };
    Ok((matcher, pos + 1))
}
