//! Template Attribute Parsing
//!
//! Two attribute forms are recognized, tried in this order:
//! - dynamic-argument bindings: `:[key]="v"`, `@[event]="h"`, `#[slot]`, `v-bind:[key]="v"`
//! - plain attributes: `name`, `name="v"`, `name='v'`, `name=v`
//!
//! `start`/`end` are character indices into the scanned fragment, with the
//! matching byte range kept alongside for slicing. An attribute's span starts
//! at its name (leading whitespace excluded) and ends after its value.

use super::scanner::{leading_whitespace_len, ByteSpan, Offset};
use super::unicode::is_word_char;
use memchr::memchr;
use serde::Serialize;

/// A parsed template attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Attribute name as written, including any binding prefix (`:label`, `@click`)
    pub name: String,
    /// Unquoted value, empty for bare attributes
    pub value: String,
    /// Character index of the first name character
    pub start: usize,
    /// Character index just past the value
    pub end: usize,
    #[serde(skip)]
    pub bytes: ByteSpan,
}

/// A successful attribute match against the unconsumed input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrMatch<'a> {
    /// Total bytes matched, leading whitespace included
    pub len: usize,
    /// Bytes of leading whitespace before the name
    pub leading: usize,
    pub name: &'a str,
    pub value: &'a str,
    /// The whole matched text, leading whitespace included
    pub text: &'a str,
}

impl AttrMatch<'_> {
    /// Build the owned attribute for a match that began at absolute offset `at`
    pub fn to_attribute(&self, at: Offset) -> Attribute {
        let start = at.after(&self.text[..self.leading]);
        let end = at.after(self.text);
        Attribute {
            name: self.name.to_string(),
            value: self.value.to_string(),
            start: start.char,
            end: end.char,
            bytes: ByteSpan::between(start, end),
        }
    }
}

/// Match one attribute at the start of `s`, dynamic form first
pub fn match_attribute(s: &str) -> Option<AttrMatch<'_>> {
    match_dynamic_attribute(s).or_else(|| match_plain_attribute(s))
}

/// Match `\s*(prefix[expr]rest)(=value)?`
pub fn match_dynamic_attribute(s: &str) -> Option<AttrMatch<'_>> {
    let leading = leading_whitespace_len(s);
    let body = &s[leading..];

    let prefix = binding_prefix_len(body)?;
    let after_prefix = &body[prefix..];
    let expr = after_prefix.strip_prefix('[')?;
    let close = dynamic_argument_close(expr)?;
    // prefix + '[' + expression + ']'
    let mut name_len = prefix + 1 + close + 1;
    name_len += attr_name_run(&body[name_len..]);

    Some(with_value(s, leading, name_len))
}

/// Match `\s*(name)(=value)?`
pub fn match_plain_attribute(s: &str) -> Option<AttrMatch<'_>> {
    let leading = leading_whitespace_len(s);
    let name_len = attr_name_run(&s[leading..]);
    if name_len == 0 {
        return None;
    }
    Some(with_value(s, leading, name_len))
}

fn with_value(s: &str, leading: usize, name_len: usize) -> AttrMatch<'_> {
    let name_end = leading + name_len;
    let name = &s[leading..name_end];
    match match_value(&s[name_end..]) {
        Some((value_len, value)) => AttrMatch {
            len: name_end + value_len,
            leading,
            name,
            value,
            text: &s[..name_end + value_len],
        },
        None => AttrMatch {
            len: name_end,
            leading,
            name,
            value: "",
            text: &s[..name_end],
        },
    }
}

/// Match `\s*=\s*("v"+|'v'+|bare)`, returning (length, value)
///
/// A run of repeated closing quotes is consumed with the value.
fn match_value(s: &str) -> Option<(usize, &str)> {
    let mut pos = leading_whitespace_len(s);
    if !s[pos..].starts_with('=') {
        return None;
    }
    pos += 1;
    pos += leading_whitespace_len(&s[pos..]);

    let rest = &s[pos..];
    let bytes = rest.as_bytes();
    match bytes.first() {
        Some(&quote @ (b'"' | b'\'')) => {
            let close = memchr(quote, &bytes[1..])? + 1;
            let value = &rest[1..close];
            let mut end = close + 1;
            while bytes.get(end) == Some(&quote) {
                end += 1;
            }
            Some((pos + end, value))
        }
        Some(_) => {
            let len = rest
                .char_indices()
                .find(|&(_, c)| !is_unquoted_value_char(c))
                .map_or(rest.len(), |(i, _)| i);
            if len == 0 {
                return None;
            }
            Some((pos + len, &rest[..len]))
        }
        None => None,
    }
}

/// `v-word:`, `@`, `:` or `#`
fn binding_prefix_len(s: &str) -> Option<usize> {
    if let Some(directive) = s.strip_prefix("v-") {
        let word = directive
            .char_indices()
            .find(|&(_, c)| !(is_word_char(c) || c == '-'))
            .map_or(directive.len(), |(i, _)| i);
        if word > 0 && directive[word..].starts_with(':') {
            return Some(2 + word + 1);
        }
        return None;
    }
    match s.as_bytes().first() {
        Some(b'@' | b':' | b'#') => Some(1),
        _ => None,
    }
}

/// Offset of the `]` closing a dynamic argument: the first `]` after at
/// least one character, with no `=` before it
fn dynamic_argument_close(expr: &str) -> Option<usize> {
    let mut chars = expr.char_indices();
    match chars.next() {
        Some((_, '=')) | None => return None,
        Some(_) => {}
    }
    for (i, c) in chars {
        match c {
            ']' => return Some(i),
            '=' => return None,
            _ => {}
        }
    }
    None
}

/// Length of a run of attribute-name characters
fn attr_name_run(s: &str) -> usize {
    s.char_indices()
        .find(|&(_, c)| !is_attr_name_char(c))
        .map_or(s.len(), |(i, _)| i)
}

#[inline]
fn is_attr_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
}

#[inline]
fn is_unquoted_value_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '\'' | '=' | '<' | '>' | '`')
}
