//! Template Tokenizer - single forward pass over one fragment
//!
//! Each step tries, in priority order:
//! - comment skip (`<!-- ... -->`)
//! - conditional comment skip (`<![ ... ]>`)
//! - closing tag skip (`</name ...>`)
//! - start tag parse (`<name attr=... >`), handed to a [`TagHandler`]
//! - text run up to the next genuine markup
//!
//! No tree is built. A start tag whose attributes do not parse becomes text
//! from the '<' up to the next genuine markup. A step that consumes nothing
//! (an unterminated comment) ends the pass instead of raising an error.

use super::attributes::{match_attribute, Attribute};
use super::scanner::{
    find_text_end, is_comment, is_conditional_comment, match_end_tag, match_start_tag_open,
    match_tag_close, ByteSpan, Cursor, COMMENT_CLOSE, CONDITIONAL_CLOSE,
};
use serde::Serialize;

/// A parsed start tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub name: String,
    pub lower_name: String,
    pub attributes: Vec<Attribute>,
    /// Character index of the opening '<'
    pub start: usize,
    /// Character index just past the closing '>'
    pub end: usize,
    #[serde(skip)]
    pub bytes: ByteSpan,
}

impl Tag {
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Receives start tags in source order
pub trait TagHandler {
    /// Whether the text between this tag and its nearest `</name` should be
    /// captured and consumed instead of tokenized
    fn captures_inner_content(&self, _tag: &Tag) -> bool {
        false
    }

    /// Called once per successfully parsed start tag
    ///
    /// # Arguments
    /// * `tag` - The parsed tag with absolute offsets
    /// * `inner` - Captured inner content, when requested and non-empty
    fn start_tag(&mut self, tag: Tag, inner: Option<&str>);
}

/// How a pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Termination {
    /// All input consumed
    Exhausted,
    /// No step could make progress at character index `offset`
    Stalled { offset: usize },
}

impl Termination {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Termination::Exhausted)
    }
}

/// Bytes consumed by each kind of step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub comments: usize,
    pub conditional_comments: usize,
    pub end_tags: usize,
    pub start_tags: usize,
    pub inner_content: usize,
    pub text: usize,
}

impl ScanStats {
    pub fn total(&self) -> usize {
        self.comments
            + self.conditional_comments
            + self.end_tags
            + self.start_tags
            + self.inner_content
            + self.text
    }
}

/// Tokenizer over one fragment
pub struct Tokenizer<'a> {
    cursor: Cursor<'a>,
    stats: ScanStats,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            cursor: Cursor::new(input),
            stats: ScanStats::default(),
        }
    }

    /// Get the current byte position in the input
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Drive the cursor to the end of input or until no step makes progress
    pub fn run<H: TagHandler>(&mut self, handler: &mut H) -> Termination {
        while !self.cursor.is_eof() {
            let before = self.cursor.offset();
            self.step(handler);
            if self.cursor.position() == before.byte {
                tracing::debug!(
                    offset = before.char,
                    remaining = self.cursor.remaining().len(),
                    "tokenizer stalled"
                );
                return Termination::Stalled { offset: before.char };
            }
        }
        Termination::Exhausted
    }

    fn step<H: TagHandler>(&mut self, handler: &mut H) {
        let rest = self.cursor.remaining();

        if rest.starts_with('<') {
            if is_comment(rest) {
                if let Some(end) = self.cursor.find_str(COMMENT_CLOSE) {
                    let len = end + COMMENT_CLOSE.len();
                    self.cursor.advance(len);
                    self.stats.comments += len;
                    return;
                }
            }

            if is_conditional_comment(rest) {
                if let Some(end) = self.cursor.find_str(CONDITIONAL_CLOSE) {
                    let len = end + CONDITIONAL_CLOSE.len();
                    self.cursor.advance(len);
                    self.stats.conditional_comments += len;
                    return;
                }
            }

            if let Some(len) = match_end_tag(rest) {
                self.cursor.advance(len);
                self.stats.end_tags += len;
                return;
            }

            let before = self.cursor.position();
            if let Some(tag) = self.parse_start_tag() {
                self.dispatch(tag, handler);
                return;
            }
            // The tag name and any attributes matched before the failure stay
            // consumed, as text
            self.stats.text += self.cursor.position() - before;
        }

        self.consume_text();
    }

    /// Parse `<name attrs... (/)>` at the cursor
    ///
    /// On failure `None` is returned and the cursor stays after the last
    /// piece that matched.
    fn parse_start_tag(&mut self) -> Option<Tag> {
        let start = self.cursor.offset();
        let name_len = match_start_tag_open(self.cursor.remaining())?;
        let name = self.cursor.slice(start.byte + 1, start.byte + 1 + name_len);
        self.cursor.advance(1 + name_len);

        let mut attributes = Vec::new();
        loop {
            let rest = self.cursor.remaining();

            if let Some(len) = match_tag_close(rest) {
                self.cursor.advance(len);
                let end = self.cursor.offset();
                return Some(Tag {
                    name: name.to_string(),
                    lower_name: name.to_lowercase(),
                    attributes,
                    start: start.char,
                    end: end.char,
                    bytes: ByteSpan::between(start, end),
                });
            }

            let m = match_attribute(rest)?;
            attributes.push(m.to_attribute(self.cursor.offset()));
            self.cursor.advance(m.len);
        }
    }

    fn dispatch<H: TagHandler>(&mut self, tag: Tag, handler: &mut H) {
        self.stats.start_tags += tag.bytes.len();
        let inner = if handler.captures_inner_content(&tag) {
            self.take_inner_content(&tag.name)
        } else {
            None
        };
        handler.start_tag(tag, inner);
    }

    /// Consume everything up to the nearest `</name` that begins real markup
    fn take_inner_content(&mut self, name: &str) -> Option<&'a str> {
        let closing = format!("</{name}");
        let found = self.cursor.find_str(&closing)?;
        let rest = self.cursor.remaining();
        let len = find_text_end(rest, found).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.cursor.advance(len);
        self.stats.inner_content += len;
        Some(&rest[..len])
    }

    fn consume_text(&mut self) {
        let rest = self.cursor.remaining();
        let len = match self.cursor.find_tag_start() {
            Some(lt) => find_text_end(rest, lt).unwrap_or(rest.len()),
            None => rest.len(),
        };
        self.cursor.advance(len);
        self.stats.text += len;
    }
}
