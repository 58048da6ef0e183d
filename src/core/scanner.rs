//! Cursor over template text plus the prefix patterns the tokenizer dispatches on
//!
//! Uses memchr for delimiter search with SIMD acceleration:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)
//!
//! Every pattern here is anchored at the start of the slice it is given,
//! mirroring a `^`-anchored match against the unconsumed input.

use super::unicode::qualified_name_len;
use memchr::{memchr, memmem};

pub const COMMENT_OPEN: &str = "<!--";
pub const COMMENT_CLOSE: &str = "-->";
pub const CONDITIONAL_OPEN: &str = "<![";
pub const CONDITIONAL_CLOSE: &str = "]>";

/// One point in the text, as a byte offset and as a character index
///
/// Records expose character indices. The byte offset is what Rust slicing needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub byte: usize,
    pub char: usize,
}

impl Offset {
    /// The offset reached after consuming `text` from here
    #[inline]
    pub fn after(self, text: &str) -> Offset {
        Offset {
            byte: self.byte + text.len(),
            char: self.char + text.chars().count(),
        }
    }
}

/// Byte range of a record in the scanned text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    #[inline]
    pub fn between(start: Offset, end: Offset) -> Self {
        ByteSpan {
            start: start.byte,
            end: end.byte,
        }
    }

    /// The spanned text; `text` must be the string that was scanned
    #[inline]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The only mutable parsing state: consumed offset into one fragment
///
/// `remaining().len() + position()` is constant for the cursor's lifetime.
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    chars: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Cursor {
            input,
            pos: 0,
            chars: 0,
        }
    }

    /// Absolute byte offset already consumed
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consumed offset in both units
    #[inline]
    pub fn offset(&self) -> Offset {
        Offset {
            byte: self.pos,
            char: self.chars,
        }
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Unconsumed text
    #[inline]
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Advance by n bytes, clamped to the end of input
    ///
    /// `n` must land on a char boundary; every match length does.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        let end = (self.pos + n).min(self.input.len());
        self.chars += self.input[self.pos..end].chars().count();
        self.pos = end;
    }

    /// Offset (relative to the cursor) of the next '<'
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        memchr(b'<', self.remaining().as_bytes())
    }

    /// Offset (relative to the cursor) of the next occurrence of `needle`
    #[inline]
    pub fn find_str(&self, needle: &str) -> Option<usize> {
        memmem::find(self.remaining().as_bytes(), needle.as_bytes())
    }
}

/// `<!--` at the start of `s`
#[inline]
pub fn is_comment(s: &str) -> bool {
    s.starts_with(COMMENT_OPEN)
}

/// `<![` at the start of `s`
#[inline]
pub fn is_conditional_comment(s: &str) -> bool {
    s.starts_with(CONDITIONAL_OPEN)
}

/// Match `</qname ...>`, returning the full match length
pub fn match_end_tag(s: &str) -> Option<usize> {
    let after = s.strip_prefix("</")?;
    let name_len = qualified_name_len(after);
    if name_len == 0 {
        return None;
    }
    let tail = &after[name_len..];
    memchr(b'>', tail.as_bytes()).map(|gt| 2 + name_len + gt + 1)
}

/// Match `<qname`, returning the name length (the match length is one more)
pub fn match_start_tag_open(s: &str) -> Option<usize> {
    let after = s.strip_prefix('<')?;
    match qualified_name_len(after) {
        0 => None,
        n => Some(n),
    }
}

/// Match optional whitespace then `/>` or `>`, returning the match length
pub fn match_tag_close(s: &str) -> Option<usize> {
    let ws = leading_whitespace_len(s);
    let rest = &s[ws..];
    if rest.starts_with("/>") {
        Some(ws + 2)
    } else if rest.starts_with('>') {
        Some(ws + 1)
    } else {
        None
    }
}

/// Whether `s` genuinely begins markup the tokenizer would act on
#[inline]
pub fn is_markup_start(s: &str) -> bool {
    match_end_tag(s).is_some()
        || match_start_tag_open(s).is_some()
        || is_comment(s)
        || is_conditional_comment(s)
}

/// Find where a text run ends, starting the search at the '<' at `from`
///
/// Each '<' that does not begin real markup is skipped. Returns `None` when
/// no genuine markup follows, meaning the rest of `s` is text.
pub fn find_text_end(s: &str, from: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut at = from;
    loop {
        if is_markup_start(&s[at..]) {
            return Some(at);
        }
        let next = memchr(b'<', &bytes[at + 1..])?;
        at += 1 + next;
    }
}

/// Byte length of leading whitespace
#[inline]
pub fn leading_whitespace_len(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_invariant() {
        let text = "<a>hello</a>";
        let mut cursor = Cursor::new(text);
        cursor.advance(3);
        assert_eq!(cursor.position() + cursor.remaining().len(), text.len());
        cursor.advance(100);
        assert!(cursor.is_eof());
        assert_eq!(cursor.position(), text.len());
    }

    #[test]
    fn test_cursor_counts_chars() {
        let text = "<i>名称</i>";
        let mut cursor = Cursor::new(text);
        cursor.advance(3 + "名称".len());
        assert_eq!(cursor.offset(), Offset { byte: 9, char: 5 });
        cursor.advance(100);
        assert_eq!(cursor.offset().char, text.chars().count());
    }

    #[test]
    fn test_offset_after_and_span() {
        let text = "名 a";
        let start = Offset::default().after("名 ");
        assert_eq!(start, Offset { byte: 4, char: 2 });
        let span = ByteSpan::between(start, start.after("a"));
        assert_eq!(span.slice(text), "a");
        assert_eq!(span.len(), 1);
    }

    #[test]
    fn test_find_tag_start() {
        let cursor = Cursor::new("hello <world>");
        assert_eq!(cursor.find_tag_start(), Some(6));
        assert_eq!(cursor.find_str("world"), Some(7));
    }

    #[test]
    fn test_end_tag() {
        assert_eq!(match_end_tag("</el-button>rest"), Some(12));
        assert_eq!(match_end_tag("</div  \n>"), Some(9));
        assert_eq!(match_end_tag("</ div>"), None);
        assert_eq!(match_end_tag("</div"), None);
    }

    #[test]
    fn test_start_tag_open() {
        assert_eq!(match_start_tag_open("<el-form-item label"), Some(12));
        assert_eq!(match_start_tag_open("< div"), None);
        assert_eq!(match_start_tag_open("<3"), None);
    }

    #[test]
    fn test_tag_close() {
        assert_eq!(match_tag_close(">"), Some(1));
        assert_eq!(match_tag_close("  />x"), Some(4));
        assert_eq!(match_tag_close(" / >"), None);
        assert_eq!(match_tag_close("a>"), None);
    }

    #[test]
    fn test_text_end_skips_stray_lt() {
        let s = "a < b <= c <span>";
        assert_eq!(find_text_end(s, 2), Some(11));
        assert_eq!(find_text_end("1 < 2", 2), None);
        assert_eq!(find_text_end("x <!-- c -->", 2), Some(2));
    }
}
