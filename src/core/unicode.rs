//! Character classes for template names and identifying text
//!
//! Tag names follow an NCName-like grammar: an ASCII letter or underscore,
//! then letters, digits, `-`, `.`, `_` and a set of extended Unicode ranges.
//! Characters outside the Basic Multilingual Plane are never name characters.

/// Check if char may start a tag name segment
#[inline]
pub fn is_name_start_char(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '_')
}

/// Check if char may continue a tag name segment
#[inline]
pub fn is_name_char(c: char) -> bool {
    match c {
        'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' => true,
        c if c.is_ascii() => false,
        c => is_extended_name_char(c),
    }
}

#[inline]
fn is_extended_name_char(c: char) -> bool {
    matches!(c,
        '\u{00B7}'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{203F}'..='\u{2040}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
    )
}

/// Characters kept in a button's identifying text: CJK unified ideographs
/// (U+4E00..=U+9FA5), ASCII letters and ASCII digits
#[inline]
pub fn is_identifying_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('\u{4E00}'..='\u{9FA5}').contains(&c)
}

/// Word characters for directive prefixes (`v-on:`, `v-slot:`)
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Length in bytes of a name segment at the start of `s`, 0 if none
pub fn name_segment_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if is_name_start_char(c) => {}
        _ => return 0,
    }
    for (i, c) in chars {
        if !is_name_char(c) {
            return i;
        }
    }
    s.len()
}

/// Length in bytes of a qualified name (`ns:local` or `local`) at the start of `s`
pub fn qualified_name_len(s: &str) -> usize {
    let first = name_segment_len(s);
    if first == 0 {
        return 0;
    }
    let rest = &s[first..];
    if let Some(after_colon) = rest.strip_prefix(':') {
        let second = name_segment_len(after_colon);
        if second > 0 {
            return first + 1 + second;
        }
    }
    first
}
