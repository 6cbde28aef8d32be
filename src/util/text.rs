//! Text utilities: word boundaries, size limits and regex escaping

use crate::span::Span;

/// Check if a character is a punctuation/symbol boundary (not whitespace)
pub fn is_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '/' | ':'
            | ','
            | '.'
            | '-'
            | '('
            | ')'
            | '{'
            | '}'
            | '['
            | ']'
            | ';'
            | '"'
            | '\''
            | '<'
            | '>'
            | '='
            | '+'
            | '*'
            | '&'
            | '|'
            | '!'
            | '@'
            | '#'
            | '$'
            | '%'
            | '^'
            | '~'
            | '`'
            | '\\'
            | '?'
    )
}

/// Character type used to find word extents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharType {
    /// Whitespace characters
    Whitespace,
    /// Alphanumeric characters (word characters)
    WordChar,
    /// Punctuation and symbols
    Punctuation,
}

/// Get the character type for word expansion
pub fn char_type(ch: char) -> CharType {
    if ch.is_whitespace() {
        CharType::Whitespace
    } else if is_punctuation(ch) {
        CharType::Punctuation
    } else {
        CharType::WordChar
    }
}

/// Find the word enclosing the character offset `offset`
///
/// A caret sitting right after a word (e.g. at the end of the buffer or before
/// a space) expands to that word. Returns `None` when the caret is surrounded
/// by whitespace.
pub fn word_range_at(text: &str, offset: usize) -> Option<Span> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return None;
    }

    let offset = offset.min(chars.len());
    let on_word = |idx: usize| chars.get(idx).map(|&c| char_type(c) != CharType::Whitespace);

    let anchor = if on_word(offset).unwrap_or(false) {
        offset
    } else if offset > 0 && on_word(offset - 1).unwrap_or(false) {
        offset - 1
    } else {
        return None;
    };

    let target_type = char_type(chars[anchor]);
    let mut start = anchor;
    let mut end = anchor;

    while start > 0 && char_type(chars[start - 1]) == target_type {
        start -= 1;
    }
    while end < chars.len() && char_type(chars[end]) == target_type {
        end += 1;
    }

    Some(Span::new(start, end))
}

/// Extract the characters covered by `span`
pub fn slice_chars(text: &str, span: Span) -> String {
    text.chars()
        .skip(span.start)
        .take(span.len())
        .collect()
}

/// Truncate `text` to at most `max_bytes`, backing off to a char boundary
pub fn truncate_to_byte_limit(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Escape a word so it matches itself when used as a regular expression
///
/// Spaces become `\ ` so the word survives a later whitespace split, and
/// tabs/newlines become their escape sequences.
pub fn escape_regex_word(word: &str) -> String {
    let escaped = regex::escape(word);
    let mut out = String::with_capacity(escaped.len());
    for ch in escaped.chars() {
        match ch {
            ' ' => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}
