//! The word under the primary selection, for click-to-toggle terms

use crate::config::HighlightConfig;
use crate::span::Span;
use crate::util::{escape_regex_word, slice_chars, word_range_at};

/// Term for the selection `selection` in `text`
///
/// An empty selection expands to the enclosing word when `under_cursor` is
/// set. In regex mode the word is escaped so it matches itself, and wrapped
/// in `\b` anchors when `whole_word` is also set.
pub fn cursor_word(text: &str, selection: Span, config: &HighlightConfig) -> Option<String> {
    let range = if selection.is_empty() {
        if !config.under_cursor {
            return None;
        }
        word_range_at(text, selection.start)?
    } else {
        selection
    };

    let word = slice_chars(text, range);
    let word = word.trim();
    if word.is_empty() {
        return None;
    }

    if !config.use_regex {
        return Some(word.to_string());
    }

    let escaped = escape_regex_word(word);
    if config.whole_word {
        Some(format!("\\b{}\\b", escaped))
    } else {
        Some(escaped)
    }
}

/// Remove `word` from `tokens` if present, append it otherwise
///
/// Returns whether the word is now part of the list.
pub fn toggle_token(tokens: &mut Vec<String>, word: String) -> bool {
    match tokens.iter().position(|token| *token == word) {
        Some(idx) => {
            tokens.remove(idx);
            false
        }
        None => {
            tokens.push(word);
            true
        }
    }
}
