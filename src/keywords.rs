//! Permanent keyword highlights
//!
//! Each entry of `permanent_keyword_map` is drawn under its own key,
//! `highlight_keyword_{i}` with `i` the entry's position in the map, so a
//! reordered or shortened map replaces exactly the keys it used before.

use crate::config::KeywordMapping;
use crate::error::HighlightError;
use crate::host::EditorView;
use crate::matching::{FindFlags, Matcher};
use crate::span::Span;

/// Prefix of the keyword decoration keys
pub const KEYWORD_KEY_PREFIX: &str = "highlight_keyword_";

pub fn keyword_key(index: usize) -> String {
    format!("{}{}", KEYWORD_KEY_PREFIX, index)
}

/// Spans found for one keyword mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub index: usize,
    pub color: String,
    pub spans: Vec<Span>,
}

/// Find every mapping's occurrences in `text`
///
/// Mappings with an empty keyword or a pattern that fails to compile get
/// no spans; the compile error is returned as a diagnostic.
pub fn match_keywords(
    mappings: &[KeywordMapping],
    text: &str,
    matcher: &dyn Matcher,
) -> (Vec<KeywordMatch>, Vec<HighlightError>) {
    let mut diagnostics = Vec::new();
    let matches = mappings
        .iter()
        .enumerate()
        .map(|(index, mapping)| {
            let spans = if mapping.keyword.is_empty() {
                Vec::new()
            } else {
                let flags = FindFlags {
                    literal: mapping.literal,
                    ignore_case: mapping.ignore_case,
                };
                matcher
                    .find_all(text, &mapping.keyword, flags)
                    .unwrap_or_else(|err| {
                        tracing::warn!("Skipping keyword {:?}: {}", mapping.keyword, err);
                        diagnostics.push(err);
                        Vec::new()
                    })
            };
            KeywordMatch {
                index,
                color: mapping.color.clone(),
                spans,
            }
        })
        .collect();
    (matches, diagnostics)
}

/// Draw keyword matches and erase keys beyond them
///
/// `previous_count` is the number of keys the last pass used. Returns the
/// number of keys now in use.
pub fn apply_keywords(view: &mut dyn EditorView, matches: &[KeywordMatch], previous_count: usize) -> usize {
    for keyword in matches {
        let key = keyword_key(keyword.index);
        if keyword.spans.is_empty() {
            view.remove_decoration(&key);
        } else {
            view.apply_decoration(&key, &keyword.spans, &keyword.color);
        }
    }
    for index in matches.len()..previous_count {
        view.remove_decoration(&keyword_key(index));
    }
    matches.len()
}
