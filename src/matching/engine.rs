//! Match computation: terms + buffer text → colored match groups

use std::collections::HashSet;

use serde::Serialize;

use super::matcher::{FindFlags, Matcher};
use crate::error::HighlightError;
use crate::span::{Span, SpanSet};
use crate::spec::Term;

/// Literal terms shorter than this (in chars, after trimming) are skipped
pub const MIN_LITERAL_CHARS: usize = 2;

/// Flags that affect how terms are matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Evaluate literal words as regular expressions
    pub use_regex: bool,
    pub ignore_case: bool,
}

/// What a match group was produced from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupKind {
    /// A literal word and every span it matched
    Literal { text: String, spans: Vec<Span> },
    /// A pattern and, per match occurrence, its non-empty capture spans
    Pattern {
        source: String,
        occurrences: Vec<Vec<Span>>,
    },
}

/// One color-class unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchGroup {
    /// Position among the groups of one pass (also the decoration key suffix)
    pub index: usize,
    /// `index % palette_len`
    pub color_class: usize,
    #[serde(flatten)]
    pub kind: GroupKind,
}

impl MatchGroup {
    /// All spans of the group in draw order
    pub fn spans(&self) -> Vec<Span> {
        match &self.kind {
            GroupKind::Literal { spans, .. } => spans.clone(),
            GroupKind::Pattern { occurrences, .. } => occurrences.iter().flatten().copied().collect(),
        }
    }

    pub fn label(&self) -> &str {
        match &self.kind {
            GroupKind::Literal { text, .. } => text,
            GroupKind::Pattern { source, .. } => source,
        }
    }
}

/// Output of one match computation
#[derive(Debug, Clone, Default)]
pub struct Matches {
    pub groups: Vec<MatchGroup>,
    /// Recoverable problems, e.g. patterns that failed to compile
    pub diagnostics: Vec<HighlightError>,
}

impl Matches {
    /// Deduplicated union of every group's spans
    pub fn span_set(&self) -> SpanSet {
        self.groups.iter().flat_map(|group| group.spans()).collect()
    }

    /// Spans each group should draw so that no span is drawn twice
    ///
    /// A span claimed by several groups stays with the last group that
    /// claims it, matching the order decorations are issued in.
    pub fn draw_lists(&self) -> Vec<Vec<Span>> {
        let mut claimed = HashSet::new();
        let mut lists: Vec<Vec<Span>> = self
            .groups
            .iter()
            .rev()
            .map(|group| {
                let mut spans: Vec<Span> = group
                    .spans()
                    .into_iter()
                    .rev()
                    .filter(|span| claimed.insert(*span))
                    .collect();
                spans.reverse();
                spans
            })
            .collect();
        lists.reverse();
        lists
    }
}

/// Turns terms into match groups using a [`Matcher`]
pub struct MatchEngine<'m> {
    matcher: &'m dyn Matcher,
    options: MatchOptions,
    palette_len: usize,
}

impl<'m> MatchEngine<'m> {
    pub fn new(matcher: &'m dyn Matcher, options: MatchOptions, palette_len: usize) -> Self {
        Self {
            matcher,
            options,
            palette_len: palette_len.max(1),
        }
    }

    /// Compute match groups for `terms` against `text`
    ///
    /// Groups follow term order. Short and repeated literals are skipped, a
    /// pattern without matches gets no group, and a term that fails to
    /// compile is dropped without affecting the others.
    pub fn compute(&self, terms: &[Term], text: &str) -> Matches {
        let mut matches = Matches::default();
        let mut seen: HashSet<&Term> = HashSet::new();

        for term in terms {
            if !seen.insert(term) {
                continue;
            }

            let kind = match term {
                Term::Literal { text: word } => {
                    if word.trim().chars().count() < MIN_LITERAL_CHARS {
                        continue;
                    }
                    let flags = FindFlags {
                        literal: !self.options.use_regex,
                        ignore_case: self.options.ignore_case,
                    };
                    match self.matcher.find_all(text, word, flags) {
                        Ok(spans) => GroupKind::Literal {
                            text: word.clone(),
                            spans,
                        },
                        Err(err) => {
                            tracing::warn!("Dropping term {:?}: {}", word, err);
                            matches.diagnostics.push(err);
                            continue;
                        }
                    }
                }
                Term::Pattern { source, .. } => {
                    match self.matcher.captures(text, source, self.options.ignore_case) {
                        Ok(found) if found.is_empty() => continue,
                        Ok(found) => GroupKind::Pattern {
                            source: source.clone(),
                            occurrences: found
                                .into_iter()
                                .map(|m| {
                                    m.groups
                                        .into_iter()
                                        .flatten()
                                        .filter(|span| !span.is_empty())
                                        .collect()
                                })
                                .collect(),
                        },
                        Err(err) => {
                            tracing::warn!("Dropping pattern {:?}: {}", source, err);
                            matches.diagnostics.push(err);
                            continue;
                        }
                    }
                }
            };

            let index = matches.groups.len();
            matches.groups.push(MatchGroup {
                index,
                color_class: index % self.palette_len,
                kind,
            });
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::RegexMatcher;
    use crate::spec::parse;

    fn compute(spec: &str, text: &str, options: MatchOptions) -> Matches {
        let terms = parse(spec, options.use_regex).into_terms();
        MatchEngine::new(&RegexMatcher, options, 6).compute(&terms, text)
    }

    #[test]
    fn test_literal_matches_every_occurrence() {
        let matches = compute("foo", "foo bar foo baz", MatchOptions::default());
        assert_eq!(matches.groups.len(), 1);
        assert_eq!(matches.groups[0].color_class, 0);
        assert_eq!(
            matches.groups[0].spans(),
            vec![Span::new(0, 3), Span::new(8, 11)]
        );
    }

    #[test]
    fn test_literal_is_substring_not_word_match() {
        let matches = compute("oo", "foo boo", MatchOptions::default());
        assert_eq!(matches.groups[0].spans(), vec![Span::new(1, 3), Span::new(5, 7)]);
    }

    #[test]
    fn test_pattern_captures_then_literal() {
        let options = MatchOptions {
            use_regex: true,
            ignore_case: false,
        };
        let matches = compute("/f(o+)/ bar", "foo bar bar", options);
        assert_eq!(matches.groups.len(), 2);
        assert_eq!(
            matches.groups[0].kind,
            GroupKind::Pattern {
                source: "f(o+)".to_string(),
                occurrences: vec![vec![Span::new(1, 3)]],
            }
        );
        assert_eq!(
            matches.groups[1].kind,
            GroupKind::Literal {
                text: "bar".to_string(),
                spans: vec![Span::new(4, 7), Span::new(8, 11)],
            }
        );
        assert_eq!(matches.groups[1].color_class, 1);
    }

    #[test]
    fn test_single_char_literal_is_skipped() {
        let matches = compute("a", "a a a", MatchOptions::default());
        assert!(matches.groups.is_empty());
        assert!(matches.span_set().is_empty());
    }

    #[test]
    fn test_duplicate_literals_collapse() {
        let matches = compute("foo bar foo", "foo bar", MatchOptions::default());
        let labels: Vec<&str> = matches.groups.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["foo", "bar"]);
    }

    #[test]
    fn test_literal_without_matches_still_takes_a_color() {
        let matches = compute("zzz foo", "foo", MatchOptions::default());
        assert_eq!(matches.groups.len(), 2);
        assert!(matches.groups[0].spans().is_empty());
        assert_eq!(matches.groups[1].color_class, 1);
    }

    #[test]
    fn test_pattern_without_matches_has_no_group() {
        let options = MatchOptions {
            use_regex: true,
            ignore_case: false,
        };
        let matches = compute("/x(y)/ foo", "foo", options);
        assert_eq!(matches.groups.len(), 1);
        assert_eq!(matches.groups[0].label(), "foo");
    }

    #[test]
    fn test_pattern_without_groups_draws_nothing() {
        let options = MatchOptions {
            use_regex: true,
            ignore_case: false,
        };
        let matches = compute("/foo/", "foo foo", options);
        assert_eq!(matches.groups.len(), 1);
        assert_eq!(
            matches.groups[0].kind,
            GroupKind::Pattern {
                source: "foo".to_string(),
                occurrences: vec![vec![], vec![]],
            }
        );
        assert!(matches.span_set().is_empty());
    }

    #[test]
    fn test_bad_pattern_is_dropped_others_proceed() {
        let options = MatchOptions {
            use_regex: true,
            ignore_case: false,
        };
        let matches = compute("/a(/ /(b)/ cc", "b cc", options);
        assert_eq!(matches.groups.len(), 2);
        assert_eq!(matches.diagnostics.len(), 1);
        assert!(matches!(
            matches.diagnostics[0],
            HighlightError::PatternCompile { .. }
        ));
    }

    #[test]
    fn test_color_classes_wrap_around_palette() {
        let terms: Vec<Term> = ["aa", "bb", "cc", "dd"].iter().map(|w| Term::literal(*w)).collect();
        let matches =
            MatchEngine::new(&RegexMatcher, MatchOptions::default(), 3).compute(&terms, "");
        let classes: Vec<usize> = matches.groups.iter().map(|g| g.color_class).collect();
        assert_eq!(classes, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_shared_span_drawn_by_last_group_only() {
        let options = MatchOptions {
            use_regex: true,
            ignore_case: false,
        };
        let matches = compute("/(foo)/ foo", "foo x foo", options);
        let lists = matches.draw_lists();
        assert!(lists[0].is_empty());
        assert_eq!(lists[1], vec![Span::new(0, 3), Span::new(6, 9)]);
        assert_eq!(matches.span_set().len(), 2);
    }

    #[test]
    fn test_ignore_case_literal() {
        let options = MatchOptions {
            use_regex: false,
            ignore_case: true,
        };
        let matches = compute("foo", "Foo FOO foo", options);
        assert_eq!(matches.groups[0].spans().len(), 3);
    }
}
