//! Occurrence search capability
//!
//! The engine never matches text itself; it asks a [`Matcher`] for all
//! occurrences of a literal or pattern. [`RegexMatcher`] is the default
//! implementation on top of the `regex` crate.

use regex::{Regex, RegexBuilder};

use crate::error::HighlightError;
use crate::span::Span;

/// How a needle passed to [`Matcher::find_all`] is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindFlags {
    /// Match the needle as plain text rather than a regular expression
    pub literal: bool,
    /// Case-insensitive matching
    pub ignore_case: bool,
}

/// One pattern match: spans for capture groups 1..N
///
/// A group that did not participate in the match is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureMatch {
    pub full: Span,
    pub groups: Vec<Option<Span>>,
}

/// Find-all-occurrences primitive supplied by the host
///
/// All offsets are character offsets into `text`.
pub trait Matcher {
    /// Every non-overlapping, non-empty occurrence of `needle`
    fn find_all(&self, text: &str, needle: &str, flags: FindFlags)
        -> Result<Vec<Span>, HighlightError>;

    /// Every match of `source` with its capture group spans
    fn captures(
        &self,
        text: &str,
        source: &str,
        ignore_case: bool,
    ) -> Result<Vec<CaptureMatch>, HighlightError>;
}

/// [`Matcher`] backed by the `regex` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexMatcher;

impl RegexMatcher {
    pub fn new() -> Self {
        Self
    }

    fn compile(source: &str, ignore_case: bool) -> Result<Regex, HighlightError> {
        RegexBuilder::new(source)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|e| HighlightError::PatternCompile {
                source: source.to_string(),
                message: e.to_string(),
            })
    }
}

impl Matcher for RegexMatcher {
    fn find_all(
        &self,
        text: &str,
        needle: &str,
        flags: FindFlags,
    ) -> Result<Vec<Span>, HighlightError> {
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let regex = if flags.literal {
            Self::compile(&regex::escape(needle), flags.ignore_case)?
        } else {
            Self::compile(needle, flags.ignore_case)?
        };

        let mut offsets = CharOffsets::new(text);
        Ok(regex
            .find_iter(text)
            .filter(|m| m.start() < m.end())
            .map(|m| Span::new(offsets.to_char(m.start()), offsets.to_char(m.end())))
            .collect())
    }

    fn captures(
        &self,
        text: &str,
        source: &str,
        ignore_case: bool,
    ) -> Result<Vec<CaptureMatch>, HighlightError> {
        let regex = Self::compile(source, ignore_case)?;
        let mut offsets = CharOffsets::new(text);

        Ok(regex
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let full = Span::new(offsets.to_char(full.start()), offsets.to_char(full.end()));
                let groups = (1..caps.len())
                    .map(|idx| {
                        caps.get(idx).map(|m| {
                            Span::new(offsets.to_char(m.start()), offsets.to_char(m.end()))
                        })
                    })
                    .collect();
                Some(CaptureMatch { full, groups })
            })
            .collect())
    }
}

/// Converts byte offsets to char offsets for mostly ascending queries
///
/// Keeps a checkpoint so a pass over ascending matches stays linear.
struct CharOffsets<'a> {
    text: &'a str,
    ascii: bool,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            ascii: text.is_ascii(),
            byte: 0,
            chars: 0,
        }
    }

    fn to_char(&mut self, byte: usize) -> usize {
        if self.ascii {
            return byte;
        }
        if byte >= self.byte {
            self.chars += self.text[self.byte..byte].chars().count();
            self.byte = byte;
            self.chars
        } else {
            self.chars - self.text[byte..self.byte].chars().count()
        }
    }
}
