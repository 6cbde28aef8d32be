//! Specification parser
//!
//! A specification is zero or more search patterns, OR zero or more plain
//! words, OR one or more search patterns followed by plain words:
//!
//! ```text
//! spec   := SEARCH* | WORDS | SEARCH+ WORDS
//! SEARCH := ' '* '/' [^/]+ '/' ' '*      (closing '/' not preceded by '\')
//! WORDS  := [^/] .*                      (runs to end of input)
//! ```
//!
//! Once the words part starts, everything left is literal word material, even
//! text that looks like `/…/`.

use super::term::{dedup_terms, Term};

/// Why a specification did not fit the grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A `/` with no closing delimiter
    UnterminatedPattern { offset: usize },
    /// `//` with nothing between the delimiters
    EmptyPattern { offset: usize },
    /// The only candidate closing `/` is escaped with a backslash
    EscapedDelimiter { offset: usize },
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxError::UnterminatedPattern { offset } => {
                write!(f, "unterminated pattern starting at byte {}", offset)
            }
            SyntaxError::EmptyPattern { offset } => {
                write!(f, "empty pattern at byte {}", offset)
            }
            SyntaxError::EscapedDelimiter { offset } => {
                write!(f, "escaped closing delimiter for pattern at byte {}", offset)
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Result of parsing a specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Terms in specification order
    Parsed(Vec<Term>),
    /// The grammar rejected the input; `words` is its plain whitespace split
    Fallback { words: Vec<String>, error: SyntaxError },
}

impl ParseOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback { .. })
    }

    /// Flatten into terms; fallback words become literal terms
    pub fn into_terms(self) -> Vec<Term> {
        match self {
            ParseOutcome::Parsed(terms) => terms,
            ParseOutcome::Fallback { words, .. } => words.into_iter().map(Term::literal).collect(),
        }
    }
}

/// Parse a specification string into terms
///
/// With `use_regex` off the grammar is bypassed and every whitespace-separated
/// token is a literal. A malformed specification is logged and degrades to a
/// whitespace split; it is never reported to the user.
pub fn parse(spec: &str, use_regex: bool) -> ParseOutcome {
    if !use_regex {
        return ParseOutcome::Parsed(spec.split_whitespace().map(Term::literal).collect());
    }

    match parse_tokens(spec) {
        Ok(terms) => ParseOutcome::Parsed(terms),
        Err(error) => {
            tracing::debug!("Spec {:?} fell back to word split: {}", spec, error);
            ParseOutcome::Fallback {
                words: spec.split_whitespace().map(str::to_string).collect(),
                error,
            }
        }
    }
}

/// Display forms of the specification's terms, deduplicated in first-seen order
///
/// Patterns keep their `/…/` delimiters so the list can be edited and parsed
/// again. This seeds the edit prompt.
pub fn display_tokens(spec: &str, use_regex: bool) -> Vec<String> {
    dedup_terms(parse(spec, use_regex).into_terms())
        .iter()
        .map(|term| term.display().to_string())
        .collect()
}

fn parse_tokens(input: &str) -> Result<Vec<Term>, SyntaxError> {
    let mut terms = Vec::new();
    let mut pos = 0;

    loop {
        pos = skip_whitespace(input, pos);
        if pos >= input.len() {
            break;
        }

        if input[pos..].starts_with('/') {
            let (source, next) = lex_search(input, pos)?;
            terms.push(Term::pattern(source));
            pos = next;
        } else {
            terms.extend(split_words(&input[pos..]).into_iter().map(Term::literal));
            break;
        }
    }

    Ok(terms)
}

fn skip_whitespace(input: &str, pos: usize) -> usize {
    input[pos..]
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map(|(idx, _)| pos + idx)
        .unwrap_or(input.len())
}

/// Lex one `/…/` token starting at the opening slash at `start`
///
/// Returns the pattern source and the byte offset just past the closing slash.
fn lex_search(input: &str, start: usize) -> Result<(&str, usize), SyntaxError> {
    let body_start = start + 1;
    let Some(rel_close) = input[body_start..].find('/') else {
        return Err(SyntaxError::UnterminatedPattern { offset: start });
    };

    let body = &input[body_start..body_start + rel_close];
    if body.is_empty() {
        return Err(SyntaxError::EmptyPattern { offset: start });
    }
    // The body cannot contain '/', so an escaped first '/' means no closer exists
    if body.ends_with('\\') {
        return Err(SyntaxError::EscapedDelimiter { offset: start });
    }

    Ok((body, body_start + rel_close + 1))
}

/// Split the words part on runs of unescaped whitespace
///
/// `\ ` keeps the space inside the word and the backslash is preserved.
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.peek() == Some(&' ') {
            current.push(ch);
            current.push(' ');
            chars.next();
        } else if ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}
