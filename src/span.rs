//! Character-offset spans and the deduplicated span set used for navigation

use serde::Serialize;

/// A half-open `[start, end)` range of character offsets into buffer text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-width span at `offset`
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check whether `offset` lies inside the span (end exclusive)
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

/// Sorted, deduplicated union of match spans
///
/// Two terms matching the identical range contribute a single entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanSet {
    spans: Vec<Span>,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spans<I: IntoIterator<Item = Span>>(spans: I) -> Self {
        let mut spans: Vec<Span> = spans.into_iter().collect();
        spans.sort_unstable();
        spans.dedup();
        Self { spans }
    }

    pub fn as_slice(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn contains(&self, span: &Span) -> bool {
        self.spans.binary_search(span).is_ok()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }

    pub fn into_vec(self) -> Vec<Span> {
        self.spans
    }
}

impl FromIterator<Span> for SpanSet {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        Self::from_spans(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_set_sorts_and_dedups() {
        let set = SpanSet::from_spans(vec![
            Span::new(8, 11),
            Span::new(0, 3),
            Span::new(8, 11),
            Span::new(0, 2),
        ]);
        assert_eq!(
            set.as_slice(),
            &[Span::new(0, 2), Span::new(0, 3), Span::new(8, 11)]
        );
    }

    #[test]
    fn test_span_contains_is_end_exclusive() {
        let span = Span::new(4, 7);
        assert!(span.contains(4));
        assert!(span.contains(6));
        assert!(!span.contains(7));
        assert_eq!(span.len(), 3);
        assert!(Span::caret(5).is_empty());
    }
}
