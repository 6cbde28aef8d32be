//! Ordered match navigation
//!
//! Keeps the sorted spans of one buffer and a cursor into them. Moving
//! relative to a caret that was not placed by the previous move
//! resynchronizes by binary search; consecutive moves step by one. Both
//! directions wrap around.

use crate::span::{Span, SpanSet};

/// Direction of a navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Navigation state for one buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NavigationState {
    /// No known matches
    #[default]
    Idle,
    Indexed {
        /// Spans sorted by start offset
        spans: Vec<Span>,
        /// Index of the span the last move landed on
        cursor_index: usize,
        /// Caret position left by the last move (the landed span's start)
        last_caret: Option<usize>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct NavigationIndex {
    state: NavigationState,
}

impl NavigationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, NavigationState::Idle)
    }

    pub fn len(&self) -> usize {
        match &self.state {
            NavigationState::Idle => 0,
            NavigationState::Indexed { spans, .. } => spans.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn spans(&self) -> &[Span] {
        match &self.state {
            NavigationState::Idle => &[],
            NavigationState::Indexed { spans, .. } => spans,
        }
    }

    /// The span the last move landed on, if any move happened since the last resync
    pub fn current(&self) -> Option<Span> {
        match &self.state {
            NavigationState::Indexed {
                spans,
                cursor_index,
                last_caret: Some(_),
            } => spans.get(*cursor_index).copied(),
            _ => None,
        }
    }

    pub fn cursor_index(&self) -> Option<usize> {
        match &self.state {
            NavigationState::Indexed { cursor_index, .. } => Some(*cursor_index),
            NavigationState::Idle => None,
        }
    }

    /// Replace the indexed spans
    ///
    /// Never moves by itself. If the span the last move landed on survives,
    /// the cursor keeps pointing at it so the next consecutive move continues
    /// from there; otherwise the next move resynchronizes from the caret.
    pub fn rebuild(&mut self, spans: SpanSet) {
        if spans.is_empty() {
            self.state = NavigationState::Idle;
            return;
        }

        let previous = self.current();
        let spans = spans.into_vec();
        let (cursor_index, last_caret) = match previous {
            Some(active) => match spans.binary_search(&active) {
                Ok(idx) => (idx, Some(active.start)),
                Err(_) => (0, None),
            },
            None => (0, None),
        };

        self.state = NavigationState::Indexed {
            spans,
            cursor_index,
            last_caret,
        };
    }

    pub fn next(&mut self, caret: usize) -> Option<Span> {
        self.step(Direction::Next, caret)
    }

    pub fn previous(&mut self, caret: usize) -> Option<Span> {
        self.step(Direction::Previous, caret)
    }

    /// Move one match in `direction` relative to `caret`
    ///
    /// Ties at `start == caret` count as "at or after" for `Next` and are
    /// excluded for `Previous`.
    pub fn step(&mut self, direction: Direction, caret: usize) -> Option<Span> {
        let NavigationState::Indexed {
            spans,
            cursor_index,
            last_caret,
        } = &mut self.state
        else {
            return None;
        };
        let len = spans.len();
        if len == 0 {
            return None;
        }

        let target = if *last_caret != Some(caret) {
            let insertion = spans.partition_point(|span| span.start < caret);
            match direction {
                Direction::Next if insertion == len => 0,
                Direction::Next => insertion,
                Direction::Previous if insertion == 0 => len - 1,
                Direction::Previous => insertion - 1,
            }
        } else {
            match direction {
                Direction::Next => (*cursor_index + 1) % len,
                Direction::Previous => (*cursor_index + len - 1) % len,
            }
        };

        *cursor_index = target;
        *last_caret = Some(spans[target].start);
        Some(spans[target])
    }

    /// Drop all spans and cursor state
    pub fn clear(&mut self) {
        self.state = NavigationState::Idle;
    }
}
