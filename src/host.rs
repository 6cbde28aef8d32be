//! Host editor contract
//!
//! The highlighter never owns buffer text or visuals. Everything it reads or
//! draws goes through an [`EditorView`].

use std::fmt;

use crate::span::Span;

/// Identity of a buffer (one view of a document)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// Identity of the window a buffer is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct WindowId(pub u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// What the highlighter needs from the editor showing a buffer
pub trait EditorView {
    fn buffer_id(&self) -> BufferId;

    fn window_id(&self) -> WindowId;

    /// Buffer text, cut to at most `max_bytes` on a char boundary
    fn read_text(&self, max_bytes: usize) -> String;

    /// Selections in order, primary first. May be empty.
    fn selections(&self) -> Vec<Span>;

    /// Add or replace the decoration stored under `key`
    fn apply_decoration(&mut self, key: &str, spans: &[Span], color: &str);

    /// Erase the decoration stored under `key`; unknown keys are ignored
    fn remove_decoration(&mut self, key: &str);

    /// Scroll `span` into view and make it the only selection
    fn reveal_and_select(&mut self, span: Span);
}
