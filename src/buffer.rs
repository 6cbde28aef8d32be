//! In-memory host buffer
//!
//! [`TextBuffer`] implements [`EditorView`] on top of a `ropey` rope. The CLI,
//! the integration tests and the benchmarks drive the highlighter through it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use ropey::Rope;
use serde::Serialize;

use crate::host::{BufferId, EditorView, WindowId};
use crate::span::Span;

/// One decoration as drawn by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoration {
    pub spans: Vec<Span>,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct TextBuffer {
    id: BufferId,
    window: WindowId,
    /// The text buffer
    pub buffer: Rope,
    /// Path to the file on disk (None for scratch buffers)
    pub file_path: Option<PathBuf>,
    selections: Vec<Span>,
    decorations: BTreeMap<String, Decoration>,
    /// Span most recently passed to `reveal_and_select`
    revealed: Option<Span>,
    /// Incremented on each edit
    pub revision: u64,
}

impl TextBuffer {
    /// Create an empty buffer
    pub fn new(id: BufferId, window: WindowId) -> Self {
        Self::with_text(id, window, "")
    }

    /// Create a buffer with initial text and the caret at the start
    pub fn with_text(id: BufferId, window: WindowId, text: &str) -> Self {
        Self {
            id,
            window,
            buffer: Rope::from(text),
            file_path: None,
            selections: vec![Span::caret(0)],
            decorations: BTreeMap::new(),
            revealed: None,
            revision: 0,
        }
    }

    /// Load a buffer from a file path
    pub fn from_file(id: BufferId, window: WindowId, path: PathBuf) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(&path)?;
        let mut buffer = Self::with_text(id, window, &content);
        buffer.file_path = Some(path);
        Ok(buffer)
    }

    pub fn set_window(&mut self, window: WindowId) {
        self.window = window;
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    /// Insert `text` at char offset `char_idx` (clamped to the buffer end)
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        let char_idx = char_idx.min(self.buffer.len_chars());
        self.buffer.insert(char_idx, text);
        self.revision += 1;
    }

    /// Remove the chars covered by `span` (clamped to the buffer end)
    pub fn remove(&mut self, span: Span) {
        let len = self.buffer.len_chars();
        let (start, end) = (span.start.min(len), span.end.min(len));
        if start < end {
            self.buffer.remove(start..end);
            self.revision += 1;
        }
    }

    /// Replace all selections
    pub fn set_selections(&mut self, selections: Vec<Span>) {
        self.selections = selections;
    }

    /// Collapse the selection to a caret at `offset`
    pub fn set_caret(&mut self, offset: usize) {
        self.selections = vec![Span::caret(offset.min(self.buffer.len_chars()))];
    }

    pub fn decoration(&self, key: &str) -> Option<&Decoration> {
        self.decorations.get(key)
    }

    pub fn decorations(&self) -> &BTreeMap<String, Decoration> {
        &self.decorations
    }

    pub fn decoration_keys(&self) -> Vec<&str> {
        self.decorations.keys().map(String::as_str).collect()
    }

    pub fn revealed(&self) -> Option<Span> {
        self.revealed
    }

    /// Zero-based (line, column) of a char offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.buffer.len_chars());
        let line = self.buffer.char_to_line(offset);
        (line, offset - self.buffer.line_to_char(line))
    }
}

impl EditorView for TextBuffer {
    fn buffer_id(&self) -> BufferId {
        self.id
    }

    fn window_id(&self) -> WindowId {
        self.window
    }

    fn read_text(&self, max_bytes: usize) -> String {
        if self.buffer.len_bytes() <= max_bytes {
            return self.buffer.to_string();
        }
        let end = self.buffer.byte_to_char(max_bytes);
        self.buffer.slice(..end).to_string()
    }

    fn selections(&self) -> Vec<Span> {
        self.selections.clone()
    }

    fn apply_decoration(&mut self, key: &str, spans: &[Span], color: &str) {
        self.decorations.insert(
            key.to_string(),
            Decoration {
                spans: spans.to_vec(),
                color: color.to_string(),
            },
        );
    }

    fn remove_decoration(&mut self, key: &str) {
        self.decorations.remove(key);
    }

    fn reveal_and_select(&mut self, span: Span) {
        self.revealed = Some(span);
        self.selections = vec![span];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::with_text(BufferId(1), WindowId(1), text)
    }

    #[test]
    fn test_read_text_respects_byte_limit() {
        let buf = buffer("héllo");
        assert_eq!(buf.read_text(100), "héllo");
        // 'é' occupies bytes 1..3; a limit inside it backs off
        assert_eq!(buf.read_text(2), "h");
        assert_eq!(buf.read_text(3), "hé");
    }

    #[test]
    fn test_decorations_replace_and_remove() {
        let mut buf = buffer("abc");
        buf.apply_decoration("k", &[Span::new(0, 1)], "red");
        buf.apply_decoration("k", &[Span::new(1, 2)], "blue");
        assert_eq!(buf.decoration("k").unwrap().spans, vec![Span::new(1, 2)]);
        buf.remove_decoration("k");
        buf.remove_decoration("missing");
        assert!(buf.decorations().is_empty());
    }

    #[test]
    fn test_reveal_selects_span() {
        let mut buf = buffer("abc def");
        buf.reveal_and_select(Span::new(4, 7));
        assert_eq!(buf.selections(), vec![Span::new(4, 7)]);
        assert_eq!(buf.revealed(), Some(Span::new(4, 7)));
    }

    #[test]
    fn test_edits_bump_revision() {
        let mut buf = buffer("abc");
        buf.insert(3, " def");
        buf.remove(Span::new(0, 1));
        assert_eq!(buf.text(), "bc def");
        assert_eq!(buf.revision, 2);
    }

    #[test]
    fn test_line_col() {
        let buf = buffer("ab\ncd");
        assert_eq!(buf.line_col(4), (1, 1));
    }
}
