//! Highlight sessions
//!
//! A [`BufferSession`] owns the decorations and navigation state of one
//! buffer. Specifications are stored in a [`ScopeStore`] shared by all
//! sessions.

mod cursor_word;
mod scope;
#[allow(clippy::module_inception)]
mod session;

pub use cursor_word::{cursor_word, toggle_token};
pub use scope::{join_tokens, ScopeEntry, ScopeKind, ScopeStore};
pub use session::{
    boundary_spans, group_key, BufferSession, HighlightOutcome, HighlightReport, PromptSeed,
    ACTIVE_COLOR, ACTIVE_KEY, GROUP_KEY_PREFIX,
};
