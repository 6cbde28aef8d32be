//! highlight-words - word and pattern highlighting engine
//!
//! Parses a highlight specification (literal words mixed with `/pattern/`
//! tokens), computes colored match groups over a buffer, keeps them current
//! as the buffer or specification changes, and navigates between matches.
//! The host editor is reached through the [`host::EditorView`] trait.

pub mod buffer;
pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod host;
pub mod keywords;
pub mod matching;
pub mod navigation;
pub mod registry;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod span;
pub mod spec;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use commands::CommandId;
pub use config::{ConfigHandle, HighlightConfig};
pub use error::HighlightError;
pub use host::EditorView;
pub use service::HighlightService;
pub use span::{Span, SpanSet};
