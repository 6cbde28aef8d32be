//! Highlight specification language
//!
//! Splits a raw specification into literal words and `/…/` patterns.

mod parser;
mod term;

pub use parser::{display_tokens, parse, ParseOutcome, SyntaxError};
pub use term::{dedup_terms, to_display_string, Term};
