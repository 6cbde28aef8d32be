//! Match computation
//!
//! [`MatchEngine`] turns parsed terms into colored [`MatchGroup`]s, delegating
//! the actual searching to a [`Matcher`].

mod engine;
mod matcher;

pub use engine::{GroupKind, MatchEngine, MatchGroup, MatchOptions, Matches, MIN_LITERAL_CHARS};
pub use matcher::{CaptureMatch, FindFlags, Matcher, RegexMatcher};
