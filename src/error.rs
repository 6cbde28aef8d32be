//! Error types for highlighting
//!
//! None of these abort a highlight pass. They degrade to fewer highlights and
//! are reported through `tracing` and the pass's diagnostics.

/// Recoverable conditions raised while highlighting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// The specification did not fit the grammar and was split into words
    ParseFallback { spec: String, reason: String },
    /// A single pattern term failed to compile and was dropped
    PatternCompile { source: String, message: String },
    /// A deferred pass was superseded by a newer stamp
    StaleExecution { stamp: u64, current: u64 },
}

impl std::fmt::Display for HighlightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HighlightError::ParseFallback { spec, reason } => {
                write!(f, "spec {:?} fell back to word split: {}", spec, reason)
            }
            HighlightError::PatternCompile { source, message } => {
                write!(f, "pattern {:?} failed to compile: {}", source, message)
            }
            HighlightError::StaleExecution { stamp, current } => {
                write!(f, "stale highlight pass (stamp {} != current {})", stamp, current)
            }
        }
    }
}

impl std::error::Error for HighlightError {}

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    NoConfigDir,
    IoError(String),
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "No config directory available"),
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
