//! Command-line argument parsing
//!
//! Highlights a file once and reports the match groups, optionally walking
//! through the matches the way the next/previous commands do.

use clap::Parser;
use std::path::PathBuf;

use crate::config::HighlightConfig;
use crate::navigation::Direction;

/// Highlight words and patterns in a file
#[derive(Parser, Debug)]
#[command(name = "highlight-words", version, about = "Highlight words and patterns in a file")]
pub struct CliArgs {
    /// File to highlight
    #[arg(value_name = "FILE", required_unless_present = "log_path")]
    pub file: Option<PathBuf>,

    /// Highlight specification: words, or `/pattern/` tokens followed by words
    #[arg(short, long, value_name = "SPEC", default_value = "")]
    pub spec: String,

    /// Treat `/…/` tokens and words as regular expressions
    #[arg(short, long)]
    pub regex: bool,

    /// Match case-insensitively
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Anchor the cursor word at word boundaries (regex mode)
    #[arg(short, long)]
    pub whole_word: bool,

    /// Toggle the word under --caret in the specification
    #[arg(short = 't', long)]
    pub toggle_cursor_word: bool,

    /// Config file (defaults to the user config)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Move to the next match N times
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub next: usize,

    /// Move to the previous match N times
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub previous: usize,

    /// Caret character offset navigation starts from
    #[arg(long, value_name = "OFFSET", default_value_t = 0)]
    pub caret: usize,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the log file location and exit
    #[arg(long)]
    pub log_path: bool,
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Flags given on the command line that override the config file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub use_regex: bool,
    pub ignore_case: bool,
    pub whole_word: bool,
}

impl Overrides {
    /// Apply the overrides to a loaded config; flags only ever switch on
    pub fn apply(self, mut config: HighlightConfig) -> HighlightConfig {
        config.use_regex |= self.use_regex;
        config.ignore_case |= self.ignore_case;
        config.whole_word |= self.whole_word;
        config
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub file: PathBuf,
    pub spec: String,
    pub overrides: Overrides,
    pub config_path: Option<PathBuf>,
    pub toggle_cursor_word: bool,
    /// Navigation steps to take after highlighting
    pub moves: Vec<Direction>,
    pub caret: usize,
    pub output: OutputFormat,
}

impl CliArgs {
    /// Convert parsed CLI args into a run configuration
    pub fn into_config(self) -> Result<RunConfig, String> {
        let file = self.file.ok_or_else(|| "No file given".to_string())?;
        if self.next > 0 && self.previous > 0 {
            return Err("Use either --next or --previous, not both".to_string());
        }
        if self.spec.trim().is_empty() && !self.toggle_cursor_word {
            return Err("Nothing to highlight: pass --spec or --toggle-cursor-word".to_string());
        }

        let moves = if self.next > 0 {
            vec![Direction::Next; self.next]
        } else {
            vec![Direction::Previous; self.previous]
        };

        Ok(RunConfig {
            file,
            spec: self.spec,
            overrides: Overrides {
                use_regex: self.regex,
                ignore_case: self.ignore_case,
                whole_word: self.whole_word,
            },
            config_path: self.config,
            toggle_cursor_word: self.toggle_cursor_word,
            moves,
            caret: self.caret,
            output: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
        })
    }
}
