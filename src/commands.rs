//! Commands surfaced to UI bindings
//!
//! Hosts bind these by name; dispatch happens in [`crate::service::HighlightService::execute`].

use std::sync::Arc;

use crate::config::{HighlightConfig, Setting};
use crate::session::PromptSeed;
use crate::span::Span;

// ============================================================================
// Command Registry
// ============================================================================

/// Identifies a highlighter command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    OpenHighlightPrompt,
    ToggleSettings(Setting),
    SelectNextMatch,
    SelectPreviousMatch,
    ClearHighlights,
}

/// A command definition for key bindings
#[derive(Debug, Clone)]
pub struct CommandDef {
    pub id: CommandId,
    pub label: &'static str,
    /// Stable name hosts bind keys to
    pub name: &'static str,
}

/// Static registry of all commands
pub static COMMANDS: &[CommandDef] = &[
    CommandDef {
        id: CommandId::OpenHighlightPrompt,
        label: "Highlight Words...",
        name: "highlight_words",
    },
    CommandDef {
        id: CommandId::ToggleSettings(Setting::UseRegex),
        label: "Highlight Words: Toggle Regular Expression",
        name: "highlight_toggle_regex",
    },
    CommandDef {
        id: CommandId::ToggleSettings(Setting::IgnoreCase),
        label: "Highlight Words: Toggle Case Sensitive",
        name: "highlight_toggle_case",
    },
    CommandDef {
        id: CommandId::ToggleSettings(Setting::WholeWord),
        label: "Highlight Words: Toggle Whole Word",
        name: "highlight_toggle_whole_word",
    },
    CommandDef {
        id: CommandId::SelectNextMatch,
        label: "Highlight Words: Select Next Match",
        name: "select_highlighted_next_word",
    },
    CommandDef {
        id: CommandId::SelectPreviousMatch,
        label: "Highlight Words: Select Previous Match",
        name: "select_highlighted_previous_word",
    },
    CommandDef {
        id: CommandId::ClearHighlights,
        label: "Highlight Words: Clear",
        name: "unhighlight_words",
    },
];

/// What executing a command produced
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// Show the edit prompt with this seed
    Prompt(PromptSeed),
    /// A setting flipped; this is the new snapshot
    SettingsChanged(Arc<HighlightConfig>),
    /// Navigation landed on a match, or found none
    Selected(Option<Span>),
    Cleared,
}

/// Look up a command by its binding name
pub fn command_by_name(name: &str) -> Option<&'static CommandDef> {
    COMMANDS.iter().find(|cmd| cmd.name == name)
}
