//! Highlighter configuration persistence
//!
//! Stores preferences in `~/.config/highlight-words/config.yaml`. A loaded
//! configuration is an immutable snapshot; [`ConfigHandle`] swaps whole
//! snapshots so readers never observe a partial update.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::matching::MatchOptions;
use crate::session::ScopeKind;

/// Color classes cycled through by match groups
pub const DEFAULT_PALETTE: &[&str] = &[
    "string",
    "entity.name.class",
    "variable.parameter",
    "invalid.deprecated",
    "invalid",
    "support.function",
];

/// Default cap on scanned buffer text (bytes)
pub const DEFAULT_FILE_SIZE_LIMIT: usize = 4 * 1024 * 1024;

/// An always-on highlight independent of the user's specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMapping {
    /// Literal text, or a regular expression unless `literal` is set
    pub keyword: String,
    /// Color identifier used for the decoration
    pub color: String,
    #[serde(default)]
    pub literal: bool,
    #[serde(default)]
    pub ignore_case: bool,
}

/// Highlighter configuration snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Parse `/…/` patterns and treat words as regular expressions
    #[serde(default)]
    pub use_regex: bool,
    #[serde(default)]
    pub ignore_case: bool,
    /// Wrap the cursor word in `\b` anchors (only with `use_regex`)
    #[serde(default)]
    pub whole_word: bool,
    /// Expand an empty selection to the enclosing word before toggling it
    #[serde(default = "default_true")]
    pub under_cursor: bool,
    /// Forget the stored specification when the prompt is cancelled
    #[serde(default)]
    pub clear_on_cancel: bool,
    /// Buffer text beyond this many bytes is never scanned
    #[serde(default = "default_file_size_limit")]
    pub file_size_limit: usize,
    /// Palette of color identifiers, cycled by group index
    #[serde(default = "default_palette")]
    pub colors_by_scope: Vec<String>,
    #[serde(default, alias = "permanent_highlight_keyword_color_mappings")]
    pub permanent_keyword_map: Vec<KeywordMapping>,
    /// Delay between the last prompt edit and the highlight pass
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Lower bound for the ambient keyword pass backoff
    #[serde(default = "default_keyword_min_delay_ms")]
    pub keyword_min_delay_ms: u64,
    /// Scope that owns specifications entered in the prompt
    #[serde(default)]
    pub default_scope: ScopeKind,
}

fn default_true() -> bool {
    true
}

fn default_file_size_limit() -> usize {
    DEFAULT_FILE_SIZE_LIMIT
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_keyword_min_delay_ms() -> u64 {
    500
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            use_regex: false,
            ignore_case: false,
            whole_word: false,
            under_cursor: default_true(),
            clear_on_cancel: false,
            file_size_limit: default_file_size_limit(),
            colors_by_scope: default_palette(),
            permanent_keyword_map: Vec::new(),
            debounce_ms: default_debounce_ms(),
            keyword_min_delay_ms: default_keyword_min_delay_ms(),
            default_scope: ScopeKind::default(),
        }
    }
}

/// A toggleable boolean setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    UseRegex,
    IgnoreCase,
    WholeWord,
}

impl Setting {
    pub const ALL: [Setting; 3] = [Setting::UseRegex, Setting::IgnoreCase, Setting::WholeWord];

    /// Menu label describing what selecting the setting will do
    pub fn menu_label(self, config: &HighlightConfig) -> String {
        match self {
            Setting::UseRegex => format!(
                "Turn [Regular Expression] {}",
                if config.use_regex { "OFF" } else { "ON" }
            ),
            Setting::IgnoreCase => format!(
                "Turn [Case Sensitive] {}",
                if config.ignore_case { "ON" } else { "OFF" }
            ),
            Setting::WholeWord => format!(
                "Turn [Whole Word] {}",
                if config.whole_word { "OFF" } else { "ON" }
            ),
        }
    }
}

/// Labels for the settings quick menu, in [`Setting::ALL`] order
pub fn settings_menu(config: &HighlightConfig) -> Vec<String> {
    Setting::ALL
        .iter()
        .map(|setting| setting.menu_label(config))
        .collect()
}

impl HighlightConfig {
    /// Load config from the user config directory, or return defaults
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to the user config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = crate::config_paths::config_file().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save config to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::IoError(format!("Failed to create directory: {}", e)))?;
        }

        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| {
            ConfigError::IoError(format!("Failed to write config to {}: {}", path.display(), e))
        })?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Copy of this config with `setting` flipped
    pub fn toggled(&self, setting: Setting) -> Self {
        let mut next = self.clone();
        match setting {
            Setting::UseRegex => next.use_regex = !next.use_regex,
            Setting::IgnoreCase => next.ignore_case = !next.ignore_case,
            Setting::WholeWord => next.whole_word = !next.whole_word,
        }
        next
    }

    /// The palette, falling back to the defaults when configured empty
    pub fn palette(&self) -> Vec<String> {
        if self.colors_by_scope.is_empty() {
            default_palette()
        } else {
            self.colors_by_scope.clone()
        }
    }

    /// Color identifier for a color class
    pub fn color_for(&self, color_class: usize) -> String {
        let palette = self.palette();
        palette[color_class % palette.len()].clone()
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            use_regex: self.use_regex,
            ignore_case: self.ignore_case,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn keyword_min_delay(&self) -> Duration {
        Duration::from_millis(self.keyword_min_delay_ms)
    }

    /// Title of the edit prompt, reporting the active matching mode
    pub fn prompt_label(&self) -> String {
        format!(
            "Highlight words ({}, {}):",
            if self.use_regex { "RegEx" } else { "Literal" },
            if self.ignore_case {
                "Ignore Case"
            } else {
                "Case Sensitive"
            }
        )
    }
}

/// Shared, atomically replaceable configuration
#[derive(Debug)]
pub struct ConfigHandle {
    current: RwLock<Arc<HighlightConfig>>,
    path: Option<PathBuf>,
}

impl ConfigHandle {
    /// In-memory handle; toggles are not persisted
    pub fn new(config: HighlightConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            path: None,
        }
    }

    /// Handle backed by `path`; a missing file yields defaults
    pub fn with_file(path: PathBuf) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            HighlightConfig::load_from(&path)?
        } else {
            HighlightConfig::default()
        };
        Ok(Self {
            current: RwLock::new(Arc::new(config)),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<HighlightConfig> {
        match self.current.read() {
            Ok(current) => Arc::clone(&current),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swap in a new snapshot
    pub fn replace(&self, config: HighlightConfig) -> Arc<HighlightConfig> {
        let next = Arc::new(config);
        match self.current.write() {
            Ok(mut current) => *current = Arc::clone(&next),
            Err(poisoned) => *poisoned.into_inner() = Arc::clone(&next),
        }
        next
    }

    /// Re-read the backing file, keeping the current snapshot on failure
    pub fn reload(&self) -> Result<Arc<HighlightConfig>, ConfigError> {
        let Some(path) = &self.path else {
            return Ok(self.snapshot());
        };
        let config = HighlightConfig::load_from(path)?;
        tracing::info!("Reloaded config from {}", path.display());
        Ok(self.replace(config))
    }

    /// Flip `setting`, swap the snapshot and persist it when file-backed
    pub fn toggle(&self, setting: Setting) -> Result<Arc<HighlightConfig>, ConfigError> {
        let next = self.snapshot().toggled(setting);
        if let Some(path) = &self.path {
            next.save_to(path)?;
        }
        Ok(self.replace(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HighlightConfig::default();
        assert!(!config.use_regex);
        assert!(config.under_cursor);
        assert_eq!(config.palette().len(), 6);
        assert_eq!(config.debounce(), Duration::from_millis(500));
    }

    #[test]
    fn test_color_for_cycles() {
        let config = HighlightConfig {
            colors_by_scope: vec!["red".into(), "blue".into()],
            ..HighlightConfig::default()
        };
        assert_eq!(config.color_for(0), "red");
        assert_eq!(config.color_for(3), "blue");
    }

    #[test]
    fn test_empty_palette_falls_back() {
        let config = HighlightConfig {
            colors_by_scope: vec![],
            ..HighlightConfig::default()
        };
        assert_eq!(config.color_for(0), DEFAULT_PALETTE[0]);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: HighlightConfig = serde_yaml::from_str("use_regex: true\n").unwrap();
        assert!(config.use_regex);
        assert_eq!(config.file_size_limit, DEFAULT_FILE_SIZE_LIMIT);
        assert_eq!(config.colors_by_scope.len(), 6);
    }

    #[test]
    fn test_keyword_map_alias() {
        let yaml = "permanent_highlight_keyword_color_mappings:\n  - keyword: TODO\n    color: invalid\n    literal: true\n";
        let config: HighlightConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.permanent_keyword_map.len(), 1);
        assert!(config.permanent_keyword_map[0].literal);
        assert!(!config.permanent_keyword_map[0].ignore_case);
    }

    #[test]
    fn test_settings_menu_labels() {
        let config = HighlightConfig::default();
        assert_eq!(
            settings_menu(&config),
            vec![
                "Turn [Regular Expression] ON",
                "Turn [Case Sensitive] OFF",
                "Turn [Whole Word] ON",
            ]
        );
        let toggled = config.toggled(Setting::IgnoreCase);
        assert_eq!(Setting::IgnoreCase.menu_label(&toggled), "Turn [Case Sensitive] ON");
    }

    #[test]
    fn test_prompt_label() {
        let config = HighlightConfig::default().toggled(Setting::UseRegex);
        assert_eq!(config.prompt_label(), "Highlight words (RegEx, Case Sensitive):");
    }

    #[test]
    fn test_handle_replace_swaps_snapshot() {
        let handle = ConfigHandle::new(HighlightConfig::default());
        let before = handle.snapshot();
        handle.replace(before.toggled(Setting::UseRegex));
        assert!(!before.use_regex);
        assert!(handle.snapshot().use_regex);
    }
}
