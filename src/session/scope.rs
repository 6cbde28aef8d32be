//! Layered specification storage
//!
//! A specification can live at three scopes: global, per window and per
//! view. The effective specification of a view is built broad to narrow.
//! Each scope first drops the terms it has toggled off, then appends its own
//! terms that are not present yet.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::host::{BufferId, WindowId};
use crate::spec::display_tokens;

/// Where a specification is stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Global,
    Window,
    #[default]
    View,
}

/// Stored state of one scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeEntry {
    /// Terms contributed by this scope, in display form
    pub text: String,
    /// Inherited display tokens toggled off at this scope
    pub disabled: Vec<String>,
}

impl ScopeEntry {
    fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.disabled.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ScopeStore {
    global: ScopeEntry,
    windows: HashMap<WindowId, ScopeEntry>,
    views: HashMap<BufferId, ScopeEntry>,
}

impl ScopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, kind: ScopeKind, buffer: BufferId, window: WindowId) -> Option<&ScopeEntry> {
        match kind {
            ScopeKind::Global => Some(&self.global),
            ScopeKind::Window => self.windows.get(&window),
            ScopeKind::View => self.views.get(&buffer),
        }
    }

    /// Display tokens of the effective specification of a view
    pub fn effective_tokens(&self, buffer: BufferId, window: WindowId, use_regex: bool) -> Vec<String> {
        self.layered_tokens(ScopeKind::View, buffer, window, use_regex, true)
    }

    /// Effective specification of a view, ready to be parsed
    pub fn effective(&self, buffer: BufferId, window: WindowId, use_regex: bool) -> String {
        join_tokens(self.effective_tokens(buffer, window, use_regex), use_regex)
    }

    /// Store `text` as the complete specification seen from `kind`
    ///
    /// Only terms that broader scopes do not already contribute are kept,
    /// and inherited terms missing from `text` are recorded as toggled off.
    pub fn persist(
        &mut self,
        kind: ScopeKind,
        buffer: BufferId,
        window: WindowId,
        text: &str,
        use_regex: bool,
    ) {
        let inherited = self.layered_tokens(kind, buffer, window, use_regex, false);
        let wanted = display_tokens(text, use_regex);

        let own: Vec<String> = wanted
            .iter()
            .filter(|token| !inherited.contains(token))
            .cloned()
            .collect();
        let disabled: Vec<String> = inherited
            .into_iter()
            .filter(|token| !wanted.contains(token))
            .collect();

        let entry = ScopeEntry {
            text: join_tokens(own, use_regex),
            disabled,
        };
        tracing::trace!("Persisting {:?} scope for {}: {:?}", kind, buffer, entry);

        match kind {
            ScopeKind::Global => self.global = entry,
            ScopeKind::Window if entry.is_empty() => {
                self.windows.remove(&window);
            }
            ScopeKind::Window => {
                self.windows.insert(window, entry);
            }
            ScopeKind::View if entry.is_empty() => {
                self.views.remove(&buffer);
            }
            ScopeKind::View => {
                self.views.insert(buffer, entry);
            }
        }
    }

    /// Forget what `kind` stores for this view
    pub fn clear(&mut self, kind: ScopeKind, buffer: BufferId, window: WindowId) {
        match kind {
            ScopeKind::Global => self.global = ScopeEntry::default(),
            ScopeKind::Window => {
                self.windows.remove(&window);
            }
            ScopeKind::View => {
                self.views.remove(&buffer);
            }
        }
    }

    /// Release the view entry of a closed buffer
    pub fn forget_view(&mut self, buffer: BufferId) {
        self.views.remove(&buffer);
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Tokens contributed by every scope broader than `kind`, plus `kind`
    /// itself when `inclusive`
    fn layered_tokens(
        &self,
        kind: ScopeKind,
        buffer: BufferId,
        window: WindowId,
        use_regex: bool,
        inclusive: bool,
    ) -> Vec<String> {
        let layers: [(ScopeKind, Option<&ScopeEntry>); 3] = [
            (ScopeKind::Global, Some(&self.global)),
            (ScopeKind::Window, self.windows.get(&window)),
            (ScopeKind::View, self.views.get(&buffer)),
        ];

        let mut tokens: Vec<String> = Vec::new();
        for (layer, entry) in layers {
            if layer == kind && !inclusive {
                break;
            }
            if let Some(entry) = entry {
                tokens.retain(|token| !entry.disabled.contains(token));
                for token in display_tokens(&entry.text, use_regex) {
                    if !tokens.contains(&token) {
                        tokens.push(token);
                    }
                }
            }
            if layer == kind {
                break;
            }
        }
        tokens
    }
}

/// Join display tokens into a specification
///
/// In regex mode patterns must precede words to parse as patterns, so
/// merged layers put pattern tokens first, each group keeping its order.
pub fn join_tokens(tokens: Vec<String>, use_regex: bool) -> String {
    if !use_regex {
        return tokens.join(" ");
    }
    let (patterns, words): (Vec<String>, Vec<String>) =
        tokens.into_iter().partition(|token| is_pattern_token(token));
    patterns
        .into_iter()
        .chain(words)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_pattern_token(token: &str) -> bool {
    token.len() > 2 && token.starts_with('/') && token.ends_with('/')
}
