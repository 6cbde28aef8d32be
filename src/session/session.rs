//! Per-buffer highlight session

use std::sync::Arc;

use super::cursor_word::{cursor_word, toggle_token};
use super::scope::{join_tokens, ScopeStore};
use crate::config::HighlightConfig;
use crate::error::HighlightError;
use crate::host::{BufferId, EditorView, WindowId};
use crate::keywords::{apply_keywords, match_keywords};
use crate::matching::{MatchEngine, MatchGroup, Matcher};
use crate::navigation::{Direction, NavigationIndex};
use crate::scheduler::{Stamp, StampClock};
use crate::span::{Span, SpanSet};
use crate::spec::{dedup_terms, parse, to_display_string, ParseOutcome};
use crate::util::truncate_to_byte_limit;

/// Prefix of the per-group decoration keys
pub const GROUP_KEY_PREFIX: &str = "highlight_word_";

/// Decoration key of the active-match boundary marks
pub const ACTIVE_KEY: &str = "highlight_word_active";

/// Color of the active-match boundary marks
pub const ACTIVE_COLOR: &str = "comment";

/// Decoration key of the group at `index`
pub fn group_key(index: usize) -> String {
    format!("{}{}", GROUP_KEY_PREFIX, index)
}

/// Title and initial content of the edit prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSeed {
    pub prompt: String,
    pub text: String,
}

/// What an applied highlight pass did
#[derive(Debug, Clone)]
pub struct HighlightReport {
    pub stamp: Stamp,
    pub groups: Vec<MatchGroup>,
    /// Deduplicated union of all group spans
    pub spans: SpanSet,
    /// Number of trailing decoration keys erased because the group count shrank
    pub erased: usize,
    /// Bytes of buffer text that were scanned
    pub scanned_bytes: usize,
    pub diagnostics: Vec<HighlightError>,
}

/// Result of a highlight pass
#[derive(Debug, Clone)]
pub enum HighlightOutcome {
    Applied(HighlightReport),
    /// A newer request superseded this one; nothing was applied
    Stale,
}

impl HighlightOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, HighlightOutcome::Stale)
    }

    pub fn report(&self) -> Option<&HighlightReport> {
        match self {
            HighlightOutcome::Applied(report) => Some(report),
            HighlightOutcome::Stale => None,
        }
    }
}

/// Highlight state owned by one buffer
#[derive(Debug)]
pub struct BufferSession {
    buffer_id: BufferId,
    window_id: WindowId,
    clock: Arc<StampClock>,
    /// Decoration keys `0..group_count` are currently in use
    group_count: usize,
    navigation: NavigationIndex,
    /// Span whose boundaries carry the active marker
    active_marker: Option<Span>,
    /// Keyword decoration keys `0..keyword_count` are in use
    keyword_count: usize,
}

impl BufferSession {
    pub fn new(buffer_id: BufferId, window_id: WindowId) -> Self {
        Self {
            buffer_id,
            window_id,
            clock: Arc::new(StampClock::new()),
            group_count: 0,
            navigation: NavigationIndex::new(),
            active_marker: None,
            keyword_count: 0,
        }
    }

    pub fn buffer_id(&self) -> BufferId {
        self.buffer_id
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    /// The buffer moved to another window
    pub fn set_window(&mut self, window_id: WindowId) {
        self.window_id = window_id;
    }

    pub fn clock(&self) -> Arc<StampClock> {
        Arc::clone(&self.clock)
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn navigation(&self) -> &NavigationIndex {
        &self.navigation
    }

    pub fn active_marker(&self) -> Option<Span> {
        self.active_marker
    }

    pub fn keyword_count(&self) -> usize {
        self.keyword_count
    }

    /// Seed the edit prompt
    ///
    /// The prompt starts from the effective specification. The word under
    /// the first selection is toggled in or out of it; further selections
    /// are ignored.
    pub fn open_editor(
        &self,
        view: &dyn EditorView,
        config: &HighlightConfig,
        scopes: &ScopeStore,
    ) -> PromptSeed {
        let mut tokens = scopes.effective_tokens(self.buffer_id, self.window_id, config.use_regex);

        if let Some(selection) = view.selections().first().copied() {
            let text = view.read_text(config.file_size_limit);
            if let Some(word) = cursor_word(&text, selection, config) {
                let added = toggle_token(&mut tokens, word.clone());
                tracing::debug!(
                    "{} cursor word {:?} for {}",
                    if added { "Added" } else { "Removed" },
                    word,
                    self.buffer_id
                );
            }
        }

        PromptSeed {
            prompt: config.prompt_label(),
            text: join_tokens(tokens, config.use_regex),
        }
    }

    /// Record a prompt edit; the returned stamp supersedes all earlier ones
    pub fn on_text_changed(&self) -> Stamp {
        self.clock.advance()
    }

    /// Run a highlight pass for `spec_text` if `stamp` is still current
    pub fn highlight(
        &mut self,
        view: &mut dyn EditorView,
        spec_text: &str,
        stamp: Stamp,
        config: &HighlightConfig,
        scopes: &mut ScopeStore,
        matcher: &dyn Matcher,
    ) -> HighlightOutcome {
        if !self.is_current(stamp) {
            return HighlightOutcome::Stale;
        }

        let mut diagnostics = Vec::new();
        let outcome = parse(spec_text, config.use_regex);
        if let ParseOutcome::Fallback { error, .. } = &outcome {
            diagnostics.push(HighlightError::ParseFallback {
                spec: spec_text.to_string(),
                reason: error.to_string(),
            });
        }
        let terms = dedup_terms(outcome.into_terms());

        let buffer_text = view.read_text(config.file_size_limit);
        let text = truncate_to_byte_limit(&buffer_text, config.file_size_limit);

        let palette = config.palette();
        let matches =
            MatchEngine::new(matcher, config.match_options(), palette.len()).compute(&terms, text);

        if !self.is_current(stamp) {
            return HighlightOutcome::Stale;
        }

        for (group, spans) in matches.groups.iter().zip(matches.draw_lists()) {
            view.apply_decoration(
                &group_key(group.index),
                &spans,
                &palette[group.color_class % palette.len()],
            );
        }

        let group_count = matches.groups.len();
        let erased = self.group_count.saturating_sub(group_count);
        for index in group_count..self.group_count {
            view.remove_decoration(&group_key(index));
        }
        self.group_count = group_count;

        scopes.persist(
            config.default_scope,
            self.buffer_id,
            self.window_id,
            &to_display_string(&terms),
            config.use_regex,
        );

        let spans = matches.span_set();
        self.navigation.rebuild(spans.clone());
        if let Some(active) = self.active_marker {
            if !spans.contains(&active) {
                view.remove_decoration(ACTIVE_KEY);
                self.active_marker = None;
            }
        }

        diagnostics.extend(matches.diagnostics);
        tracing::debug!(
            "Highlighted {} with {} groups, {} spans",
            self.buffer_id,
            group_count,
            spans.len()
        );

        HighlightOutcome::Applied(HighlightReport {
            stamp,
            groups: matches.groups,
            spans,
            erased,
            scanned_bytes: text.len(),
            diagnostics,
        })
    }

    /// Draw the permanent keyword map over the buffer
    pub fn apply_keywords(
        &mut self,
        view: &mut dyn EditorView,
        config: &HighlightConfig,
        matcher: &dyn Matcher,
    ) -> Vec<HighlightError> {
        let buffer_text = view.read_text(config.file_size_limit);
        let text = truncate_to_byte_limit(&buffer_text, config.file_size_limit);
        let (matches, diagnostics) = match_keywords(&config.permanent_keyword_map, text, matcher);
        self.keyword_count = apply_keywords(view, &matches, self.keyword_count);
        diagnostics
    }

    /// Move to the next or previous match from the primary caret
    ///
    /// Selects the match in the host and marks its boundaries.
    pub fn select_match(&mut self, view: &mut dyn EditorView, direction: Direction) -> Option<Span> {
        let caret = view.selections().first().map(|s| s.start).unwrap_or(0);
        let span = self.navigation.step(direction, caret)?;

        view.reveal_and_select(span);
        view.apply_decoration(ACTIVE_KEY, &boundary_spans(span), ACTIVE_COLOR);
        self.active_marker = Some(span);
        Some(span)
    }

    /// Erase every decoration and forget the matches
    ///
    /// Pending passes are superseded. With `clear_on_cancel` the stored
    /// specification of the owning scope is dropped as well.
    pub fn cancel(&mut self, view: &mut dyn EditorView, config: &HighlightConfig, scopes: &mut ScopeStore) {
        self.clock.advance();
        for index in 0..self.group_count {
            view.remove_decoration(&group_key(index));
        }
        if self.active_marker.take().is_some() {
            view.remove_decoration(ACTIVE_KEY);
        }
        self.group_count = 0;
        self.navigation.clear();

        if config.clear_on_cancel {
            scopes.clear(config.default_scope, self.buffer_id, self.window_id);
        }
        tracing::debug!("Cleared highlights for {}", self.buffer_id);
    }

    fn is_current(&self, stamp: Stamp) -> bool {
        let current = self.clock.current();
        if current == stamp {
            return true;
        }
        let stale = HighlightError::StaleExecution {
            stamp: stamp.0,
            current: current.0,
        };
        tracing::debug!("Discarding highlight pass for {}: {}", self.buffer_id, stale);
        false
    }
}

/// One-character spans just outside `span`, marking where an active match
/// begins and ends
pub fn boundary_spans(span: Span) -> Vec<Span> {
    let mut marks = Vec::with_capacity(2);
    if span.start > 0 {
        marks.push(Span::new(span.start - 1, span.start));
    }
    marks.push(Span::new(span.end, span.end + 1));
    marks
}
