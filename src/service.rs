//! Highlighter facade
//!
//! [`HighlightService`] owns the shared state (configuration, scope store,
//! buffer registry) and the background worker, and routes host events and
//! commands to the right [`BufferSession`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::commands::{CommandId, CommandOutcome};
use crate::config::{settings_menu, ConfigHandle, HighlightConfig, Setting};
use crate::error::ConfigError;
use crate::host::{BufferId, EditorView, WindowId};
use crate::matching::{Matcher, RegexMatcher};
use crate::navigation::Direction;
use crate::registry::BufferRegistry;
use crate::scheduler::{AdaptiveThrottle, DeferredWorker, Stamp, StampClock};
use crate::session::{BufferSession, HighlightOutcome, PromptSeed, ScopeStore};
use crate::span::Span;

/// A matcher usable from the background worker
pub type SharedMatcher = Arc<dyn Matcher + Send + Sync>;

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registry entry for one buffer
///
/// The clock lives outside the session mutex so a new request can supersede
/// a pass that is still running.
#[derive(Clone)]
struct BufferHandle {
    buffer_id: BufferId,
    clock: Arc<StampClock>,
    session: Arc<Mutex<BufferSession>>,
    /// Backoff for the buffer's ambient passes
    throttle: Arc<AdaptiveThrottle>,
}

/// State shared with deferred jobs
struct Shared {
    config: Arc<ConfigHandle>,
    matcher: SharedMatcher,
    scopes: Mutex<ScopeStore>,
    registry: Mutex<BufferRegistry<BufferHandle>>,
}

impl Shared {
    fn handle(&self, buffer_id: BufferId, window_id: WindowId) -> BufferHandle {
        let mut registry = lock(&self.registry);
        let handle = registry.get_or_insert(buffer_id, || {
            let session = BufferSession::new(buffer_id, window_id);
            BufferHandle {
                buffer_id,
                clock: session.clock(),
                session: Arc::new(Mutex::new(session)),
                throttle: Arc::new(AdaptiveThrottle::new()),
            }
        });
        let handle = handle.clone();
        drop(registry);

        let mut session = lock(&handle.session);
        if session.window_id() != window_id {
            session.set_window(window_id);
        }
        drop(session);
        handle
    }

    fn handle_for(&self, view: &dyn EditorView) -> BufferHandle {
        self.handle(view.buffer_id(), view.window_id())
    }

    /// Whether `handle` is still the registered state of its buffer
    fn is_registered(&self, handle: &BufferHandle) -> bool {
        lock(&self.registry)
            .get(handle.buffer_id)
            .is_some_and(|current| Arc::ptr_eq(&current.session, &handle.session))
    }

    fn highlight(
        &self,
        handle: &BufferHandle,
        view: &mut dyn EditorView,
        text: &str,
        stamp: Stamp,
    ) -> HighlightOutcome {
        let config = self.config.snapshot();
        let mut session = lock(&handle.session);
        let mut scopes = lock(&self.scopes);
        session.highlight(view, text, stamp, &config, &mut scopes, self.matcher.as_ref())
    }

    /// Re-apply the stored specification and the permanent keywords
    ///
    /// Keywords are only drawn when the pass for `stamp` applied.
    fn ambient_pass(
        &self,
        handle: &BufferHandle,
        view: &mut dyn EditorView,
        stamp: Stamp,
    ) -> HighlightOutcome {
        let config = self.config.snapshot();
        let mut session = lock(&handle.session);
        let mut scopes = lock(&self.scopes);

        let text = scopes.effective(session.buffer_id(), session.window_id(), config.use_regex);
        let mut outcome = session.highlight(
            view,
            &text,
            stamp,
            &config,
            &mut scopes,
            self.matcher.as_ref(),
        );
        if let HighlightOutcome::Applied(report) = &mut outcome {
            let keyword_diagnostics =
                session.apply_keywords(view, &config, self.matcher.as_ref());
            report.diagnostics.extend(keyword_diagnostics);
        }
        outcome
    }
}

pub struct HighlightService {
    shared: Arc<Shared>,
    worker: DeferredWorker,
}

impl HighlightService {
    /// Service using the `regex` crate for matching
    pub fn new(config: ConfigHandle) -> std::io::Result<Self> {
        Self::with_matcher(config, Arc::new(RegexMatcher::new()))
    }

    pub fn with_matcher(config: ConfigHandle, matcher: SharedMatcher) -> std::io::Result<Self> {
        let worker = DeferredWorker::spawn("highlight-worker")?;
        Ok(Self {
            shared: Arc::new(Shared {
                config: Arc::new(config),
                matcher,
                scopes: Mutex::new(ScopeStore::new()),
                registry: Mutex::new(BufferRegistry::new()),
            }),
            worker,
        })
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Arc<HighlightConfig> {
        self.shared.config.snapshot()
    }

    pub fn config_handle(&self) -> &ConfigHandle {
        &self.shared.config
    }

    /// Re-read the configuration file
    pub fn reload_config(&self) -> Result<Arc<HighlightConfig>, ConfigError> {
        self.shared.config.reload()
    }

    /// Number of buffers with live per-buffer state
    pub fn session_count(&self) -> usize {
        lock(&self.shared.registry).len()
    }

    pub fn has_session(&self, buffer_id: BufferId) -> bool {
        lock(&self.shared.registry).contains(buffer_id)
    }

    /// Number of buffers with a specification stored at view scope
    pub fn stored_view_count(&self) -> usize {
        lock(&self.shared.scopes).view_count()
    }

    /// Effective specification of a view
    pub fn effective_spec(&self, view: &dyn EditorView) -> String {
        let config = self.config();
        lock(&self.shared.scopes).effective(view.buffer_id(), view.window_id(), config.use_regex)
    }

    /// Number of decoration groups currently drawn in `buffer_id`
    pub fn group_count(&self, buffer_id: BufferId) -> usize {
        let handle = lock(&self.shared.registry).get(buffer_id).cloned();
        handle.map_or(0, |handle| lock(&handle.session).group_count())
    }

    /// Labels for the settings quick menu
    pub fn settings_menu(&self) -> Vec<String> {
        settings_menu(&self.config())
    }

    // ========================================================================
    // Prompt
    // ========================================================================

    /// Seed the edit prompt for `view`
    pub fn open_editor(&self, view: &dyn EditorView) -> PromptSeed {
        let config = self.config();
        let handle = self.shared.handle_for(view);
        let session = lock(&handle.session);
        let scopes = lock(&self.shared.scopes);
        session.open_editor(view, &config, &scopes)
    }

    /// The prompt text changed; highlight it after the debounce delay
    ///
    /// Only the pass for the most recent edit applies; earlier ones find
    /// their stamp superseded and do nothing.
    pub fn on_text_changed<V>(&self, view: Arc<Mutex<V>>, text: String) -> Stamp
    where
        V: EditorView + Send + 'static,
    {
        let handle = {
            let view = lock(&view);
            self.shared.handle_for(&*view)
        };
        let stamp = handle.clock.advance();
        let delay = self.config().debounce();
        let shared = Arc::clone(&self.shared);

        self.worker.schedule(delay, move || {
            if !handle.clock.is_current(stamp) {
                tracing::debug!("Skipping superseded highlight {:?}", stamp);
                return;
            }
            let mut view = lock(&view);
            shared.highlight(&handle, &mut *view, &text, stamp);
        });
        stamp
    }

    /// Run a highlight pass for `stamp` right away
    pub fn highlight(&self, view: &mut dyn EditorView, text: &str, stamp: Stamp) -> HighlightOutcome {
        let handle = self.shared.handle_for(view);
        self.shared.highlight(&handle, view, text, stamp)
    }

    /// Supersede pending passes and highlight `text` immediately
    pub fn highlight_now(&self, view: &mut dyn EditorView, text: &str) -> HighlightOutcome {
        let handle = self.shared.handle_for(view);
        let stamp = handle.clock.advance();
        self.shared.highlight(&handle, view, text, stamp)
    }

    /// Stamp issued by the most recent prompt edit for `view`
    pub fn current_stamp(&self, view: &dyn EditorView) -> Stamp {
        self.shared.handle_for(view).clock.current()
    }

    /// Remove all highlights from `view`
    pub fn cancel(&self, view: &mut dyn EditorView) {
        let config = self.config();
        let handle = self.shared.handle_for(view);
        let mut session = lock(&handle.session);
        let mut scopes = lock(&self.shared.scopes);
        session.cancel(view, &config, &mut scopes);
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn select_next(&self, view: &mut dyn EditorView) -> Option<Span> {
        self.select(view, Direction::Next)
    }

    pub fn select_previous(&self, view: &mut dyn EditorView) -> Option<Span> {
        self.select(view, Direction::Previous)
    }

    fn select(&self, view: &mut dyn EditorView, direction: Direction) -> Option<Span> {
        let handle = self.shared.handle_for(view);
        let mut session = lock(&handle.session);
        session.select_match(view, direction)
    }

    // ========================================================================
    // Buffer lifecycle
    // ========================================================================

    /// The buffer was modified; schedule a throttled ambient pass
    pub fn on_modified<V>(&self, view: Arc<Mutex<V>>)
    where
        V: EditorView + Send + 'static,
    {
        self.schedule_ambient(view);
    }

    /// The buffer became active; schedule a throttled ambient pass
    pub fn on_activated<V>(&self, view: Arc<Mutex<V>>)
    where
        V: EditorView + Send + 'static,
    {
        self.schedule_ambient(view);
    }

    /// Each buffer has its own throttle, so passes requested for different
    /// buffers never supersede each other. A job whose buffer was closed (or
    /// closed and reopened) in the meantime does nothing.
    fn schedule_ambient<V>(&self, view: Arc<Mutex<V>>)
    where
        V: EditorView + Send + 'static,
    {
        let handle = {
            let view = lock(&view);
            self.shared.handle_for(&*view)
        };
        let request = handle.throttle.request();
        let delay = handle.throttle.next_delay(self.config().keyword_min_delay());
        let shared = Arc::clone(&self.shared);

        self.worker.schedule(delay, move || {
            let Some(_run) = handle.throttle.try_begin(request) else {
                return;
            };
            // Captured before the registry check so a close racing with this
            // job makes the pass stale
            let stamp = handle.clock.current();
            if !shared.is_registered(&handle) {
                tracing::debug!("Skipping ambient pass for closed {}", handle.buffer_id);
                return;
            }
            let mut view = lock(&view);
            shared.ambient_pass(&handle, &mut *view, stamp);
        });
    }

    /// Re-highlight the stored specification and keywords now
    pub fn run_ambient_pass(&self, view: &mut dyn EditorView) -> HighlightOutcome {
        let handle = self.shared.handle_for(view);
        let stamp = handle.clock.current();
        self.shared.ambient_pass(&handle, view, stamp)
    }

    /// Release all state held for a closed buffer
    pub fn buffer_closed(&self, buffer_id: BufferId) {
        let removed = lock(&self.shared.registry).remove(buffer_id);
        if let Some(handle) = removed {
            // Pending passes for the buffer become stale
            handle.clock.advance();
        }
        lock(&self.shared.scopes).forget_view(buffer_id);
    }

    // ========================================================================
    // Settings and commands
    // ========================================================================

    /// Flip a setting and persist the configuration when file-backed
    pub fn toggle_setting(&self, setting: Setting) -> Result<Arc<HighlightConfig>, ConfigError> {
        let config = self.shared.config.toggle(setting)?;
        tracing::info!("Toggled {:?}", setting);
        Ok(config)
    }

    /// Dispatch a command against `view`
    pub fn execute(
        &self,
        command: CommandId,
        view: &mut dyn EditorView,
    ) -> Result<CommandOutcome, ConfigError> {
        tracing::debug!("Executing {:?} for {}", command, view.buffer_id());
        let outcome = match command {
            CommandId::OpenHighlightPrompt => CommandOutcome::Prompt(self.open_editor(view)),
            CommandId::ToggleSettings(setting) => {
                CommandOutcome::SettingsChanged(self.toggle_setting(setting)?)
            }
            CommandId::SelectNextMatch => CommandOutcome::Selected(self.select_next(view)),
            CommandId::SelectPreviousMatch => CommandOutcome::Selected(self.select_previous(view)),
            CommandId::ClearHighlights => {
                self.cancel(view);
                CommandOutcome::Cleared
            }
        };
        Ok(outcome)
    }
}
