//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use highlight_words::buffer::TextBuffer;
use highlight_words::config::{ConfigHandle, HighlightConfig, Setting};
use highlight_words::host::{BufferId, WindowId};
use highlight_words::session::{ACTIVE_KEY, GROUP_KEY_PREFIX};
use highlight_words::span::Span;
use highlight_words::HighlightService;

pub const BUFFER: BufferId = BufferId(1);
pub const WINDOW: WindowId = WindowId(1);

/// Buffer 1 in window 1 with the caret at the start
pub fn buffer(text: &str) -> TextBuffer {
    TextBuffer::with_text(BUFFER, WINDOW, text)
}

/// Buffer 1 in window 1 with the caret at `caret`
pub fn buffer_at(text: &str, caret: usize) -> TextBuffer {
    let mut buf = buffer(text);
    buf.set_caret(caret);
    buf
}

/// Config with regex mode on
pub fn regex_config() -> HighlightConfig {
    HighlightConfig::default().toggled(Setting::UseRegex)
}

/// Config with a short debounce for tests that go through the worker
pub fn fast_config() -> HighlightConfig {
    HighlightConfig {
        debounce_ms: 20,
        keyword_min_delay_ms: 20,
        ..HighlightConfig::default()
    }
}

pub fn service() -> HighlightService {
    service_with(HighlightConfig::default())
}

pub fn service_with(config: HighlightConfig) -> HighlightService {
    HighlightService::new(ConfigHandle::new(config)).expect("spawn highlight worker")
}

pub fn spans(pairs: &[(usize, usize)]) -> Vec<Span> {
    pairs.iter().map(|&pair| Span::from(pair)).collect()
}

/// Spans drawn under `key`, empty if the key is not present
pub fn decorated(buf: &TextBuffer, key: &str) -> Vec<Span> {
    buf.decoration(key)
        .map(|decoration| decoration.spans.clone())
        .unwrap_or_default()
}

/// Group decoration keys currently present, excluding the active marker
pub fn group_keys(buf: &TextBuffer) -> Vec<String> {
    buf.decoration_keys()
        .into_iter()
        .filter(|key| key.starts_with(GROUP_KEY_PREFIX) && *key != ACTIVE_KEY)
        .map(str::to_string)
        .collect()
}

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_until<F: FnMut() -> bool>(timeout: Duration, mut condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
