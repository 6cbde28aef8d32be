//! Per-buffer state lifecycle
//!
//! State is created the first time a buffer is seen and released when the
//! buffer is closed.

mod common;

use common::{buffer, service};
use highlight_words::buffer::TextBuffer;
use highlight_words::host::{BufferId, WindowId};
use highlight_words::EditorView;

#[test]
fn test_state_created_on_first_use() {
    let service = service();
    let mut buf = buffer("foo");
    assert_eq!(service.session_count(), 0);

    service.highlight_now(&mut buf, "foo");
    service.highlight_now(&mut buf, "foo");

    assert_eq!(service.session_count(), 1);
    assert!(service.has_session(buf.buffer_id()));
}

#[test]
fn test_each_buffer_gets_its_own_state() {
    let service = service();
    let mut first = buffer("foo");
    let mut second = TextBuffer::with_text(BufferId(2), WindowId(1), "foo");

    service.highlight_now(&mut first, "foo");
    service.select_next(&mut second);

    assert_eq!(service.session_count(), 2);
    assert_eq!(service.group_count(BufferId(1)), 1);
    assert_eq!(service.group_count(BufferId(2)), 0);
}

#[test]
fn test_buffer_closed_releases_state() {
    let service = service();
    let mut buf = buffer("foo foo");
    service.highlight_now(&mut buf, "foo");
    service.select_next(&mut buf);

    service.buffer_closed(buf.buffer_id());

    assert_eq!(service.session_count(), 0);
    assert!(!service.has_session(buf.buffer_id()));
    assert_eq!(service.effective_spec(&buf), "");
}

#[test]
fn test_reopened_buffer_starts_fresh() {
    let service = service();
    let mut buf = buffer("foo foo");
    service.highlight_now(&mut buf, "foo");
    service.buffer_closed(buf.buffer_id());

    let mut reopened = buffer("foo foo");
    assert_eq!(service.select_next(&mut reopened), None);
    assert_eq!(service.group_count(BufferId(1)), 0);
}

#[test]
fn test_closing_unknown_buffer_is_harmless() {
    let service = service();
    service.buffer_closed(BufferId(42));
    assert_eq!(service.session_count(), 0);
}

#[test]
fn test_buffer_moving_windows_follows_window_scope() {
    use highlight_words::config::HighlightConfig;
    use highlight_words::session::ScopeKind;

    let service = common::service_with(HighlightConfig {
        default_scope: ScopeKind::Window,
        ..HighlightConfig::default()
    });
    let mut first = TextBuffer::with_text(BufferId(1), WindowId(1), "foo");
    service.highlight_now(&mut first, "foo");

    let mut moved = TextBuffer::with_text(BufferId(2), WindowId(2), "foo");
    service.run_ambient_pass(&mut moved);
    assert_eq!(service.group_count(BufferId(2)), 0);

    moved.set_window(WindowId(1));
    service.run_ambient_pass(&mut moved);
    assert_eq!(service.group_count(BufferId(2)), 1);
}
