//! Highlight pass tests
//!
//! Drives the service against an in-memory buffer and checks the decorations
//! it leaves behind.

mod common;

use common::{buffer, buffer_at, decorated, group_keys, regex_config, service, service_with, spans};
use highlight_words::buffer::TextBuffer;
use highlight_words::config::{HighlightConfig, KeywordMapping, Setting};
use highlight_words::host::{BufferId, WindowId};
use highlight_words::keywords::keyword_key;
use highlight_words::matching::GroupKind;
use highlight_words::session::{group_key, HighlightOutcome, HighlightReport, ScopeKind};
use highlight_words::HighlightError;

fn applied(outcome: HighlightOutcome) -> HighlightReport {
    match outcome {
        HighlightOutcome::Applied(report) => report,
        HighlightOutcome::Stale => panic!("expected an applied pass"),
    }
}

// ========================================================================
// Scenarios
// ========================================================================

#[test]
fn test_literal_scenario() {
    let service = service();
    let mut buf = buffer("foo bar foo baz");

    let report = applied(service.highlight_now(&mut buf, "foo"));

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].color_class, 0);
    assert_eq!(report.spans.as_slice(), spans(&[(0, 3), (8, 11)]).as_slice());

    let decoration = buf.decoration(&group_key(0)).unwrap();
    assert_eq!(decoration.spans, spans(&[(0, 3), (8, 11)]));
    assert_eq!(decoration.color, "string");
}

#[test]
fn test_pattern_then_literal_scenario() {
    let service = service_with(regex_config());
    let mut buf = buffer("foo bar bar");

    let report = applied(service.highlight_now(&mut buf, "/f(o+)/ bar"));

    assert_eq!(report.groups.len(), 2);
    assert!(matches!(report.groups[0].kind, GroupKind::Pattern { .. }));
    assert!(matches!(report.groups[1].kind, GroupKind::Literal { .. }));
    assert_eq!(decorated(&buf, &group_key(0)), spans(&[(1, 3)]));
    assert_eq!(decorated(&buf, &group_key(1)), spans(&[(4, 7), (8, 11)]));
    assert_eq!(buf.decoration(&group_key(1)).unwrap().color, "entity.name.class");
}

#[test]
fn test_single_char_scenario() {
    let service = service();
    let mut buf = buffer("a a a");

    let report = applied(service.highlight_now(&mut buf, "a"));

    assert!(report.groups.is_empty());
    assert!(report.spans.is_empty());
    assert!(group_keys(&buf).is_empty());
}

#[test]
fn test_malformed_spec_falls_back_to_words() {
    let service = service_with(regex_config());
    let mut buf = buffer("x /foo bar");

    let report = applied(service.highlight_now(&mut buf, "/foo bar"));

    assert!(matches!(
        report.diagnostics[0],
        HighlightError::ParseFallback { .. }
    ));
    let labels: Vec<&str> = report.groups.iter().map(|g| g.label()).collect();
    assert_eq!(labels, vec!["/foo", "bar"]);
    assert_eq!(decorated(&buf, &group_key(0)), spans(&[(2, 6)]));
}

#[test]
fn test_bad_pattern_is_reported_and_skipped() {
    let service = service_with(regex_config());
    let mut buf = buffer("b cc");

    let report = applied(service.highlight_now(&mut buf, "/a(/ /(b)/ cc"));

    assert!(report
        .diagnostics
        .iter()
        .any(|d| matches!(d, HighlightError::PatternCompile { .. })));
    assert_eq!(report.groups.len(), 2);
}

#[test]
fn test_ignore_case() {
    let service = service_with(HighlightConfig::default().toggled(Setting::IgnoreCase));
    let mut buf = buffer("Foo FOO foo");

    applied(service.highlight_now(&mut buf, "foo"));

    assert_eq!(decorated(&buf, &group_key(0)).len(), 3);
}

#[test]
fn test_shared_span_is_drawn_by_last_group() {
    let service = service_with(regex_config());
    let mut buf = buffer("foo x foo");

    applied(service.highlight_now(&mut buf, "/(foo)/ foo"));

    assert!(decorated(&buf, &group_key(0)).is_empty());
    assert_eq!(decorated(&buf, &group_key(1)), spans(&[(0, 3), (6, 9)]));
}

#[test]
fn test_colors_cycle_through_palette() {
    let config = HighlightConfig {
        colors_by_scope: vec!["red".to_string(), "blue".to_string()],
        ..HighlightConfig::default()
    };
    let service = service_with(config);
    let mut buf = buffer("aa bb cc");

    applied(service.highlight_now(&mut buf, "aa bb cc"));

    let colors: Vec<&str> = (0..3)
        .map(|i| buf.decoration(&group_key(i)).unwrap().color.as_str())
        .collect();
    assert_eq!(colors, vec!["red", "blue", "red"]);
}

// ========================================================================
// Pass Lifecycle
// ========================================================================

#[test]
fn test_highlight_is_idempotent() {
    let service = service();
    let mut buf = buffer("foo bar foo bar foo");

    let first = applied(service.highlight_now(&mut buf, "foo"));
    let landed = service.select_next(&mut buf).unwrap();

    let second = applied(service.highlight(&mut buf, "foo", first.stamp));

    assert_eq!(first.spans, second.spans);
    assert_eq!(second.erased, 0);
    // The cursor still points at the landed span
    let after = service.select_next(&mut buf).unwrap();
    assert_eq!(landed.start, 0);
    assert_eq!(after.start, 8);
}

#[test]
fn test_shrinking_erases_trailing_keys() {
    let service = service();
    let mut buf = buffer("foo bar baz");

    applied(service.highlight_now(&mut buf, "foo bar baz"));
    assert_eq!(group_keys(&buf).len(), 3);

    let report = applied(service.highlight_now(&mut buf, "bar"));

    assert_eq!(report.erased, 2);
    assert_eq!(group_keys(&buf), vec![group_key(0)]);
    assert_eq!(decorated(&buf, &group_key(0)), spans(&[(4, 7)]));
    assert_eq!(service.group_count(buf_id(&buf)), 1);
}

#[test]
fn test_stale_stamp_is_noop() {
    let service = service();
    let mut buf = buffer("foo bar");

    let old = service.current_stamp(&buf);
    applied(service.highlight_now(&mut buf, "foo"));

    let outcome = service.highlight(&mut buf, "bar", old);

    assert!(outcome.is_stale());
    assert_eq!(decorated(&buf, &group_key(0)), spans(&[(0, 3)]));
    assert_eq!(service.effective_spec(&buf), "foo");
}

#[test]
fn test_size_limit_truncates_scanned_text() {
    let config = HighlightConfig {
        file_size_limit: 8,
        ..HighlightConfig::default()
    };
    let service = service_with(config);
    let mut buf = buffer("foo xxxx foo");

    let report = applied(service.highlight_now(&mut buf, "foo"));

    assert_eq!(report.scanned_bytes, 8);
    assert_eq!(decorated(&buf, &group_key(0)), spans(&[(0, 3)]));
}

#[test]
fn test_empty_buffer_is_valid() {
    let service = service();
    let mut buf = buffer("");

    let report = applied(service.highlight_now(&mut buf, "foo"));

    assert_eq!(report.groups.len(), 1);
    assert!(report.spans.is_empty());
    assert_eq!(service.select_next(&mut buf), None);
}

#[test]
fn test_cancel_erases_everything() {
    let service = service();
    let mut buf = buffer("foo bar foo");

    applied(service.highlight_now(&mut buf, "foo bar"));
    service.select_next(&mut buf);
    service.cancel(&mut buf);

    assert!(buf.decorations().is_empty());
    assert_eq!(service.group_count(buf_id(&buf)), 0);
    assert_eq!(service.select_next(&mut buf), None);
    // The specification survives unless clear_on_cancel is set
    assert_eq!(service.effective_spec(&buf), "foo bar");
}

#[test]
fn test_cancel_with_clear_on_cancel_forgets_spec() {
    let service = service_with(HighlightConfig {
        clear_on_cancel: true,
        ..HighlightConfig::default()
    });
    let mut buf = buffer("foo");

    applied(service.highlight_now(&mut buf, "foo"));
    service.cancel(&mut buf);

    assert_eq!(service.effective_spec(&buf), "");
}

#[test]
fn test_cancel_supersedes_pending_stamp() {
    let service = service();
    let mut buf = buffer("foo");

    let report = applied(service.highlight_now(&mut buf, "foo"));
    service.cancel(&mut buf);

    assert!(service.highlight(&mut buf, "foo", report.stamp).is_stale());
    assert!(buf.decorations().is_empty());
}

// ========================================================================
// Prompt Seeding
// ========================================================================

#[test]
fn test_open_editor_appends_cursor_word() {
    let service = service();
    let mut buf = buffer_at("foo bar baz", 9);

    applied(service.highlight_now(&mut buf, "foo bar"));
    let seed = service.open_editor(&buf);

    assert_eq!(seed.text, "foo bar baz");
    assert_eq!(seed.prompt, "Highlight words (Literal, Case Sensitive):");
}

#[test]
fn test_open_editor_removes_present_cursor_word() {
    let service = service();
    let mut buf = buffer_at("foo bar baz", 1);

    applied(service.highlight_now(&mut buf, "foo bar"));
    let seed = service.open_editor(&buf);

    assert_eq!(seed.text, "bar");
}

#[test]
fn test_open_editor_uses_first_selection_only() {
    let service = service();
    let mut buf = buffer("foo bar baz");
    buf.set_selections(spans(&[(4, 7), (8, 11)]));

    let seed = service.open_editor(&buf);

    assert_eq!(seed.text, "bar");
}

#[test]
fn test_whole_word_cursor_term_matches_whole_words() {
    let config = regex_config().toggled(Setting::WholeWord);
    let service = service_with(config);
    let mut buf = buffer_at("foo food foo", 0);

    let seed = service.open_editor(&buf);
    assert_eq!(seed.text, "\\bfoo\\b");
    assert_eq!(seed.prompt, "Highlight words (RegEx, Case Sensitive):");

    applied(service.highlight_now(&mut buf, &seed.text));

    assert_eq!(decorated(&buf, &group_key(0)), spans(&[(0, 3), (9, 12)]));
}

// ========================================================================
// Scopes and Keywords
// ========================================================================

#[test]
fn test_global_scope_is_shared_between_buffers() {
    let service = service_with(HighlightConfig {
        default_scope: ScopeKind::Global,
        ..HighlightConfig::default()
    });
    let mut first = buffer("foo");
    let mut second = TextBuffer::with_text(BufferId(2), WindowId(2), "foo foo");

    applied(service.highlight_now(&mut first, "foo"));
    let report = applied(service.run_ambient_pass(&mut second));

    assert_eq!(report.spans.len(), 2);
    assert_eq!(service.effective_spec(&second), "foo");
}

#[test]
fn test_view_scope_is_private() {
    let service = service();
    let mut first = buffer("foo");
    let mut second = TextBuffer::with_text(BufferId(2), WindowId(1), "foo");

    applied(service.highlight_now(&mut first, "foo"));
    let report = applied(service.run_ambient_pass(&mut second));

    assert!(report.groups.is_empty());
}

#[test]
fn test_ambient_pass_applies_keywords() {
    let config = HighlightConfig {
        permanent_keyword_map: vec![KeywordMapping {
            keyword: "TODO".to_string(),
            color: "invalid".to_string(),
            literal: true,
            ignore_case: false,
        }],
        ..HighlightConfig::default()
    };
    let service = service_with(config);
    let mut buf = buffer("TODO: fix foo");

    applied(service.highlight_now(&mut buf, "foo"));
    applied(service.run_ambient_pass(&mut buf));

    let keyword = buf.decoration(&keyword_key(0)).unwrap();
    assert_eq!(keyword.spans, spans(&[(0, 4)]));
    assert_eq!(keyword.color, "invalid");
    assert_eq!(decorated(&buf, &group_key(0)), spans(&[(10, 13)]));
}

#[test]
fn test_ambient_pass_follows_buffer_edits() {
    let service = service();
    let mut buf = buffer("foo");

    applied(service.highlight_now(&mut buf, "foo"));
    buf.insert(3, " foo");
    applied(service.run_ambient_pass(&mut buf));

    assert_eq!(decorated(&buf, &group_key(0)), spans(&[(0, 3), (4, 7)]));
}

fn buf_id(buf: &TextBuffer) -> BufferId {
    use highlight_words::EditorView;
    buf.buffer_id()
}
