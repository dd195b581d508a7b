use logsieve::filter::{FilterCommand, FilterError, FilterKind};
use logsieve::view::LogView;

const LINES: &[&str] = &[
    "10:00 INFO service starting",
    "10:01 WARN slow response from db",
    "10:02 ERROR request failed",
    "    at handler.rs:42",
    "    at router.rs:7",
    "10:03 INFO healthcheck ok",
    "10:04 ERROR db connection lost",
    "10:05 INFO healthcheck ok",
];

fn command(s: &str) -> FilterCommand {
    FilterCommand::parse(s).expect("valid command")
}

fn loaded_view() -> LogView {
    let mut view = LogView::new("app.log", Some(r"^\d{2}:\d{2} "), false).expect("valid view");
    for line in LINES {
        view.append_line(*line);
    }
    view.refresh();
    view
}

#[test]
fn test_incremental_filters_match_fresh_rebuild() {
    let commands = ["filter-in error|warn", "filter-out db", "filter-in healthcheck"];

    let mut incremental = loaded_view();
    for cmd in commands {
        incremental.apply_command(&command(cmd)).unwrap();
    }

    let mut fresh = LogView::new("app.log", Some(r"^\d{2}:\d{2} "), false).unwrap();
    for cmd in commands {
        fresh.apply_command(&command(cmd)).unwrap();
    }
    for line in LINES {
        fresh.append_line(*line);
    }
    fresh.refresh();

    assert_eq!(incremental.visible_lines(), fresh.visible_lines());
    assert_eq!(incremental.visible_lines(), &[2, 3, 4, 5, 7]);
}

#[test]
fn test_stack_trace_lines_follow_their_message() {
    let mut view = loaded_view();
    view.apply_command(&command("filter-out request failed")).unwrap();
    assert_eq!(view.visible_lines(), &[0, 1, 5, 6, 7]);
    assert_eq!(view.filter_hits("request failed"), Some(3));
}

#[test]
fn test_deleted_filter_index_is_reused_cleanly() {
    let mut view = loaded_view();
    view.apply_command(&command("filter-out healthcheck")).unwrap();
    view.apply_command(&command("delete-filter healthcheck")).unwrap();
    view.apply_command(&command("filter-in service")).unwrap();

    let filter = view.filters().get_filter("service").unwrap();
    assert_eq!(filter.index(), 0);
    assert_eq!(view.visible_lines(), &[0]);
}

#[test]
fn test_edit_hides_filter_until_commit() {
    let mut view = loaded_view();
    view.apply_command(&command("filter-out healthcheck")).unwrap();
    assert_eq!(view.visible_lines().len(), LINES.len() - 2);

    let mut editor = view.begin_edit("healthcheck").unwrap();
    assert_eq!(view.visible_lines().len(), LINES.len());

    editor.preview("INFO").unwrap();
    assert_eq!(editor.preview_matches(LINES[0].as_bytes()), vec![(6, 10)]);

    let index = view.commit_edit(editor).unwrap();
    assert_eq!(index, 0);
    assert!(view.filters().get_filter("healthcheck").is_none());
    assert_eq!(view.filters().get_filter("INFO").unwrap().index(), 0);
    assert_eq!(view.visible_lines(), &[1, 2, 3, 4, 6]);
}

#[test]
fn test_invalid_pattern_leaves_filter_untouched() {
    let mut view = loaded_view();
    view.apply_command(&command("filter-out healthcheck")).unwrap();
    let shown = view.visible_lines().to_vec();

    let mut editor = view.begin_edit("healthcheck").unwrap();
    let err = editor.preview("health(").unwrap_err();
    assert!(matches!(err, FilterError::InvalidPattern { .. }));

    view.cancel_edit(editor);
    let filter = view.filters().get_filter("healthcheck").unwrap();
    assert!(filter.is_enabled());
    assert_eq!(view.visible_lines(), shown.as_slice());
}

#[test]
fn test_cancel_restores_disabled_state() {
    let mut view = loaded_view();
    view.apply_command(&command("filter-out healthcheck")).unwrap();
    view.apply_command(&command("disable-filter healthcheck")).unwrap();

    let editor = view.begin_edit("healthcheck").unwrap();
    view.cancel_edit(editor);

    assert!(!view.filters().get_filter("healthcheck").unwrap().is_enabled());
    assert_eq!(view.visible_lines().len(), LINES.len());
}

#[test]
fn test_new_filter_session() {
    let mut view = loaded_view();
    let mut editor = view.begin_new_filter(FilterKind::Include).unwrap();
    assert!(editor.preview("[").is_err());
    assert!(view.filters().empty());

    editor.preview("warn").unwrap();
    view.commit_edit(editor).unwrap();
    assert_eq!(view.visible_lines(), &[1]);
}

#[test]
fn test_amended_last_line_is_reevaluated() {
    let mut view = LogView::new("tail.log", None, false).unwrap();
    view.append_line("job 1 done");
    view.append_line("job 2 runn");
    view.refresh();
    view.apply_command(&command("filter-in done")).unwrap();
    view.apply_command(&command("filter-out job 3")).unwrap();
    assert_eq!(view.visible_lines(), &[0]);

    view.amend_last_line("job 2 done").unwrap();
    assert_eq!(view.visible_lines(), &[0, 1]);
    assert_eq!(view.filter_hits("done"), Some(2));
    assert!(view.observer().check_aligned(view.filters()).is_ok());
}

#[test]
fn test_amended_continuation_line_affects_whole_message() {
    let mut view = LogView::new("tail.log", Some("^start"), false).unwrap();
    view.append_line("start request");
    view.append_line("  payload");
    view.refresh();
    view.apply_command(&command("filter-out secret")).unwrap();
    assert_eq!(view.visible_lines(), &[0, 1]);

    view.amend_last_line("  payload secret=1").unwrap();
    assert!(view.visible_lines().is_empty());
}

#[test]
fn test_continuation_after_refresh_joins_its_message() {
    let mut view = LogView::new("tail.log", Some(r"^\d{2}:"), false).unwrap();
    view.append_line("10: ERROR crash");
    view.refresh();
    view.apply_command(&command("filter-in error")).unwrap();
    assert_eq!(view.visible_lines(), &[0]);

    view.append_line("    at main.rs:1");
    view.refresh();
    assert_eq!(view.visible_lines(), &[0, 1]);
    assert_eq!(view.filter_hits("error"), Some(2));

    view.append_line("11: INFO next");
    view.refresh();
    assert_eq!(view.visible_lines(), &[0, 1]);
}

#[test]
fn test_late_continuation_can_hide_whole_message() {
    let mut view = LogView::new("tail.log", Some("^start"), false).unwrap();
    view.append_line("start request");
    view.refresh();
    view.apply_command(&command("filter-out secret")).unwrap();
    assert_eq!(view.visible_lines(), &[0]);

    view.append_line("  secret=1");
    view.refresh();
    assert!(view.visible_lines().is_empty());
}

#[test]
fn test_amend_removing_the_only_match_clears_message() {
    let mut view = LogView::new("tail.log", Some("^start"), false).unwrap();
    view.append_line("start request");
    view.append_line("  payload secret");
    view.refresh();
    view.apply_command(&command("filter-in secret")).unwrap();
    assert_eq!(view.visible_lines(), &[0, 1]);

    view.amend_last_line("  payload clean").unwrap();
    assert!(view.visible_lines().is_empty());
    assert_eq!(view.filter_hits("secret"), Some(0));
    assert!(view.observer().check_aligned(view.filters()).is_ok());
}

#[test]
fn test_amend_keeps_match_from_earlier_line() {
    let mut view = LogView::new("tail.log", Some("^start"), false).unwrap();
    view.append_line("start secret request");
    view.append_line("  payload secret");
    view.refresh();
    view.apply_command(&command("filter-in secret")).unwrap();

    view.amend_last_line("  payload clean").unwrap();
    assert_eq!(view.visible_lines(), &[0, 1]);
}

#[test]
fn test_commit_after_failed_preview_keeps_original_filter() {
    let mut view = loaded_view();
    view.apply_command(&command("filter-out healthcheck")).unwrap();
    let shown = view.visible_lines().to_vec();

    let mut editor = view.begin_edit("healthcheck").unwrap();
    editor.preview("health").unwrap();
    assert!(editor.preview("health(").is_err());

    let err = view.commit_edit(editor).unwrap_err();
    assert!(matches!(err, FilterError::InvalidPattern { .. }));
    let ids: Vec<&str> = view.filters().iter().map(|f| f.id()).collect();
    assert_eq!(ids, vec!["healthcheck"]);
    assert!(view.filters().get_filter("healthcheck").unwrap().is_enabled());
    assert_eq!(view.visible_lines(), shown.as_slice());
}
