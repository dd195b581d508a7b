use crate::bookmarks::CategoryRegistry;
use crate::config::OutputRules;
use crate::view::LogView;
use colored::Colorize;
use comfy_table::{Attribute, Cell, ContentArrangement, Table, presets};
use serde::Serialize;
use std::fmt::Write;

/// Options for rendering the visible lines
#[derive(Debug, Clone)]
pub struct ViewOptions<'a> {
    pub rules: &'a OutputRules,
    pub marked_only: bool,
}

#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    line: usize,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    marks: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct JsonFilter {
    index: usize,
    kind: String,
    enabled: bool,
    hits: usize,
    pattern: String,
}

#[derive(Debug, Serialize)]
struct JsonView<'a> {
    total_lines: usize,
    filtered_lines: usize,
    filters: Vec<JsonFilter>,
    lines: Vec<JsonLine<'a>>,
}

fn shown_lines<'a>(view: &'a LogView, options: &ViewOptions<'_>) -> Vec<(usize, Vec<&'a str>)> {
    view.visible_lines()
        .iter()
        .map(|&line| (line, view.marks_for(line)))
        .filter(|(_, marks)| !options.marked_only || !marks.is_empty())
        .collect()
}

/// Render visible lines as text, one per line, with bookmark markers
pub fn format_view_text(view: &LogView, options: &ViewOptions<'_>) -> String {
    let mut out = String::new();
    let blank = " ".repeat(options.rules.mark_symbol.chars().count().max(1));

    for (line, marks) in shown_lines(view, options) {
        let is_user = marks.contains(&CategoryRegistry::USER);
        let is_hit = marks.contains(&CategoryRegistry::SEARCH);

        let marker = if is_user {
            options.rules.mark_symbol.cyan().bold().to_string()
        } else {
            blank.clone()
        };
        let text = if is_hit {
            view.line(line).yellow().bold().to_string()
        } else {
            view.line(line).to_string()
        };

        if options.rules.line_numbers {
            let _ = writeln!(out, "{marker}{:>6}: {text}", line + 1);
        } else {
            let _ = writeln!(out, "{marker}{text}");
        }
    }

    out
}

fn json_filters(view: &LogView) -> Vec<JsonFilter> {
    view.filters()
        .iter()
        .map(|f| JsonFilter {
            index: f.index(),
            kind: f.kind().command_name().to_string(),
            enabled: f.is_enabled(),
            hits: view.filter_hits(f.id()).unwrap_or(0),
            pattern: f.pattern().as_str().to_string(),
        })
        .collect()
}

/// Render visible lines and filter summary as a JSON document
pub fn format_view_json(view: &LogView, options: &ViewOptions<'_>) -> String {
    let lines = shown_lines(view, options)
        .into_iter()
        .map(|(line, marks)| JsonLine {
            line: line + 1,
            text: view.line(line),
            marks,
        })
        .collect();

    let doc = JsonView {
        total_lines: view.line_count(),
        filtered_lines: view.filtered_count(),
        filters: json_filters(view),
        lines,
    };
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
}

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

/// Table of installed filters and the lines each one matched
pub fn format_filters_table(view: &LogView) -> String {
    if view.filters().empty() {
        return "No filters defined.\n".to_string();
    }

    let mut table = create_styled_table(&["Index", "Type", "Enabled", "Hits", "Pattern"]);
    for filter in view.filters().iter() {
        table.add_row(vec![
            Cell::new(filter.index()),
            Cell::new(filter.kind()),
            Cell::new(if filter.is_enabled() { "yes" } else { "no" }),
            Cell::new(view.filter_hits(filter.id()).unwrap_or(0)),
            Cell::new(filter.pattern().as_str()),
        ]);
    }

    format!(
        "{table}\n{} of {} lines hidden\n",
        view.filtered_count(),
        view.line_count()
    )
}

pub fn format_filters_json(view: &LogView) -> String {
    serde_json::to_string_pretty(&json_filters(view)).unwrap_or_else(|_| "[]".to_string())
}
