//! A merged, filterable view over the lines of one or more logfiles

use tracing::{debug, info};

use crate::bookmarks::{Bookmarks, CategoryId, CategoryRegistry, Sentinel};
use crate::filter::{
    FilterCommand, FilterEditor, FilterError, FilterKind, FilterPattern, FilterRegistry,
    LineFilterObserver, LineSource,
};

/// Physical lines plus the message boundary of each
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    name: String,
    lines: Vec<String>,
    starts: Vec<bool>,
}

impl LineBuffer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, line: String, starts_message: bool) {
        self.lines.push(line);
        self.starts.push(starts_message);
    }

    pub fn text(&self, index: usize) -> &str {
        &self.lines[index]
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl LineSource for LineBuffer {
    fn name(&self) -> &str {
        &self.name
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> &[u8] {
        self.lines[index].as_bytes()
    }

    fn starts_message(&self, index: usize) -> bool {
        self.starts[index]
    }
}

/// Owns the lines, the filters and the bookmarks of one view
///
/// Bookmarks are keyed by physical line number, so they survive any change
/// to the filter set.
#[derive(Debug)]
pub struct LogView {
    buffer: LineBuffer,
    message_start: Option<FilterPattern>,
    case_sensitive: bool,
    filters: FilterRegistry,
    observer: LineFilterObserver,
    categories: CategoryRegistry,
    bookmarks: Bookmarks<usize>,
    user: CategoryId,
    search: CategoryId,
    file_start: bool,
}

impl LogView {
    pub fn new(
        name: &str,
        message_start: Option<&str>,
        case_sensitive: bool,
    ) -> Result<Self, FilterError> {
        let message_start = message_start
            .map(|pattern| FilterPattern::compile(pattern, true))
            .transpose()?;
        let mut categories = CategoryRegistry::with_defaults();
        let user = categories.register(CategoryRegistry::USER);
        let search = categories.register(CategoryRegistry::SEARCH);

        Ok(Self {
            buffer: LineBuffer::new(name),
            message_start,
            case_sensitive,
            filters: FilterRegistry::new(),
            observer: LineFilterObserver::new(name),
            categories,
            bookmarks: Bookmarks::new(),
            user,
            search,
            file_start: false,
        })
    }

    fn starts_message(&self, line: &str) -> bool {
        // A continuation line before any message start opens a message anyway.
        self.buffer.is_empty()
            || self.file_start
            || self
                .message_start
                .as_ref()
                .is_none_or(|pattern| pattern.is_match(line.as_bytes()))
    }

    /// Append one physical line and run it through every filter
    pub fn append_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        let starts = self.starts_message(&line);
        self.file_start = false;
        let line_number = self.buffer.len();

        self.buffer.push(line, starts);
        self.observer.observe_line(
            &mut self.filters,
            line_number,
            self.buffer.line(line_number),
            starts,
        );
    }

    /// Append the contents of another logfile; its first line always opens
    /// a new message
    pub fn append_file(&mut self, text: &str) {
        self.file_start = true;
        self.append_text(text);
        self.file_start = false;
    }

    pub fn append_text(&mut self, text: &str) {
        for line in text.lines() {
            self.append_line(line.strip_suffix('\r').unwrap_or(line));
        }
    }

    /// Close the last message and recompute which lines are visible
    pub fn refresh(&mut self) {
        self.observer
            .text_filters_changed(&mut self.filters, &self.buffer);
    }

    pub fn apply_command(&mut self, command: &FilterCommand) -> Result<(), FilterError> {
        match command {
            FilterCommand::Add { kind, pattern } => {
                if self.filters.get_filter(pattern).is_some() {
                    self.filters.set_filter_enabled(pattern, true);
                    self.filters.set_filter_kind(pattern, *kind);
                } else {
                    let index = self.filters.add_pattern(*kind, pattern, self.case_sensitive)?;
                    info!("{} [{}] {}", kind.command_name(), index, pattern);
                }
            }
            FilterCommand::Enable(id) => self.set_enabled(id, true)?,
            FilterCommand::Disable(id) => self.set_enabled(id, false)?,
            FilterCommand::Delete(id) => {
                if !self.filters.delete_filter(id) {
                    return Err(FilterError::UnknownFilter(id.clone()));
                }
            }
        }

        self.refresh();
        Ok(())
    }

    fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), FilterError> {
        if self.filters.set_filter_enabled(id, enabled) {
            Ok(())
        } else {
            Err(FilterError::UnknownFilter(id.to_string()))
        }
    }

    /// Flip a filter between include and exclude
    pub fn toggle_kind(&mut self, id: &str) -> Result<FilterKind, FilterError> {
        let kind = self
            .filters
            .get_filter(id)
            .map(|f| f.kind().toggled())
            .ok_or_else(|| FilterError::UnknownFilter(id.to_string()))?;
        self.filters.set_filter_kind(id, kind);
        self.refresh();
        Ok(kind)
    }

    pub fn begin_new_filter(&self, kind: FilterKind) -> Result<FilterEditor, FilterError> {
        FilterEditor::begin_new(&self.filters, kind, self.case_sensitive)
    }

    /// Open an edit session; the view is shown without the filter meanwhile
    pub fn begin_edit(&mut self, id: &str) -> Result<FilterEditor, FilterError> {
        let editor = FilterEditor::begin_existing(&mut self.filters, id, self.case_sensitive)?;
        self.refresh();
        Ok(editor)
    }

    pub fn commit_edit(&mut self, editor: FilterEditor) -> Result<usize, FilterError> {
        let result = editor.commit(&mut self.filters);
        self.refresh();
        result
    }

    pub fn cancel_edit(&mut self, editor: FilterEditor) {
        editor.cancel(&mut self.filters);
        self.refresh();
    }

    /// Replace the text of the final line, as when a partial line grows
    ///
    /// Filters are revised one at a time so no two cursors ever diverge.
    /// The message boundary of the line is kept.
    pub fn amend_last_line(&mut self, text: impl Into<String>) -> Result<(), FilterError> {
        let Some(last) = self.buffer.lines.last_mut() else {
            return Ok(());
        };
        *last = text.into();
        self.refresh();

        let ids: Vec<String> = self.filters.iter().map(|f| f.id().to_string()).collect();
        for id in ids {
            self.observer
                .revise_last_line(&mut self.filters, &id, &self.buffer)?;
        }
        debug!("amended line {}", self.buffer.len() - 1);
        Ok(())
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn observer(&self) -> &LineFilterObserver {
        &self.observer
    }

    /// Physical lines stamped as matching by the filter `id`
    pub fn filter_hits(&self, id: &str) -> Option<usize> {
        self.filters
            .get_filter(id)
            .map(|f| self.observer.state().hits(f.index()))
    }

    pub fn line_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn line(&self, index: usize) -> &str {
        self.buffer.text(index)
    }

    pub fn visible_lines(&self) -> &[usize] {
        self.observer.visible_lines()
    }

    /// Number of physical lines hidden by the current filters
    pub fn filtered_count(&self) -> usize {
        self.buffer.len() - self.visible_lines().len()
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn register_category(&mut self, name: &str) -> CategoryId {
        self.categories.register(name)
    }

    pub fn bookmarks(&self) -> &Bookmarks<usize> {
        &self.bookmarks
    }

    pub fn bookmarks_mut(&mut self) -> &mut Bookmarks<usize> {
        &mut self.bookmarks
    }

    pub fn user_category(&self) -> CategoryId {
        self.user
    }

    pub fn search_category(&self) -> CategoryId {
        self.search
    }

    /// Toggle a user mark on a physical line; true if now marked
    pub fn toggle_mark(&mut self, line: usize) -> bool {
        self.bookmarks.index_mut(self.user).toggle(line)
    }

    /// Mark every visible line matching `pattern` as a search hit
    pub fn search(&mut self, pattern: &str) -> Result<usize, FilterError> {
        let pattern = FilterPattern::compile(pattern, self.case_sensitive)?;
        let hits = self.bookmarks.index_mut(self.search);
        hits.clear();

        for &line in self.observer.visible_lines() {
            if pattern.is_match(self.buffer.line(line)) {
                hits.insert_once(line);
            }
        }
        Ok(hits.len())
    }

    /// Next bookmark of `category` after `from` that is currently visible
    pub fn next_visible_mark(&self, category: CategoryId, from: usize) -> Option<usize> {
        let index = self.bookmarks.get(category)?;
        let mut line = index.next(from);
        while line.is_valid() {
            if self.observer.is_visible(&self.filters, line) {
                return Some(line);
            }
            line = index.next(line);
        }
        None
    }

    /// Previous bookmark of `category` before `from` that is currently visible
    pub fn prev_visible_mark(&self, category: CategoryId, from: usize) -> Option<usize> {
        let index = self.bookmarks.get(category)?;
        let mut line = index.prev(from);
        while line.is_valid() {
            if self.observer.is_visible(&self.filters, line) {
                return Some(line);
            }
            line = index.prev(line);
        }
        None
    }

    /// Names of the categories that bookmark `line`
    pub fn marks_for(&self, line: usize) -> Vec<&str> {
        let ids: Vec<CategoryId> = self.categories.ids().collect();
        self.bookmarks
            .categories_of(&ids, line)
            .into_iter()
            .filter_map(|id| self.categories.name(id))
            .collect()
    }
}
