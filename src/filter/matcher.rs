use regex::bytes::{Regex, RegexBuilder};
use std::fmt;
use std::str::FromStr;

use super::error::{CommandParseError, FilterError};
use super::state::FilterState;

/// Whether matching messages are kept or hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Include,
    Exclude,
}

impl FilterKind {
    /// Name of the command that creates a filter of this kind
    pub fn command_name(&self) -> &'static str {
        match self {
            FilterKind::Include => "filter-in",
            FilterKind::Exclude => "filter-out",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            FilterKind::Include => FilterKind::Exclude,
            FilterKind::Exclude => FilterKind::Include,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Include => write!(f, "IN"),
            FilterKind::Exclude => write!(f, "OUT"),
        }
    }
}

impl FromStr for FilterKind {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filter-in" | "in" | "include" => Ok(FilterKind::Include),
            "filter-out" | "out" | "exclude" => Ok(FilterKind::Exclude),
            _ => Err(CommandParseError::UnknownCommand(s.to_string())),
        }
    }
}

/// A pattern compiled once, at creation or edit time
#[derive(Clone)]
pub struct FilterPattern {
    source: String,
    regex: Regex,
}

impl FilterPattern {
    /// Compile a pattern, case-insensitive unless `case_sensitive` is set
    pub fn compile(source: &str, case_sensitive: bool) -> Result<Self, FilterError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|source_err| FilterError::InvalidPattern {
                pattern: source.to_string(),
                source: source_err,
            })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, line: &[u8]) -> bool {
        self.regex.is_match(line)
    }

    /// Byte ranges of every match, for highlighting previews
    pub fn find_matches(&self, line: &[u8]) -> Vec<(usize, usize)> {
        self.regex
            .find_iter(line)
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}

impl fmt::Debug for FilterPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilterPattern").field(&self.source).finish()
    }
}

/// Snapshot of the accumulators taken when a message is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MessageSnapshot {
    matched: bool,
    lines: usize,
}

/// One user-defined include/exclude filter and its per-message accumulators
///
/// Lines are fed with [`FilterMatcher::add_line`] while a message is open.
/// [`FilterMatcher::end_of_message`] stamps the single decision for the
/// message onto every one of its physical lines in the [`FilterState`].
#[derive(Debug, Clone)]
pub struct FilterMatcher {
    id: String,
    kind: FilterKind,
    index: usize,
    enabled: bool,
    pattern: FilterPattern,

    matched_this_message: bool,
    lines_in_this_message: usize,
    last: Option<MessageSnapshot>,
}

impl FilterMatcher {
    /// Create a filter whose id is the pattern text
    pub fn new(kind: FilterKind, index: usize, pattern: FilterPattern) -> Self {
        Self {
            id: pattern.as_str().to_string(),
            kind,
            index,
            enabled: true,
            pattern,
            matched_this_message: false,
            lines_in_this_message: 0,
            last: None,
        }
    }

    /// Compile `pattern` and create a filter for it
    pub fn compile(
        kind: FilterKind,
        index: usize,
        pattern: &str,
        case_sensitive: bool,
    ) -> Result<Self, FilterError> {
        Ok(Self::new(
            kind,
            index,
            FilterPattern::compile(pattern, case_sensitive)?,
        ))
    }

    pub fn matches(&self, line: &[u8]) -> bool {
        self.pattern.is_match(line)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: FilterKind) {
        self.kind = kind;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Bit of this filter inside a per-line mask
    pub fn bit(&self) -> u32 {
        1u32 << self.index
    }

    pub fn pattern(&self) -> &FilterPattern {
        &self.pattern
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Number of lines accumulated for the message that is still open
    pub fn pending_lines(&self) -> usize {
        self.lines_in_this_message
    }

    pub fn pending_match(&self) -> bool {
        self.matched_this_message
    }

    /// Render the filter as the command that recreates it
    pub fn serialize(&self) -> String {
        format!("{} {}", self.kind.command_name(), self.pattern.as_str())
    }

    /// Swap in a new pattern and forget any accumulated message state
    pub(crate) fn replace_pattern(&mut self, pattern: FilterPattern) {
        self.id = pattern.as_str().to_string();
        self.pattern = pattern;
        self.reset();
    }

    pub(crate) fn reset(&mut self) {
        self.discard_pending();
        self.last = None;
    }

    pub fn add_line(&mut self, _state: &FilterState, line: &[u8]) {
        if self.matches(line) {
            self.matched_this_message = true;
        }
        self.lines_in_this_message += 1;
    }

    pub fn end_of_message(&mut self, state: &mut FilterState) {
        let bit = self.bit();
        let start = state.count(self.index);
        state.resize(start + self.lines_in_this_message);

        for _ in 0..self.lines_in_this_message {
            let line_number = state.count(self.index);
            state.stamp(line_number, bit, self.matched_this_message);
            state.advance(self.index, self.matched_this_message);
        }

        self.last = Some(MessageSnapshot {
            matched: self.matched_this_message,
            lines: self.lines_in_this_message,
        });
        self.matched_this_message = false;
        self.lines_in_this_message = 0;
    }

    /// Undo the most recent `end_of_message` for this filter only
    ///
    /// The message is reopened without its final line, so the caller can
    /// feed that line again. Nothing happens if there is no stamp to undo.
    pub fn revert_to_last(&mut self, state: &mut FilterState) {
        if self.reopen_last(state) > 0 {
            self.lines_in_this_message -= 1;
            if self.lines_in_this_message == 0 {
                self.matched_this_message = false;
            }
        }
    }

    /// Undo the most recent `end_of_message` and reopen that message whole
    ///
    /// Returns the number of lines put back into the open message, 0 when
    /// there was no stamp to undo. Must only be called with no message open.
    pub(crate) fn reopen_last(&mut self, state: &mut FilterState) -> usize {
        let Some(last) = self.last.take() else {
            return 0;
        };

        let bit = self.bit();
        let mut reopened = 0;
        while reopened < last.lines && state.count(self.index) > 0 {
            state.retreat(self.index, last.matched);
            let line_number = state.count(self.index);
            state.stamp(line_number, bit, false);
            reopened += 1;
        }

        self.matched_this_message = last.matched && reopened > 0;
        self.lines_in_this_message = reopened;
        reopened
    }

    /// Forget the open message without stamping it
    pub(crate) fn discard_pending(&mut self) {
        self.matched_this_message = false;
        self.lines_in_this_message = 0;
    }
}
