use tracing::{debug, warn};

use super::error::FilterError;
use super::registry::{FilterMask, FilterRegistry};
use super::state::FilterState;

/// Physical lines of one logfile, with message boundaries
pub trait LineSource {
    fn name(&self) -> &str;

    fn line_count(&self) -> usize;

    /// Raw bytes of physical line `index`
    fn line(&self, index: usize) -> &[u8];

    /// Whether physical line `index` begins a new message
    fn starts_message(&self, index: usize) -> bool;
}

/// Drives every filter of a registry over the lines of one logfile
///
/// Owns the [`FilterState`] of the logfile and the index of visible
/// physical lines computed from it.
#[derive(Debug, Clone)]
pub struct LineFilterObserver {
    state: FilterState,
    visible: Vec<usize>,
}

impl LineFilterObserver {
    pub fn new(logfile: impl Into<String>) -> Self {
        Self {
            state: FilterState::new(logfile),
            visible: Vec::new(),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Physical line numbers that passed the last rebuild, in order
    pub fn visible_lines(&self) -> &[usize] {
        &self.visible
    }

    /// Feed one physical line to every filter that has not seen it yet
    ///
    /// A continuation line that follows an already stamped message reopens
    /// that message, so the late line shares its decision.
    pub fn observe_line(
        &mut self,
        registry: &mut FilterRegistry,
        line_number: usize,
        line: &[u8],
        starts_message: bool,
    ) {
        self.state.resize(line_number + 1);

        for filter in registry.iter_mut() {
            let position = self.state.count(filter.index()) + filter.pending_lines();
            if line_number < position {
                continue;
            }
            if line_number > position {
                warn!(
                    "filter [{}] skipped lines {}..{}",
                    filter.index(),
                    position,
                    line_number
                );
                continue;
            }
            if starts_message {
                if filter.pending_lines() > 0 {
                    filter.end_of_message(&mut self.state);
                }
            } else if filter.pending_lines() == 0 {
                filter.reopen_last(&mut self.state);
            }
            filter.add_line(&self.state, line);
        }
    }

    /// Feed lines `start..end` of `source`
    pub fn new_lines(
        &mut self,
        registry: &mut FilterRegistry,
        source: &impl LineSource,
        start: usize,
        end: usize,
    ) {
        for line_number in start..end {
            self.observe_line(
                registry,
                line_number,
                source.line(line_number),
                source.starts_message(line_number),
            );
        }
    }

    /// Close the message that is still open in every filter
    pub fn eof(&mut self, registry: &mut FilterRegistry, estimated_remaining: usize) {
        self.state.reserve(self.state.len() + estimated_remaining);
        for filter in registry.iter_mut() {
            if filter.pending_lines() > 0 {
                filter.end_of_message(&mut self.state);
            }
        }
    }

    /// Smallest write cursor among the registry's filters, capped at `max`
    pub fn min_count(&self, registry: &FilterRegistry, max: usize) -> usize {
        registry
            .iter()
            .map(|f| self.state.count(f.index()))
            .fold(max, usize::min)
    }

    /// Drop results for filters that were added, replaced or deleted
    pub fn sync(&mut self, registry: &mut FilterRegistry) {
        let dirty = registry.take_dirty_mask();
        if dirty != 0 {
            debug!("clearing filter state for mask {:#034b}", dirty);
        }
        self.state.clear_filters(dirty);
        self.state.clear_deleted_filter_state(registry.used_mask());
    }

    /// Bring every filter up to date with `source` and rebuild the index
    ///
    /// Only the lines after the slowest filter's cursor are observed again.
    pub fn text_filters_changed(&mut self, registry: &mut FilterRegistry, source: &impl LineSource) {
        self.sync(registry);

        let line_count = source.line_count();
        let start = self.min_count(registry, line_count);
        if start < line_count {
            debug!("reobserving {} from line {}", source.name(), start);
        }

        self.state.resize(line_count);
        self.new_lines(registry, source, start, line_count);
        self.eof(registry, 0);
        self.rebuild_index(registry, line_count);
    }

    /// Recompute the visible physical lines from the stamped masks
    pub fn rebuild_index(&mut self, registry: &FilterRegistry, line_count: usize) {
        let (include_mask, exclude_mask) = registry.get_enabled_mask();
        self.visible = (0..line_count)
            .filter(|line| !self.state.excluded(include_mask, exclude_mask, *line))
            .collect();
    }

    pub fn is_visible(&self, registry: &FilterRegistry, line: usize) -> bool {
        let (include_mask, exclude_mask) = registry.get_enabled_mask();
        !self.state.excluded(include_mask, exclude_mask, line)
    }

    fn diverged(&self, registry: &FilterRegistry) -> Vec<usize> {
        let positions: Vec<(usize, usize)> = registry
            .iter()
            .map(|f| (f.index(), self.state.count(f.index()) + f.pending_lines()))
            .collect();
        let Some(front) = positions.iter().map(|(_, pos)| *pos).max() else {
            return Vec::new();
        };

        positions
            .into_iter()
            .filter(|(_, pos)| *pos != front)
            .map(|(index, _)| index)
            .collect()
    }

    /// Fail if any filter's cursor has drifted from the others
    pub fn check_aligned(&self, registry: &FilterRegistry) -> Result<(), FilterError> {
        let diverged = self.diverged(registry);
        if diverged.is_empty() {
            Ok(())
        } else {
            Err(FilterError::DivergentCounters(diverged))
        }
    }

    /// Undo one filter's last stamp and evaluate that whole message again
    ///
    /// Every line of the message is read back from `source`, so a match
    /// that disappeared from the last line no longer counts. Only one filter
    /// may be revised at a time: every cursor must be aligned before the
    /// revert, and they are aligned again on return.
    pub fn revise_last_line(
        &mut self,
        registry: &mut FilterRegistry,
        id: &str,
        source: &impl LineSource,
    ) -> Result<(), FilterError> {
        self.check_aligned(registry)?;

        let filter = registry
            .get_filter_mut(id)
            .ok_or_else(|| FilterError::UnknownFilter(id.to_string()))?;

        if filter.pending_lines() > 0 {
            filter.end_of_message(&mut self.state);
        }
        let lines = filter.reopen_last(&mut self.state);
        filter.discard_pending();
        let start = self.state.count(filter.index());
        let end = (start + lines).min(source.line_count());
        for line_number in start..end {
            filter.add_line(&self.state, source.line(line_number));
        }
        if filter.pending_lines() > 0 {
            filter.end_of_message(&mut self.state);
        }

        self.rebuild_index(registry, source.line_count());
        Ok(())
    }

    /// Forget everything, keeping the binding to a new logfile name
    pub fn reset(&mut self, registry: &mut FilterRegistry, logfile: impl Into<String>) {
        self.state.clear();
        self.state.attach(logfile);
        self.visible.clear();
        for filter in registry.iter_mut() {
            filter.reset();
        }
    }

    /// Stamped bits for `line`, for callers that combine masks themselves
    pub fn line_mask(&self, line: usize) -> FilterMask {
        self.state.mask(line)
    }
}
