use super::registry::{FilterMask, MAX_FILTERS};

/// Per-logfile filter results: one bitmask per physical line
///
/// `count[i]` is the write cursor of the filter with index `i`, the number
/// of physical lines it has already stamped. The mask vector only grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    logfile: String,
    masks: Vec<FilterMask>,
    count: [usize; MAX_FILTERS],
    hits: [usize; MAX_FILTERS],
}

impl FilterState {
    pub fn new(logfile: impl Into<String>) -> Self {
        Self {
            logfile: logfile.into(),
            masks: Vec::new(),
            count: [0; MAX_FILTERS],
            hits: [0; MAX_FILTERS],
        }
    }

    /// Name of the logfile this state belongs to (empty once cleared)
    pub fn logfile(&self) -> &str {
        &self.logfile
    }

    /// Bind a cleared state to a logfile
    pub fn attach(&mut self, logfile: impl Into<String>) {
        self.logfile = logfile.into();
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Grow to `len` lines; requests to shrink are ignored
    pub fn resize(&mut self, len: usize) {
        if len > self.masks.len() {
            self.masks.resize(len, 0);
        }
    }

    pub fn reserve(&mut self, len: usize) {
        self.masks.reserve(len.saturating_sub(self.masks.len()));
    }

    /// Detach from the logfile and forget every stamped line
    pub fn clear(&mut self) {
        self.logfile.clear();
        self.masks.clear();
        self.count = [0; MAX_FILTERS];
        self.hits = [0; MAX_FILTERS];
    }

    /// Forget the results of every filter whose bit is set in `mask`
    pub fn clear_filters(&mut self, mask: FilterMask) {
        if mask == 0 {
            return;
        }
        for line_mask in &mut self.masks {
            *line_mask &= !mask;
        }
        for index in 0..MAX_FILTERS {
            if mask & (1 << index) != 0 {
                self.count[index] = 0;
                self.hits[index] = 0;
            }
        }
    }

    /// Clear the bits of filters that are no longer part of `used_mask`
    pub fn clear_deleted_filter_state(&mut self, used_mask: FilterMask) {
        self.clear_filters(!used_mask);
    }

    pub fn count(&self, index: usize) -> usize {
        self.count[index]
    }

    /// Number of physical lines stamped as matching by filter `index`
    pub fn hits(&self, index: usize) -> usize {
        self.hits[index]
    }

    /// Stamped bits of line `line`, zero for lines not yet stored
    pub fn mask(&self, line: usize) -> FilterMask {
        self.masks.get(line).copied().unwrap_or(0)
    }

    pub fn masks(&self) -> &[FilterMask] {
        &self.masks
    }

    /// Whether line `line` is hidden under the given enabled masks
    pub fn excluded(&self, include_mask: FilterMask, exclude_mask: FilterMask, line: usize) -> bool {
        !super::is_visible(self.mask(line), include_mask, exclude_mask)
    }

    pub(crate) fn stamp(&mut self, line: usize, bit: FilterMask, matched: bool) {
        let slot = &mut self.masks[line];
        *slot &= !bit;
        if matched {
            *slot |= bit;
        }
    }

    pub(crate) fn advance(&mut self, index: usize, matched: bool) {
        debug_assert!(self.count[index] < self.masks.len());
        self.count[index] += 1;
        if matched {
            self.hits[index] += 1;
        }
    }

    pub(crate) fn retreat(&mut self, index: usize, matched: bool) {
        self.count[index] -= 1;
        if matched {
            self.hits[index] = self.hits[index].saturating_sub(1);
        }
    }
}
