use tracing::debug;

use super::error::FilterError;
use super::matcher::{FilterKind, FilterMatcher, FilterPattern};

/// Maximum number of filters that can be active at the same time
pub const MAX_FILTERS: usize = 32;

/// One bit per filter index
pub type FilterMask = u32;

const _: () = assert!(MAX_FILTERS <= FilterMask::BITS as usize);

/// Ordered collection of at most [`MAX_FILTERS`] filters
#[derive(Debug, Default)]
pub struct FilterRegistry {
    filters: Vec<FilterMatcher>,
    dirty: FilterMask,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.filters.len()
    }

    pub fn empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn full(&self) -> bool {
        self.filters.len() == MAX_FILTERS
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterMatcher> {
        self.filters.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut FilterMatcher> {
        self.filters.iter_mut()
    }

    /// Smallest filter index not used by any member
    pub fn next_index(&self) -> Result<usize, FilterError> {
        if self.full() {
            return Err(FilterError::TooManyFilters);
        }

        let mut used = [false; MAX_FILTERS];
        for filter in &self.filters {
            debug_assert!(!used[filter.index()], "filter index used twice");
            used[filter.index()] = true;
        }

        used.iter()
            .position(|in_use| !in_use)
            .ok_or(FilterError::TooManyFilters)
    }

    pub fn add_filter(&mut self, filter: FilterMatcher) -> Result<(), FilterError> {
        if self.full() {
            return Err(FilterError::TooManyFilters);
        }
        if self.get_filter(filter.id()).is_some() {
            return Err(FilterError::DuplicateFilter(filter.id().to_string()));
        }
        if filter.index() >= MAX_FILTERS || self.used_mask() & filter.bit() != 0 {
            return Err(FilterError::IndexInUse(filter.index()));
        }

        debug!(
            "{} [{}] {}",
            filter.kind().command_name(),
            filter.index(),
            filter.id()
        );
        self.dirty |= filter.bit();
        self.filters.push(filter);
        Ok(())
    }

    /// Compile `pattern` and add it under the next free index
    pub fn add_pattern(
        &mut self,
        kind: FilterKind,
        pattern: &str,
        case_sensitive: bool,
    ) -> Result<usize, FilterError> {
        let index = self.next_index()?;
        let filter = FilterMatcher::compile(kind, index, pattern, case_sensitive)?;
        self.add_filter(filter)?;
        Ok(index)
    }

    pub fn delete_filter(&mut self, id: &str) -> bool {
        let Some(pos) = self.filters.iter().position(|f| f.id() == id) else {
            return false;
        };

        let filter = self.filters.remove(pos);
        debug!("delete-filter [{}] {}", filter.index(), filter.id());
        self.dirty |= filter.bit();
        true
    }

    pub fn get_filter(&self, id: &str) -> Option<&FilterMatcher> {
        self.filters.iter().find(|f| f.id() == id)
    }

    pub fn get_filter_mut(&mut self, id: &str) -> Option<&mut FilterMatcher> {
        self.filters.iter_mut().find(|f| f.id() == id)
    }

    pub fn filter_at_index(&self, index: usize) -> Option<&FilterMatcher> {
        self.filters.iter().find(|f| f.index() == index)
    }

    /// Enable or disable without touching the index or stamped bits
    pub fn set_filter_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.get_filter_mut(id) {
            Some(filter) => {
                filter.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Flip a filter between include and exclude; stamped bits stay valid
    pub fn set_filter_kind(&mut self, id: &str, kind: FilterKind) -> bool {
        match self.get_filter_mut(id) {
            Some(filter) => {
                filter.set_kind(kind);
                true
            }
            None => false,
        }
    }

    /// Replace a filter's pattern in place, keeping its index
    pub fn replace_pattern(&mut self, id: &str, pattern: FilterPattern) -> Result<usize, FilterError> {
        if id != pattern.as_str() && self.get_filter(pattern.as_str()).is_some() {
            return Err(FilterError::DuplicateFilter(pattern.as_str().to_string()));
        }
        let filter = self
            .get_filter_mut(id)
            .ok_or_else(|| FilterError::UnknownFilter(id.to_string()))?;

        debug!(
            "replace [{}] {} -> {}",
            filter.index(),
            id,
            pattern.as_str()
        );
        filter.replace_pattern(pattern);
        let (index, bit) = (filter.index(), filter.bit());
        self.dirty |= bit;
        Ok(index)
    }

    /// Bits of enabled include filters and enabled exclude filters
    pub fn get_enabled_mask(&self) -> (FilterMask, FilterMask) {
        let mut include_mask = 0;
        let mut exclude_mask = 0;

        for filter in self.filters.iter().filter(|f| f.is_enabled()) {
            match filter.kind() {
                FilterKind::Include => include_mask |= filter.bit(),
                FilterKind::Exclude => exclude_mask |= filter.bit(),
            }
        }

        (include_mask, exclude_mask)
    }

    /// Bits of every member, enabled or not
    pub fn used_mask(&self) -> FilterMask {
        self.filters.iter().fold(0, |mask, f| mask | f.bit())
    }

    /// Indices whose per-line results must be recomputed, resetting the set
    pub fn take_dirty_mask(&mut self) -> FilterMask {
        std::mem::take(&mut self.dirty)
    }

    /// Render every filter as a replayable command, disabled ones included
    pub fn serialize(&self) -> Vec<String> {
        let mut commands = Vec::new();
        for filter in &self.filters {
            commands.push(filter.serialize());
            if !filter.is_enabled() {
                commands.push(format!("disable-filter {}", filter.id()));
            }
        }
        commands
    }
}
