use tracing::debug;

use super::error::FilterError;
use super::matcher::{FilterKind, FilterMatcher, FilterPattern};
use super::registry::FilterRegistry;

#[derive(Debug, Clone)]
enum EditTarget {
    New {
        kind: FilterKind,
        index: usize,
    },
    Existing {
        id: String,
        kind: FilterKind,
        index: usize,
        was_enabled: bool,
    },
}

/// Interactive edit of one filter's pattern
///
/// The filter being edited stays disabled while the session is open so the
/// view shows the result without it. Every keystroke goes through
/// [`FilterEditor::preview`], which compiles the text right away and
/// reports a bad pattern before anything is installed.
#[derive(Debug)]
pub struct FilterEditor {
    target: EditTarget,
    case_sensitive: bool,
    candidate: Option<FilterPattern>,
    text: Option<String>,
}

impl FilterEditor {
    /// Start editing a filter that does not exist yet
    pub fn begin_new(
        registry: &FilterRegistry,
        kind: FilterKind,
        case_sensitive: bool,
    ) -> Result<Self, FilterError> {
        let index = registry.next_index()?;
        Ok(Self {
            target: EditTarget::New { kind, index },
            case_sensitive,
            candidate: None,
            text: None,
        })
    }

    /// Start editing an installed filter, disabling it until commit or cancel
    pub fn begin_existing(
        registry: &mut FilterRegistry,
        id: &str,
        case_sensitive: bool,
    ) -> Result<Self, FilterError> {
        let filter = registry
            .get_filter_mut(id)
            .ok_or_else(|| FilterError::UnknownFilter(id.to_string()))?;

        let target = EditTarget::Existing {
            id: id.to_string(),
            kind: filter.kind(),
            index: filter.index(),
            was_enabled: filter.is_enabled(),
        };
        let candidate = Some(filter.pattern().clone());
        filter.disable();

        Ok(Self {
            target,
            case_sensitive,
            candidate,
            text: None,
        })
    }

    pub fn kind(&self) -> FilterKind {
        match &self.target {
            EditTarget::New { kind, .. } | EditTarget::Existing { kind, .. } => *kind,
        }
    }

    pub fn index(&self) -> usize {
        match &self.target {
            EditTarget::New { index, .. } | EditTarget::Existing { index, .. } => *index,
        }
    }

    /// Pattern that would be installed by [`FilterEditor::commit`]
    pub fn candidate(&self) -> Option<&FilterPattern> {
        self.candidate.as_ref()
    }

    /// Compile the current text; the previous valid pattern is kept on error
    /// for highlighting, but [`FilterEditor::commit`] uses the latest text
    pub fn preview(&mut self, text: &str) -> Result<&FilterPattern, FilterError> {
        self.text = Some(text.to_string());
        let pattern = FilterPattern::compile(text, self.case_sensitive)?;
        Ok(self.candidate.insert(pattern))
    }

    /// Match ranges of the candidate pattern in `line`, for highlighting
    pub fn preview_matches(&self, line: &[u8]) -> Vec<(usize, usize)> {
        self.candidate
            .as_ref()
            .map(|p| p.find_matches(line))
            .unwrap_or_default()
    }

    fn final_pattern(&self) -> Result<FilterPattern, FilterError> {
        match (&self.text, &self.candidate) {
            (Some(text), Some(candidate)) if candidate.as_str() == text => Ok(candidate.clone()),
            (Some(text), _) => FilterPattern::compile(text, self.case_sensitive),
            (None, Some(candidate)) => Ok(candidate.clone()),
            (None, None) => Err(FilterError::NoPattern),
        }
    }

    /// Install the last entered pattern and return the filter's index
    ///
    /// The text is compiled again, so a pattern that failed its last preview
    /// is rejected. On failure the registry is left as it was before the
    /// session began.
    pub fn commit(self, registry: &mut FilterRegistry) -> Result<usize, FilterError> {
        let pattern = match self.final_pattern() {
            Ok(pattern) => pattern,
            Err(err) => {
                self.cancel(registry);
                return Err(err);
            }
        };

        match self.target.clone() {
            EditTarget::New { kind, index } => {
                registry.add_filter(FilterMatcher::new(kind, index, pattern))?;
                Ok(index)
            }
            EditTarget::Existing { id, .. } => {
                let new_id = pattern.as_str().to_string();
                match registry.replace_pattern(&id, pattern) {
                    Ok(index) => {
                        registry.set_filter_enabled(&new_id, true);
                        debug!("edited filter [{}] {} -> {}", index, id, new_id);
                        Ok(index)
                    }
                    Err(err) => {
                        self.cancel(registry);
                        Err(err)
                    }
                }
            }
        }
    }

    /// Abandon the edit, restoring the filter's previous enabled state
    pub fn cancel(self, registry: &mut FilterRegistry) {
        if let EditTarget::Existing { id, was_enabled, .. } = self.target {
            registry.set_filter_enabled(&id, was_enabled);
        }
    }
}
