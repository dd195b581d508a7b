//! Line filters and the per-line visibility engine
//!
//! Up to [`MAX_FILTERS`] include/exclude filters can be active at once.
//! Every filter owns one bit position, its index, in a per-physical-line
//! mask stored in a [`FilterState`]. Filters decide per message: a message
//! that matches anywhere has the filter's bit set on all of its lines.
//!
//! # Commands
//!
//! ```text
//! filter-in <regex>        Show only messages matching the regex
//! filter-out <regex>       Hide messages matching the regex
//! disable-filter <regex>   Keep the filter but ignore it
//! enable-filter <regex>    Take a disabled filter into account again
//! delete-filter <regex>    Remove the filter and free its index
//! ```
//!
//! # Visibility
//!
//! A line is visible when it matches at least one enabled include filter
//! (or there are none) and matches no enabled exclude filter.

pub mod editor;
pub mod error;
pub mod matcher;
pub mod observer;
pub mod parser;
pub mod registry;
pub mod state;

pub use editor::FilterEditor;
pub use error::{CommandParseError, FilterError};
pub use matcher::{FilterKind, FilterMatcher, FilterPattern};
pub use observer::{LineFilterObserver, LineSource};
pub use parser::{FilterCommand, parse_script};
pub use registry::{FilterMask, FilterRegistry, MAX_FILTERS};
pub use state::FilterState;

/// Combine a line's stamped bits with the enabled masks of a registry
pub fn is_visible(mask: FilterMask, include_mask: FilterMask, exclude_mask: FilterMask) -> bool {
    ((mask & include_mask) != 0 || include_mask == 0) && (mask & exclude_mask) == 0
}
