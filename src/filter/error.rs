use thiserror::Error;

use super::registry::MAX_FILTERS;

/// Errors raised while creating, editing or driving line filters
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(
        "Filter limit of {} reached, try combining filters with a pipe symbol (e.g. foo|bar)",
        MAX_FILTERS
    )]
    TooManyFilters,

    #[error("Filter already exists: '{0}'")]
    DuplicateFilter(String),

    #[error("Filter index {0} is already in use")]
    IndexInUse(usize),

    #[error("Unknown filter: '{0}'")]
    UnknownFilter(String),

    #[error("Filter counters have diverged (indices {0:?}), only one filter may be revised at a time")]
    DivergentCounters(Vec<usize>),

    #[error("No valid pattern has been entered for this filter")]
    NoPattern,
}

/// Errors that can occur when parsing filter commands
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Unknown filter command: '{0}'. Valid commands are: filter-in, filter-out, enable-filter, disable-filter, delete-filter")]
    UnknownCommand(String),

    #[error("Command '{0}' expects an argument")]
    MissingArgument(String),
}
