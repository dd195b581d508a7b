use super::error::CommandParseError;
use super::matcher::FilterKind;
use std::fmt;
use std::str::FromStr;

/// A single filter command, as written in scripts and by `serialize()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCommand {
    /// `filter-in <regex>` / `filter-out <regex>`
    Add { kind: FilterKind, pattern: String },
    /// `enable-filter <id>`
    Enable(String),
    /// `disable-filter <id>`
    Disable(String),
    /// `delete-filter <id>`
    Delete(String),
}

impl FilterCommand {
    /// Parse one command line; a leading ':' is accepted
    ///
    /// Everything after the command name is the argument, so patterns may
    /// contain spaces.
    pub fn parse(s: &str) -> Result<Self, CommandParseError> {
        let line = s.trim();
        let line = line.strip_prefix(':').unwrap_or(line);

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let argument = || {
            if rest.is_empty() {
                Err(CommandParseError::MissingArgument(name.to_string()))
            } else {
                Ok(rest.to_string())
            }
        };

        match name.to_lowercase().as_str() {
            "filter-in" | "filter-out" => Ok(FilterCommand::Add {
                kind: name.parse()?,
                pattern: argument()?,
            }),
            "enable-filter" => Ok(FilterCommand::Enable(argument()?)),
            "disable-filter" => Ok(FilterCommand::Disable(argument()?)),
            "delete-filter" => Ok(FilterCommand::Delete(argument()?)),
            _ => Err(CommandParseError::UnknownCommand(name.to_string())),
        }
    }
}

impl FromStr for FilterCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterCommand::parse(s)
    }
}

impl fmt::Display for FilterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCommand::Add { kind, pattern } => write!(f, "{} {}", kind.command_name(), pattern),
            FilterCommand::Enable(id) => write!(f, "enable-filter {id}"),
            FilterCommand::Disable(id) => write!(f, "disable-filter {id}"),
            FilterCommand::Delete(id) => write!(f, "delete-filter {id}"),
        }
    }
}

/// Parse a script of filter commands
///
/// Blank lines and lines starting with '#' are skipped. Errors carry the
/// 1-based line number.
pub fn parse_script(script: &str) -> Result<Vec<FilterCommand>, (usize, CommandParseError)> {
    script
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(idx, line)| FilterCommand::parse(line).map_err(|e| (idx + 1, e)))
        .collect()
}
