mod format;

use clap::{ArgAction, Args, Parser, Subcommand};
pub use format::{ColorMode, OutputFormat};
use std::path::PathBuf;

/// Merge log files into one view and filter it with include/exclude regexes
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "LOGSIEVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Increase diagnostic output on stderr (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filters applied on top of the ones from the config file
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Show only messages matching this regex (repeatable)
    #[arg(short = 'i', long = "filter-in", value_name = "REGEX")]
    pub filter_in: Vec<String>,

    /// Hide messages matching this regex (repeatable)
    #[arg(short = 'x', long = "filter-out", value_name = "REGEX")]
    pub filter_out: Vec<String>,

    /// File with filter commands to replay (one per line)
    #[arg(short, long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Regex matching the first line of every message
    #[arg(short, long, value_name = "REGEX")]
    pub message_start: Option<String>,

    /// Match filter patterns case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the lines that pass the filters
    View {
        /// Log files, merged in the given order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Mark visible lines matching this regex as search hits
        #[arg(short = 'g', long, value_name = "REGEX")]
        search: Option<String>,

        /// Bookmark a line by its 1-based number (repeatable)
        #[arg(short = 'k', long = "mark", value_name = "LINE")]
        marks: Vec<usize>,

        /// Print only bookmarked lines
        #[arg(long)]
        marked_only: bool,
    },
    /// List the active filters with the number of lines each one matched
    Filters {
        /// Log files, merged in the given order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the filters as commands that can be replayed with --script
    Export {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
