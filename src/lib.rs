pub mod bookmarks;
pub mod cli;
pub mod config;
pub mod display;
pub mod filter;
pub mod view;

use anyhow::{Context, bail};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use bookmarks::{BookmarkIndex, Bookmarks, CategoryId, CategoryRegistry, InsertOutcome, Sentinel};
pub use cli::{ColorMode, Commands, FilterArgs, OutputFormat, cli_parse};
pub use config::{ViewerConfig, load_config};
pub use filter::{
    FilterCommand, FilterEditor, FilterError, FilterKind, FilterMatcher, FilterRegistry,
    FilterState, LineFilterObserver, LineSource, MAX_FILTERS, is_visible,
};
pub use view::LogView;

use crate::display::{
    ViewOptions, format_filters_json, format_filters_table, format_view_json, format_view_text,
};

/// Set up `tracing` output on stderr; `RUST_LOG` refines the default level
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Every filter command that applies, config first, then command line
fn collect_filter_commands(
    config: &ViewerConfig,
    args: &FilterArgs,
) -> anyhow::Result<Vec<FilterCommand>> {
    let mut commands = config.filter_commands()?;

    if let Some(script) = &args.script {
        let raw = std::fs::read_to_string(script)
            .with_context(|| format!("Failed to read filter script '{}'", script.display()))?;
        let parsed = filter::parse_script(&raw).map_err(|(line, err)| {
            anyhow::anyhow!("{}:{}: {}", script.display(), line, err)
        })?;
        commands.extend(parsed);
    }

    commands.extend(args.filter_in.iter().map(|pattern| FilterCommand::Add {
        kind: FilterKind::Include,
        pattern: pattern.clone(),
    }));
    commands.extend(args.filter_out.iter().map(|pattern| FilterCommand::Add {
        kind: FilterKind::Exclude,
        pattern: pattern.clone(),
    }));

    Ok(commands)
}

fn view_name(files: &[PathBuf]) -> String {
    match files {
        [single] => single.display().to_string(),
        _ => format!("{} files", files.len()),
    }
}

/// Build a view over `files` with every configured filter applied
pub fn build_view(
    files: &[PathBuf],
    config: &ViewerConfig,
    args: &FilterArgs,
) -> anyhow::Result<LogView> {
    let message_start = args
        .message_start
        .as_deref()
        .or(config.messages.start_pattern.as_deref());
    let case_sensitive = args.case_sensitive || config.filters.case_sensitive;

    let mut view = LogView::new(&view_name(files), message_start, case_sensitive)
        .context("Invalid message start pattern")?;

    for file in files {
        load_file(&mut view, file)?;
    }

    for command in collect_filter_commands(config, args)? {
        debug!("applying '{}'", command);
        view.apply_command(&command)
            .with_context(|| format!("Failed to apply '{}'", command))?;
    }
    view.refresh();

    info!(
        "{} of {} lines visible",
        view.visible_lines().len(),
        view.line_count()
    );
    Ok(view)
}

fn load_file(view: &mut LogView, path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read log file '{}'", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let before = view.line_count();
    view.append_file(&text);
    debug!(
        "loaded {} lines from {}",
        view.line_count() - before,
        path.display()
    );
    Ok(())
}

/// Replay-ready commands for the configured filters
pub fn export_commands(config: &ViewerConfig, args: &FilterArgs) -> anyhow::Result<Vec<String>> {
    let mut registry = FilterRegistry::new();
    let case_sensitive = args.case_sensitive || config.filters.case_sensitive;

    for command in collect_filter_commands(config, args)? {
        match &command {
            FilterCommand::Add { kind, pattern } => {
                if registry.get_filter(pattern).is_some() {
                    registry.set_filter_enabled(pattern, true);
                    registry.set_filter_kind(pattern, *kind);
                } else {
                    registry.add_pattern(*kind, pattern, case_sensitive)?;
                }
            }
            FilterCommand::Enable(id) | FilterCommand::Disable(id) => {
                let enabled = matches!(command, FilterCommand::Enable(_));
                if !registry.set_filter_enabled(id, enabled) {
                    bail!(FilterError::UnknownFilter(id.clone()));
                }
            }
            FilterCommand::Delete(id) => {
                if !registry.delete_filter(id) {
                    bail!(FilterError::UnknownFilter(id.clone()));
                }
            }
        }
    }

    Ok(registry.serialize())
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    init_logging(cli.verbose);
    cli.color.apply();

    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    debug!("using config profile '{}'", config.profile_name);

    match &cli.command {
        Commands::View {
            files,
            filters,
            search,
            marks,
            marked_only,
        } => {
            let mut view = build_view(files, &config, filters)?;

            for &mark in marks {
                if mark == 0 || mark > view.line_count() {
                    bail!("Line {} is out of range (1..={})", mark, view.line_count());
                }
                view.toggle_mark(mark - 1);
            }
            if let Some(pattern) = search {
                let hits = view.search(pattern).context("Invalid search pattern")?;
                info!("{} search hits", hits);
            }

            let options = ViewOptions {
                rules: &config.output,
                marked_only: *marked_only,
            };
            match cli.format {
                OutputFormat::Text => print!("{}", format_view_text(&view, &options)),
                OutputFormat::Json => println!("{}", format_view_json(&view, &options)),
            }
        }
        Commands::Filters { files, filters } => {
            let view = build_view(files, &config, filters)?;
            match cli.format {
                OutputFormat::Text => print!("{}", format_filters_table(&view)),
                OutputFormat::Json => println!("{}", format_filters_json(&view)),
            }
        }
        Commands::Export { filters } => {
            let commands = export_commands(&config, filters)?;
            match cli.format {
                OutputFormat::Text => {
                    for command in commands {
                        println!("{command}");
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&commands)?),
            }
        }
    }

    Ok(())
}
