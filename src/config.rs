use crate::filter::{CommandParseError, FilterCommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid filter command #{position} in config: {source}")]
    Filter {
        position: usize,
        #[source]
        source: CommandParseError,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    pub messages: MessageRules,
    pub filters: FilterRules,
    pub output: OutputRules,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            messages: MessageRules::default(),
            filters: FilterRules::default(),
            output: OutputRules::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse the configured filter commands, in order
    pub fn filter_commands(&self) -> Result<Vec<FilterCommand>, ConfigError> {
        self.filters
            .commands
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                FilterCommand::parse(raw).map_err(|source| ConfigError::Filter {
                    position: idx + 1,
                    source,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MessageRules {
    /// Regex matching the first physical line of a message. Lines that do
    /// not match continue the previous message. Unset means one line per
    /// message.
    pub start_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterRules {
    pub case_sensitive: bool,
    /// Filter commands replayed before the ones given on the command line.
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputRules {
    pub line_numbers: bool,
    /// Shown in front of lines carrying a user mark.
    pub mark_symbol: String,
}

impl Default for OutputRules {
    fn default() -> Self {
        Self {
            line_numbers: true,
            mark_symbol: ">".to_string(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<ViewerConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<ViewerConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static ViewerConfig {
    static DEFAULT_CONFIG: LazyLock<ViewerConfig> = LazyLock::new(ViewerConfig::default);
    &DEFAULT_CONFIG
}
