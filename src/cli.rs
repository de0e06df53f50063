//! CLI command implementations for Skirmish.

pub(crate) mod run;
pub(crate) mod validate;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use skirmish::GameConfig;
use skirmish::snapshot::{MapFile, parse_map};

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable summary.
    Text,
    /// Machine-readable JSON summary.
    Json,
    /// Full round-by-round snapshot stream.
    Snapshot,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::ConfigError> for CliError {
    fn from(e: skirmish::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::GameError> for CliError {
    fn from(e: skirmish::GameError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::BoardError> for CliError {
    fn from(e: skirmish::BoardError) -> Self {
        Self::new(e.to_string())
    }
}

/// Load the configuration file, or the standard game when none is given.
fn load_config(path: Option<&Path>) -> Result<GameConfig, CliError> {
    match path {
        Some(path) => Ok(GameConfig::load(path)?),
        None => Ok(GameConfig::default()),
    }
}

/// Read and parse a map file on top of a configuration.
fn load_map(path: &Path, config: &GameConfig) -> Result<MapFile, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;
    let catalog = config.catalog()?;
    let params = config.params(None)?;
    parse_map(&text, &catalog, &params)
        .map_err(|e| CliError::new(format!("{}: {e}", path.display())))
}
