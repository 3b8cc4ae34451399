// CLI error types

use std::path::PathBuf;

use entigen_config::ConfigError;
use entigen_generation::{ConfigurationError, GenerationError};
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Entity error: {0}")]
    Entity(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("{} file(s) already exist", paths.len())]
    Conflict { paths: Vec<PathBuf> },

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'entigen --help' for usage information.",
                    message
                )
            }
            CliError::Io(e) => {
                format!("File operation failed: {}", e)
            }
            CliError::Config(msg) => {
                format!(
                    "Configuration error: {}\n\nRun 'entigen config show' to check your configuration.",
                    msg
                )
            }
            CliError::Entity(msg) => {
                format!(
                    "Entity description rejected: {}\n\nRun 'entigen validate <ENTITY>' to check the file.",
                    msg
                )
            }
            CliError::Generation(msg) => {
                format!("Code generation failed: {}\n\nNo files were written.", msg)
            }
            CliError::Conflict { paths } => {
                let listed = paths
                    .iter()
                    .map(|p| format!("  • {}", p.display()))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "Refusing to overwrite existing files:\n{}\n\nRe-run with --force to replace them.",
                    listed
                )
            }
            CliError::Cancelled => "Generation cancelled. No files were written.".to_string(),
            CliError::Internal(msg) => {
                format!("Internal error: {}\n\nPlease report this issue.", msg)
            }
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

impl From<GenerationError> for CliError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Validation(_) | GenerationError::Document(_) => {
                CliError::Entity(err.to_string())
            }
            GenerationError::Configuration(e) => CliError::Config(e.to_string()),
            GenerationError::Conflict(paths) => CliError::Conflict { paths },
            GenerationError::Cancelled => CliError::Cancelled,
            GenerationError::IoError(e) => CliError::Io(e),
            other => CliError::Generation(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other.to_string()),
        }
    }
}

impl From<ConfigurationError> for CliError {
    fn from(err: ConfigurationError) -> Self {
        CliError::Config(err.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
