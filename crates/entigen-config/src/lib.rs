//! entigen configuration management
//!
//! Loads [`GeneratorConfig`] from built-in defaults, the user config file, the project's
//! `entigen.toml` and `ENTIGEN_*` environment variables, in increasing priority.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigManager;
pub use types::{ConfigManager as ConfigManagerTrait, GeneratorConfig, LOG_LEVELS};
