//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use entigen_generation::StorageBackend;
use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    types::{ConfigManager as ConfigManagerTrait, GeneratorConfig, LOG_LEVELS},
};

/// Project configuration file name
pub const PROJECT_FILE: &str = "entigen.toml";

/// Configuration manager
pub struct ConfigManager {
    /// Project configuration file path
    config_path: PathBuf,
    /// User-level configuration file path
    user_path: Option<PathBuf>,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a manager for the project in the current directory
    pub fn new() -> Self {
        Self::for_project(Path::new("."))
    }

    /// Create a manager for the project rooted at `dir`
    pub fn for_project(dir: &Path) -> Self {
        Self::with_path(dir.join(PROJECT_FILE))
    }

    /// Create with custom config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            user_path: Self::default_user_path(),
            env_prefix: "ENTIGEN".to_string(),
        }
    }

    /// Skip the user-level config file
    pub fn without_user_config(mut self) -> Self {
        self.user_path = None;
        self
    }

    /// Use a different environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Project configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get default user config path
    fn default_user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("entigen").join("config.toml"))
    }
}

impl ConfigManagerTrait for ConfigManager {
    fn load_config(&mut self) -> Result<GeneratorConfig> {
        let mut builder = Config::builder();
        if let Some(user_path) = &self.user_path {
            builder = builder.add_source(
                File::from(user_path.clone())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        let builder = builder
            .add_source(
                File::from(self.config_path.clone())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(&self.env_prefix).try_parsing(true));

        let config = builder.build()?;
        let generator_config: GeneratorConfig = config.try_deserialize()?;
        self.validate_config(&generator_config)?;

        debug!(
            path = %self.config_path.display(),
            backend = %generator_config.backend,
            "Configuration loaded"
        );
        Ok(generator_config)
    }

    fn save_config(&self, config: &GeneratorConfig) -> Result<()> {
        let toml = config.to_toml()?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }

    fn validate_config(&self, config: &GeneratorConfig) -> Result<()> {
        config.backend.parse::<StorageBackend>()?;
        if !LOG_LEVELS.contains(&config.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level '{}' (expected one of {})",
                config.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        if config.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "Output directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
