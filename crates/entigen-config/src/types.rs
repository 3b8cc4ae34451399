//! Core configuration types and data structures

use std::path::PathBuf;

use entigen_generation::{
    ConfigurationError, ListEncoding, MigrationStamp, ProjectContext, StorageBackend,
};
use serde::{Deserialize, Serialize};

/// Accepted values for `log_level`
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Generator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Go module path generated packages are imported under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_root: Option<String>,
    /// Storage backend name (`postgres`, `mysql`, `mongodb`)
    pub backend: String,
    /// Root artifacts are written under
    pub output_dir: PathBuf,
    /// Directory of template overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
    /// Handling of list-valued fields on backends without list columns
    pub list_encoding: ListEncoding,
    /// Render artifacts concurrently
    pub parallel: bool,
    /// Replace existing files
    pub overwrite: bool,
    /// Log verbosity
    pub log_level: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            module_root: None,
            backend: StorageBackend::Postgres.name().to_string(),
            output_dir: PathBuf::from("."),
            templates_dir: None,
            list_encoding: ListEncoding::Native,
            parallel: true,
            overwrite: false,
            log_level: "info".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Parsed storage backend
    pub fn storage_backend(&self) -> Result<StorageBackend, ConfigurationError> {
        self.backend.parse()
    }

    /// Project context for one generation run
    pub fn project_context(
        &self,
        stamp: MigrationStamp,
    ) -> Result<ProjectContext, ConfigurationError> {
        let module_root = self
            .module_root
            .as_deref()
            .ok_or(ConfigurationError::MissingModuleRoot)?;
        let context = ProjectContext::for_backend(module_root, self.storage_backend()?)
            .with_list_encoding(self.list_encoding)
            .with_migration_stamp(stamp);
        context.validate()?;
        Ok(context)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, crate::error::ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

/// Configuration manager trait
pub trait ConfigManager {
    /// Load configuration
    fn load_config(&mut self) -> Result<GeneratorConfig, crate::error::ConfigError>;
    /// Save configuration
    fn save_config(&self, config: &GeneratorConfig) -> Result<(), crate::error::ConfigError>;
    /// Validate configuration
    fn validate_config(&self, config: &GeneratorConfig) -> Result<(), crate::error::ConfigError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> MigrationStamp {
        MigrationStamp::parse("20240101000000").unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.backend, "postgres");
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.parallel);
        assert!(!config.overwrite);
        assert_eq!(config.list_encoding, ListEncoding::Native);
    }

    #[test]
    fn test_project_context_requires_module_root() {
        let err = GeneratorConfig::default().project_context(stamp()).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingModuleRoot);
    }

    #[test]
    fn test_project_context_for_mysql() {
        let config = GeneratorConfig {
            module_root: Some("github.com/acme/shop".to_string()),
            backend: "mysql".to_string(),
            list_encoding: ListEncoding::CommaJoined,
            ..Default::default()
        };
        let context = config.project_context(stamp()).unwrap();
        assert_eq!(context.storage_backend(), StorageBackend::MySql);
        assert_eq!(context.list_encoding, ListEncoding::CommaJoined);
        assert_eq!(context.migration_stamp.as_str(), "20240101000000");
    }

    #[test]
    fn test_unknown_backend() {
        let config = GeneratorConfig {
            module_root: Some("github.com/acme/shop".to_string()),
            backend: "sqlite".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.project_context(stamp()),
            Err(ConfigurationError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_malformed_module_root() {
        let config = GeneratorConfig {
            module_root: Some("/abs/path/".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.project_context(stamp()),
            Err(ConfigurationError::InvalidModuleRoot(_))
        ));
    }

    #[test]
    fn test_toml_omits_unset_options() {
        let toml = GeneratorConfig::default().to_toml().unwrap();
        assert!(toml.contains("backend = \"postgres\""));
        assert!(toml.contains("list_encoding = \"native\""));
        assert!(!toml.contains("module_root"));
    }
}
