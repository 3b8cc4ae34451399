// Project resolution shared by commands

use std::{
    fs,
    path::{Path, PathBuf},
};

use entigen_config::{ConfigManager, ConfigManagerTrait, GeneratorConfig};
use entigen_generation::{EntityDocument, ListEncoding, MigrationStamp, ProjectContext};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Project location plus command-line overrides of configuration keys
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// Project root holding `entigen.toml`
    pub project_dir: PathBuf,
    /// `--backend`
    pub backend: Option<String>,
    /// `--module-root`
    pub module_root: Option<String>,
    /// `--output`
    pub output_dir: Option<PathBuf>,
    /// `--templates`
    pub templates_dir: Option<PathBuf>,
    /// `--list-encoding`
    pub list_encoding: Option<String>,
    /// `--force`
    pub force: bool,
    /// `--sequential`
    pub sequential: bool,
}

impl ProjectOptions {
    /// Options for the project at `project_dir` with no overrides
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Default::default()
        }
    }

    /// Load the layered configuration and apply command-line overrides
    pub fn load_config(&self) -> CliResult<GeneratorConfig> {
        let mut manager = ConfigManager::for_project(&self.project_dir);
        let config = manager.load_config()?;
        self.apply_overrides(config)
    }

    /// Apply command-line overrides on top of loaded configuration
    pub fn apply_overrides(&self, mut config: GeneratorConfig) -> CliResult<GeneratorConfig> {
        if let Some(backend) = &self.backend {
            config.backend = backend.clone();
        }
        if let Some(module_root) = &self.module_root {
            config.module_root = Some(module_root.clone());
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(templates_dir) = &self.templates_dir {
            config.templates_dir = Some(templates_dir.clone());
        }
        if let Some(encoding) = &self.list_encoding {
            config.list_encoding = parse_list_encoding(encoding)?;
        }
        if self.force {
            config.overwrite = true;
        }
        if self.sequential {
            config.parallel = false;
        }
        Ok(config)
    }

    /// Directory artifacts are written under
    pub fn output_root(&self, config: &GeneratorConfig) -> PathBuf {
        self.resolve(&config.output_dir)
    }

    /// Template override directory, if configured
    pub fn templates_dir(&self, config: &GeneratorConfig) -> Option<PathBuf> {
        config.templates_dir.as_deref().map(|dir| self.resolve(dir))
    }

    /// Project context stamped after every existing migration in the output root
    pub fn project_context(&self, config: &GeneratorConfig) -> CliResult<ProjectContext> {
        let stamp = next_migration_stamp(&self.output_root(config))?;
        Ok(config.project_context(stamp)?)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }
}

/// Parse a `--list-encoding` value
pub fn parse_list_encoding(value: &str) -> CliResult<ListEncoding> {
    match value.trim().to_lowercase().replace('-', "_").as_str() {
        "native" => Ok(ListEncoding::Native),
        "comma_joined" | "comma" => Ok(ListEncoding::CommaJoined),
        other => Err(CliError::InvalidArgument {
            message: format!(
                "Unknown list encoding '{}' (expected native or comma_joined)",
                other
            ),
        }),
    }
}

/// A migration stamp strictly greater than every stamp already under `<root>/migrations`
pub fn next_migration_stamp(output_root: &Path) -> CliResult<MigrationStamp> {
    let now = MigrationStamp::now();
    let dir = output_root.join("migrations");
    if !dir.is_dir() {
        return Ok(now);
    }

    let names: Vec<String> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();

    let stamp = match MigrationStamp::latest_in(names.iter().map(String::as_str)) {
        Some(latest) => {
            debug!(latest = %latest.as_str(), "Found existing migrations");
            now.next_after(&latest)
        }
        None => now,
    };
    Ok(stamp)
}

/// Load an entity document, reporting a missing file as an argument error
pub fn load_entity(path: &Path) -> CliResult<EntityDocument> {
    if !path.is_file() {
        return Err(CliError::InvalidArgument {
            message: format!("Entity file not found: {}", path.display()),
        });
    }
    Ok(EntityDocument::from_path(path)?)
}
