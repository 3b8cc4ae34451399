// Configuration inspection and project setup

use entigen_config::{ConfigManager, ConfigManagerTrait, GeneratorConfig};

use super::Command;
use crate::{
    error::{CliError, CliResult},
    output::{self, OutputStyle},
    project::ProjectOptions,
};

/// `entigen config <ACTION>`
pub struct ConfigCommand {
    pub action: ConfigAction,
    pub options: ProjectOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write `entigen.toml` for the project
    Init { force: bool },
}

impl ConfigCommand {
    pub fn new(action: ConfigAction, options: ProjectOptions) -> Self {
        Self { action, options }
    }

    fn manager(&self) -> ConfigManager {
        ConfigManager::for_project(&self.options.project_dir)
    }

    fn show(&self) -> CliResult<()> {
        let style = OutputStyle::default();
        let config = self.options.load_config()?;
        let manager = self.manager();

        println!("{}", style.header("Effective configuration"));
        println!();
        print!("{}", config.to_toml()?);
        println!();

        let source = if manager.config_path().is_file() {
            format!("Project file: {}", manager.config_path().display())
        } else {
            format!(
                "No project file at {} (defaults and environment only)",
                manager.config_path().display()
            )
        };
        println!("{}", style.info(&source));
        Ok(())
    }

    /// Write a project file seeded from flags, refusing to replace one unless forced
    pub fn init(&self, force: bool) -> CliResult<GeneratorConfig> {
        let manager = self.manager();
        let path = manager.config_path().to_path_buf();
        if path.exists() && !force {
            return Err(CliError::Conflict { paths: vec![path] });
        }

        let config = self.options.apply_overrides(GeneratorConfig::default())?;
        manager.validate_config(&config)?;
        manager.save_config(&config)?;
        output::print_success(&format!("Wrote {}", path.display()));
        if config.module_root.is_none() {
            output::print_warning("module_root is not set; add it before running 'entigen generate'");
        }
        Ok(config)
    }
}

#[async_trait::async_trait]
impl Command for ConfigCommand {
    async fn execute(&self) -> CliResult<()> {
        match &self.action {
            ConfigAction::Show => self.show(),
            ConfigAction::Init { force } => self.init(*force).map(|_| ()),
        }
    }
}
