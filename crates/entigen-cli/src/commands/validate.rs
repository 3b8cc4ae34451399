// Check an entity description against the configured backend without rendering

use std::path::PathBuf;

use entigen_generation::{
    ArtifactPlanner, EntitySpec, EntityValidator, GenerationError, TemplateError, TemplateLoader,
    TemplateRenderer,
};
use tracing::debug;

use super::Command;
use crate::{
    error::CliResult,
    output,
    project::{load_entity, ProjectOptions},
};

/// `entigen validate <ENTITY>`
pub struct ValidateCommand {
    pub entity: PathBuf,
    pub options: ProjectOptions,
}

impl ValidateCommand {
    pub fn new(entity: impl Into<PathBuf>, options: ProjectOptions) -> Self {
        Self {
            entity: entity.into(),
            options,
        }
    }

    /// Load and check the entity, returning the accepted spec and any warnings
    pub fn check(&self) -> CliResult<(EntitySpec, Vec<String>)> {
        let config = self.options.load_config()?;
        let context = self.options.project_context(&config)?;
        context.validate()?;

        let spec = load_entity(&self.entity)?.into_spec(Some(&context))?;
        EntityValidator::new().validate_for_context(&spec, &context)?;

        let planner = ArtifactPlanner::new();
        let plan = planner.plan(&spec, &context)?;
        let validation = planner.validate_plan(&plan);
        if !validation.is_valid {
            return Err(GenerationError::from(TemplateError::InvalidPlan(validation.errors)).into());
        }
        let mut warnings = validation.warnings;

        if let Some(dir) = self.options.templates_dir(&config) {
            let loader = TemplateLoader::new(dir);
            let overrides = loader.load().map_err(GenerationError::from)?;
            // Registration parses every override
            let renderer = TemplateRenderer::with_overrides(overrides).map_err(GenerationError::from)?;
            debug!(count = renderer.overridden().len(), "Template overrides checked");
            for stray in loader.unknown_files().map_err(GenerationError::from)? {
                warnings.push(format!(
                    "Template file {} does not match any section and will be ignored",
                    stray.display()
                ));
            }
        }
        Ok((spec, warnings))
    }
}

#[async_trait::async_trait]
impl Command for ValidateCommand {
    async fn execute(&self) -> CliResult<()> {
        let (spec, warnings) = self.check()?;
        for warning in &warnings {
            output::print_warning(warning);
        }
        output::print_success(&format!(
            "{} is valid: {} field(s), update policy {}",
            spec.name,
            spec.fields.len(),
            spec.update_policy
        ));
        Ok(())
    }
}
