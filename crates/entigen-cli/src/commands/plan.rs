// Show which artifacts and template sections a generation would use

use std::path::PathBuf;

use entigen_generation::{GenerationOrchestrator, GenerationPlan, OrchestratorConfig};

use super::Command;
use crate::{
    error::{CliError, CliResult},
    output::OutputStyle,
    project::{load_entity, ProjectOptions},
};

/// `entigen plan <ENTITY>`
pub struct PlanCommand {
    pub entity: PathBuf,
    pub options: ProjectOptions,
    pub json: bool,
}

impl PlanCommand {
    pub fn new(entity: impl Into<PathBuf>, options: ProjectOptions) -> Self {
        Self {
            entity: entity.into(),
            options,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Validate and plan without rendering
    pub fn build_plan(&self) -> CliResult<GenerationPlan> {
        let config = self.options.load_config()?;
        let context = self.options.project_context(&config)?;
        let spec = load_entity(&self.entity)?.into_spec(Some(&context))?;

        let orchestrator = GenerationOrchestrator::with_config(OrchestratorConfig {
            parallel: config.parallel,
            templates_dir: self.options.templates_dir(&config),
        })?;
        Ok(orchestrator.plan(&spec, &context)?)
    }
}

/// Render a plan as an indented listing
pub fn render_plan(plan: &GenerationPlan, style: &OutputStyle) -> String {
    let mut lines = vec![style.section(&format!("Plan: {} ({})", plan.entity, plan.backend))];
    for artifact in &plan.artifacts {
        lines.push(style.list_item(&format!(
            "{} {}",
            style.header(artifact.kind.as_str()),
            style.code(&artifact.path)
        )));
        let sections: Vec<&str> = artifact.sections.iter().map(|s| s.name()).collect();
        lines.push(format!("      {}", sections.join(", ")));
    }
    lines.push(String::new());
    lines.push(style.key_value("Artifacts", &plan.len().to_string()));
    lines.join("\n")
}

#[async_trait::async_trait]
impl Command for PlanCommand {
    async fn execute(&self) -> CliResult<()> {
        let plan = self.build_plan()?;
        if self.json {
            let json = serde_json::to_string_pretty(&plan)
                .map_err(|e| CliError::Internal(format!("Failed to serialize plan: {}", e)))?;
            println!("{}", json);
        } else {
            println!("{}", render_plan(&plan, &OutputStyle::default()));
        }
        Ok(())
    }
}
