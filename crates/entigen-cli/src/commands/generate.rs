// Render every artifact for one entity and write them under the output root

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use entigen_generation::{
    GenerationError, GenerationOrchestrator, GenerationResult, GenerationRun, OrchestratorConfig,
    OutputWriter, OutputWriterConfig, ProjectContext, WriteResult,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::Command;
use crate::{
    error::{CliError, CliResult},
    logging::VerbosityLevel,
    output::{self, OutputStyle},
    project::{load_entity, ProjectOptions},
    report::GenerationReport,
};

/// `entigen generate <ENTITY>`
pub struct GenerateCommand {
    pub entity: PathBuf,
    pub options: ProjectOptions,
    pub dry_run: bool,
    pub keep_backups: bool,
    pub json: bool,
}

impl GenerateCommand {
    pub fn new(entity: impl Into<PathBuf>, options: ProjectOptions) -> Self {
        Self {
            entity: entity.into(),
            options,
            dry_run: false,
            keep_backups: false,
            json: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_keep_backups(mut self, keep_backups: bool) -> Self {
        self.keep_backups = keep_backups;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Run the pipeline off the async runtime; Ctrl-C cancels pending renders.
    async fn render(
        &self,
        orchestrator_config: OrchestratorConfig,
        context: ProjectContext,
    ) -> CliResult<(GenerationResult, Duration)> {
        let document = load_entity(&self.entity)?;
        let cancel = CancellationToken::new();

        let watcher = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Interrupt received, cancelling generation");
                watcher.cancel();
            }
        });

        let started = Instant::now();
        let task = tokio::task::spawn_blocking(move || -> Result<GenerationResult, GenerationError> {
            let orchestrator = GenerationOrchestrator::with_config(orchestrator_config)?;
            let spec = document.into_spec(Some(&context))?;
            orchestrator.run(&spec, &context, &cancel, &mut GenerationRun::new())
        });
        let outcome = task.await;
        interrupt.abort();

        let result = outcome.map_err(|e| CliError::Internal(format!("Render task failed: {}", e)))??;
        Ok((result, started.elapsed()))
    }

    fn write(&self, result: &GenerationResult, overwrite: bool, root: &Path) -> CliResult<WriteResult> {
        let writer = OutputWriter::with_config(OutputWriterConfig {
            dry_run: self.dry_run,
            overwrite,
            keep_backups: self.keep_backups,
            ..Default::default()
        });
        let written = writer.write(result, root)?;
        if self.json {
            return Ok(written);
        }
        if let Some(rollback) = &written.rollback_info {
            for (original, backup) in &rollback.backups {
                output::print_info(&format!(
                    "Backup of {} kept at {}",
                    original.display(),
                    backup.display()
                ));
            }
        }
        output::print_success(&writer.summarize_result(&written));
        Ok(written)
    }
}

#[async_trait::async_trait]
impl Command for GenerateCommand {
    async fn execute(&self) -> CliResult<()> {
        let config = self.options.load_config()?;
        let context = self.options.project_context(&config)?;
        let backend = context.storage_backend();
        let root = self.options.output_root(&config);

        info!(
            entity = %self.entity.display(),
            backend = %backend,
            root = %root.display(),
            dry_run = self.dry_run,
            "Generating"
        );

        let orchestrator_config = OrchestratorConfig {
            parallel: config.parallel,
            templates_dir: self.options.templates_dir(&config),
        };
        let (result, elapsed) = self.render(orchestrator_config, context).await?;
        let written = self.write(&result, config.overwrite, &root)?;

        let report = GenerationReport::new(&result, &written, backend, elapsed);
        if self.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| CliError::Internal(format!("Failed to serialize report: {}", e)))?;
            println!("{}", json);
        } else if VerbosityLevel::Normal.should_output() {
            println!("{}", report.render(&OutputStyle::default()));
        }
        Ok(())
    }
}
