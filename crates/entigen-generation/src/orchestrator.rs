//! Generation orchestrator
//!
//! Drives one entity through Validate, Plan and Render. The run is all-or-nothing: any
//! error yields zero artifacts. Renders are independent and may run on the rayon pool;
//! when several fail, the error of the earliest plan is reported.

use std::path::PathBuf;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    document::EntityDocument,
    error::{GenerationError, TemplateError},
    models::{EntitySpec, GeneratedArtifact, GenerationResult, ProjectContext},
    planner::{ArtifactPlan, ArtifactPlanner, GenerationPlan},
    templates::{TemplateLoader, TemplateRenderer},
    validator::EntityValidator,
};

/// Configuration for the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Render artifacts concurrently
    pub parallel: bool,
    /// Directory of template overrides
    pub templates_dir: Option<PathBuf>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            templates_dir: None,
        }
    }
}

/// Lifecycle of one generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    /// Not started
    Idle,
    /// Checking the entity and context
    Validating,
    /// Selecting artifacts and resolving contexts
    Planning,
    /// Expanding templates
    Rendering,
    /// All artifacts rendered
    Complete,
    /// The run aborted
    Failed,
}

impl GenerationState {
    /// Whether `next` may follow this state
    pub fn can_transition_to(&self, next: GenerationState) -> bool {
        use GenerationState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Planning)
                | (Planning, Rendering)
                | (Rendering, Complete)
                | (Idle | Validating | Planning | Rendering, Failed)
        )
    }

    /// Whether the run is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationState::Complete | GenerationState::Failed)
    }
}

/// Records the states one run passes through
#[derive(Debug, Clone)]
pub struct GenerationRun {
    state: GenerationState,
    history: Vec<GenerationState>,
}

impl GenerationRun {
    /// A run in the idle state
    pub fn new() -> Self {
        Self {
            state: GenerationState::Idle,
            history: vec![GenerationState::Idle],
        }
    }

    /// Current state
    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Every state visited, in order
    pub fn history(&self) -> &[GenerationState] {
        &self.history
    }

    fn advance(&mut self, next: GenerationState) {
        if !self.state.can_transition_to(next) {
            warn!(from = ?self.state, to = ?next, "Ignoring invalid generation state transition");
            return;
        }
        debug!(from = ?self.state, to = ?next, "Generation state transition");
        self.state = next;
        self.history.push(next);
    }
}

impl Default for GenerationRun {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates validation, planning and rendering for one entity at a time
pub struct GenerationOrchestrator {
    config: OrchestratorConfig,
    validator: EntityValidator,
    planner: ArtifactPlanner,
    renderer: TemplateRenderer,
}

impl GenerationOrchestrator {
    /// Create an orchestrator with default configuration and built-in templates
    pub fn new() -> Result<Self, GenerationError> {
        Self::with_config(OrchestratorConfig::default())
    }

    /// Create an orchestrator, loading template overrides when configured
    pub fn with_config(config: OrchestratorConfig) -> Result<Self, GenerationError> {
        let renderer = match &config.templates_dir {
            Some(dir) => TemplateRenderer::with_overrides(TemplateLoader::new(dir).load()?)?,
            None => TemplateRenderer::new()?,
        };
        Ok(Self {
            config,
            validator: EntityValidator::new(),
            planner: ArtifactPlanner::new(),
            renderer,
        })
    }

    /// Current configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// The template renderer
    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Generate every artifact for `spec`
    pub fn generate(
        &self,
        spec: &EntitySpec,
        context: &ProjectContext,
    ) -> Result<GenerationResult, GenerationError> {
        self.run(spec, context, &CancellationToken::new(), &mut GenerationRun::new())
    }

    /// Generate from an entity document
    pub fn generate_document(
        &self,
        document: EntityDocument,
        context: &ProjectContext,
    ) -> Result<GenerationResult, GenerationError> {
        context.validate()?;
        let spec = document.into_spec(Some(context))?;
        self.generate(&spec, context)
    }

    /// Validate and plan without rendering
    pub fn plan(
        &self,
        spec: &EntitySpec,
        context: &ProjectContext,
    ) -> Result<GenerationPlan, GenerationError> {
        context.validate()?;
        self.validator.validate_for_context(spec, context)?;
        let plan = self.planner.plan(spec, context)?;
        self.check_plan(&plan)?;
        Ok(plan)
    }

    /// Generate with cancellation, recording state transitions in `run`.
    ///
    /// The token is checked before the run starts and before each render.
    pub fn run(
        &self,
        spec: &EntitySpec,
        context: &ProjectContext,
        cancel: &CancellationToken,
        run: &mut GenerationRun,
    ) -> Result<GenerationResult, GenerationError> {
        let outcome = self.execute(spec, context, cancel, run);
        match &outcome {
            Ok(result) => {
                run.advance(GenerationState::Complete);
                info!(
                    entity = %result.entity,
                    artifacts = result.len(),
                    "Generation complete"
                );
            }
            Err(error) => {
                run.advance(GenerationState::Failed);
                debug!(entity = %spec.name, error = %error, "Generation failed");
            }
        }
        outcome
    }

    fn execute(
        &self,
        spec: &EntitySpec,
        context: &ProjectContext,
        cancel: &CancellationToken,
        run: &mut GenerationRun,
    ) -> Result<GenerationResult, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        run.advance(GenerationState::Validating);
        context.validate()?;
        self.validator.validate_for_context(spec, context)?;

        run.advance(GenerationState::Planning);
        let plan = self.planner.plan(spec, context)?;
        self.check_plan(&plan)?;

        run.advance(GenerationState::Rendering);
        let artifacts = self.render_all(&plan, cancel)?;

        Ok(GenerationResult {
            entity: spec.name.clone(),
            artifacts,
        })
    }

    fn check_plan(&self, plan: &GenerationPlan) -> Result<(), GenerationError> {
        let validation = self.planner.validate_plan(plan);
        for warning in &validation.warnings {
            warn!(entity = %plan.entity, "{}", warning);
        }
        if !validation.is_valid {
            return Err(TemplateError::InvalidPlan(validation.errors).into());
        }
        Ok(())
    }

    fn render_all(
        &self,
        plan: &GenerationPlan,
        cancel: &CancellationToken,
    ) -> Result<Vec<GeneratedArtifact>, GenerationError> {
        let render_one = |artifact: &ArtifactPlan| -> Result<GeneratedArtifact, GenerationError> {
            if cancel.is_cancelled() {
                return Err(GenerationError::Cancelled);
            }
            Ok(self.renderer.render(artifact)?)
        };

        if self.config.parallel {
            // The earliest plan's error is reported, whatever order renders finish in.
            let results: Vec<Result<GeneratedArtifact, GenerationError>> =
                plan.artifacts.par_iter().map(render_one).collect();
            results.into_iter().collect()
        } else {
            plan.artifacts.iter().map(render_one).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtifactKind, FieldSpec, FieldType, StorageBackend, UpdatePolicy};

    fn invoice() -> EntitySpec {
        EntitySpec::new("invoice", UpdatePolicy::ReplaceOnly)
            .with_field(FieldSpec::new("Amount", FieldType::Decimal).required())
            .with_field(FieldSpec::new("PaidBy", FieldType::Text).required().unique())
    }

    fn postgres() -> ProjectContext {
        ProjectContext::for_backend("github.com/acme/billing", StorageBackend::Postgres)
    }

    #[test]
    fn test_generate_invoice() {
        let orchestrator = GenerationOrchestrator::new().unwrap();
        let result = orchestrator.generate(&invoice(), &postgres()).unwrap();
        assert_eq!(result.len(), 9);
        assert!(result.artifact(ArtifactKind::InitScript).is_none());
        let up = result.artifact(ArtifactKind::MigrationUp).unwrap();
        assert!(up.content.contains("CREATE TABLE IF NOT EXISTS invoices ("));
    }

    #[test]
    fn test_state_history_on_success() {
        let orchestrator = GenerationOrchestrator::new().unwrap();
        let mut run = GenerationRun::new();
        orchestrator
            .run(&invoice(), &postgres(), &CancellationToken::new(), &mut run)
            .unwrap();
        assert_eq!(
            run.history(),
            &[
                GenerationState::Idle,
                GenerationState::Validating,
                GenerationState::Planning,
                GenerationState::Rendering,
                GenerationState::Complete,
            ]
        );
    }

    #[test]
    fn test_validation_failure_stops_run() {
        let orchestrator = GenerationOrchestrator::new().unwrap();
        let spec = EntitySpec::new("invoice", UpdatePolicy::Both);
        let mut run = GenerationRun::new();
        let err = orchestrator
            .run(&spec, &postgres(), &CancellationToken::new(), &mut run)
            .unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
        assert_eq!(run.state(), GenerationState::Failed);
        assert!(!run.history().contains(&GenerationState::Planning));
    }

    #[test]
    fn test_cancelled_before_start() {
        let orchestrator = GenerationOrchestrator::new().unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let mut run = GenerationRun::new();
        let err = orchestrator
            .run(&invoice(), &postgres(), &token, &mut run)
            .unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled));
        assert_eq!(run.history(), &[GenerationState::Idle, GenerationState::Failed]);
    }

    #[test]
    fn test_configuration_error() {
        let orchestrator = GenerationOrchestrator::new().unwrap();
        let context = ProjectContext::for_backend("", StorageBackend::Postgres);
        let err = orchestrator.generate(&invoice(), &context).unwrap_err();
        assert!(matches!(err, GenerationError::Configuration(_)));
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let parallel = GenerationOrchestrator::new().unwrap();
        let sequential = GenerationOrchestrator::with_config(OrchestratorConfig {
            parallel: false,
            templates_dir: None,
        })
        .unwrap();
        let context = postgres();
        assert_eq!(
            parallel.generate(&invoice(), &context).unwrap(),
            sequential.generate(&invoice(), &context).unwrap()
        );
    }

    #[test]
    fn test_state_transitions() {
        assert!(GenerationState::Idle.can_transition_to(GenerationState::Validating));
        assert!(!GenerationState::Idle.can_transition_to(GenerationState::Rendering));
        assert!(GenerationState::Rendering.can_transition_to(GenerationState::Failed));
        assert!(!GenerationState::Complete.can_transition_to(GenerationState::Failed));
        assert!(GenerationState::Failed.is_terminal());
    }
}
