#![warn(missing_docs)]

//! Entity-driven code generation for entigen
//!
//! Turns one entity description and a project context into a consistent set of Go
//! service artifacts: model, storage contract and implementation, service, HTTP handler,
//! route fragment, migrations or an init script, and API documentation.
//! Generation happens in memory and is all-or-nothing; the output writer materializes a
//! result as one batch.

pub mod context;
pub mod document;
pub mod error;
pub mod migration;
pub mod models;
pub mod naming;
pub mod orchestrator;
pub mod output_writer;
pub mod planner;
pub mod templates;
pub mod type_mapping;
pub mod validator;

// Re-export public API
pub use context::{FieldContext, TemplateDataContext};
pub use document::{EntityDocument, FieldDocument};
pub use error::{ConfigurationError, GenerationError, TemplateError, ValidationError};
pub use migration::MigrationStamp;
pub use models::{
    ArtifactKind, BackendFamily, EntitySpec, FieldSpec, FieldType, GeneratedArtifact,
    GenerationResult, ListEncoding, ProjectContext, RelationalDialect, StorageBackend,
    UpdatePolicy,
};
pub use naming::{pluralize, CaseTransform, NameForms};
pub use orchestrator::{
    GenerationOrchestrator, GenerationRun, GenerationState, OrchestratorConfig,
};
pub use output_writer::{
    FileWriteResult, OutputWriter, OutputWriterConfig, RollbackInfo, WriteAction, WriteResult,
};
pub use planner::{
    ArtifactPlan, ArtifactPlanner, GenerationPlan, PlanValidation, Section, GENERATED_BANNER,
};
pub use templates::{TemplateLoader, TemplateOverride, TemplateRenderer};
pub use type_mapping::{map_type, StorageCodec, TypeMapping, TypeMappingTable, ZeroCheck};
pub use validator::{EntityValidator, TimestampRole};
