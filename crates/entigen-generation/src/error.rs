//! Error types for code generation

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during code generation
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The entity description is malformed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The project context is missing or inconsistent
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A template could not be expanded
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// An entity document could not be parsed
    #[error("Entity document error: {0}")]
    Document(String),

    /// The caller cancelled the run
    #[error("Generation cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Target files already exist and overwriting is disabled
    #[error("Refusing to overwrite {} existing file(s): {}", .0.len(), display_paths(.0))]
    Conflict(Vec<PathBuf>),

    /// Write failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Rollback failed
    #[error("Rollback failed: {0}")]
    RollbackFailed(String),
}

impl GenerationError {
    /// Whether the caller may retry the same request and expect a different outcome
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::IoError(_) | GenerationError::WriteFailed(_) | GenerationError::Cancelled
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Structural problems with an entity description
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A name is not a valid identifier in the target language
    #[error("Invalid {subject} '{value}': must start with a letter or underscore, contain only letters, digits and underscores, and not be a keyword")]
    InvalidIdentifier {
        /// What the name identifies (entity, field, plural)
        subject: String,
        /// The offending value
        value: String,
    },

    /// A field collides with the entity's primary key
    #[error("Field '{field}' collides with the reserved identifier field 'id'")]
    ReservedField {
        /// Field name
        field: String,
    },

    /// Two fields share a name, ignoring case
    #[error("Field '{second}' duplicates field '{first}' (names are compared case-insensitively)")]
    DuplicateField {
        /// Name of the earlier field
        first: String,
        /// Name of the later field
        second: String,
    },

    /// Two fields derive the same exported identifier
    #[error("Fields '{first}' and '{second}' both become the identifier '{identifier}'")]
    IdentifierCollision {
        /// Name of the earlier field
        first: String,
        /// Name of the later field
        second: String,
        /// Shared exported identifier
        identifier: String,
    },

    /// A field's exported identifier is a member every generated payload declares
    #[error("Field '{field}' becomes '{identifier}', which the generated types already declare")]
    GeneratedMemberClash {
        /// Field name
        field: String,
        /// Exported identifier
        identifier: String,
    },

    /// The entity name is not lowercase
    #[error("Entity name '{0}' must be lowercase; it names the entity's package")]
    EntityNameCase(String),

    /// The entity name is taken by a package shared across entities
    #[error("Entity name '{0}' clashes with the shared '{0}' package")]
    SharedPackageName(String),

    /// The entity declares no fields
    #[error("Entity '{entity}' must declare at least one field")]
    EmptyFields {
        /// Entity name
        entity: String,
    },

    /// The update policy is not one of the closed set
    #[error("Unrecognized update policy '{0}' (expected replace_only, patch_only or both)")]
    UnknownUpdatePolicy(String),

    /// More than one field claims the same timestamp role
    #[error("Fields '{first}' and '{second}' both fill the '{role}' timestamp role")]
    DuplicateTimestampRole {
        /// Role name (createdAt or updatedAt)
        role: String,
        /// Earlier field
        first: String,
        /// Later field
        second: String,
    },

    /// A timestamp-role field is not declared as a timestamp
    #[error("Field '{field}' fills the '{role}' role and must have type timestamp, found {found}")]
    TimestampRoleType {
        /// Field name
        field: String,
        /// Role name
        role: String,
        /// Declared type
        found: String,
    },
}

/// Problems with the generation-time project context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No module root was supplied
    #[error("Module root is not set")]
    MissingModuleRoot,

    /// The module root is not a usable import path
    #[error("Invalid module root '{0}'")]
    InvalidModuleRoot(String),

    /// The migration stamp is not a 14-digit timestamp token
    #[error("Invalid migration stamp '{0}' (expected YYYYMMDDHHMMSS)")]
    InvalidMigrationStamp(String),

    /// A SQL dialect was selected for the document store family
    #[error("Dialect '{0}' does not apply to the document store backend")]
    DialectForDocumentStore(String),

    /// The backend name is not recognised
    #[error("Unknown backend '{0}' (expected postgres, mysql or mongodb)")]
    UnknownBackend(String),
}

/// Errors raised while resolving or expanding templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A field type has no entry in the backend's mapping table
    #[error("Field '{field}' has type '{field_type}' which has no mapping for the {backend} backend")]
    UnmappedType {
        /// Field name
        field: String,
        /// Declared type
        field_type: String,
        /// Backend name
        backend: String,
    },

    /// The template referenced data that is absent from its context
    #[error("Template for {artifact} references missing data: {message}")]
    MissingData {
        /// Artifact kind being rendered
        artifact: String,
        /// Detail from the template engine
        message: String,
    },

    /// The template called a helper that is not registered
    #[error("Template for {artifact} calls unknown helper '{helper}'")]
    UnknownHelper {
        /// Artifact kind being rendered
        artifact: String,
        /// Helper name
        helper: String,
    },

    /// Any other rendering failure
    #[error("Render error in {artifact}: {message}")]
    Render {
        /// Artifact kind being rendered
        artifact: String,
        /// Detail from the template engine
        message: String,
    },

    /// A template source failed to parse
    #[error("Invalid template source for section '{section}': {message}")]
    InvalidSource {
        /// Section name
        section: String,
        /// Parser message
        message: String,
    },

    /// The planner produced an inconsistent artifact plan
    #[error("Invalid artifact plan: {}", .0.join("; "))]
    InvalidPlan(Vec<String>),

    /// A plan named a section with no registered template
    #[error("No template registered for section '{0}'")]
    UnknownSection(String),

    /// A template override could not be read
    #[error("Failed to load template {}: {source}", path.display())]
    Load {
        /// Override file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}
