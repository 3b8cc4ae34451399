//! Core data models for code generation

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigurationError, ValidationError},
    migration::MigrationStamp,
};

/// Abstract type of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Free text
    Text,
    /// 32-bit signed integer
    Integer32,
    /// 64-bit signed integer
    Integer64,
    /// Decimal / floating point number
    Decimal,
    /// true / false
    Boolean,
    /// Point in time
    Timestamp,
    /// Ordered list of text values
    TextList,
}

impl FieldType {
    /// Every field type, in declaration order
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Integer32,
        FieldType::Integer64,
        FieldType::Decimal,
        FieldType::Boolean,
        FieldType::Timestamp,
        FieldType::TextList,
    ];

    /// Canonical name used in entity documents
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer32 => "integer32",
            FieldType::Integer64 => "integer64",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "timestamp",
            FieldType::TextList => "text-list",
        }
    }

    /// Parse a canonical name or one of the accepted aliases
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('_', "-");
        let field_type = match normalized.as_str() {
            "text" | "string" | "str" => FieldType::Text,
            "integer32" | "int32" | "int" | "integer" => FieldType::Integer32,
            "integer64" | "int64" | "long" | "bigint" => FieldType::Integer64,
            "decimal" | "float" | "float64" | "double" | "number" => FieldType::Decimal,
            "boolean" | "bool" => FieldType::Boolean,
            "timestamp" | "datetime" | "time" | "time.time" => FieldType::Timestamp,
            "text-list" | "[]string" | "list" | "string-list" | "tags" => FieldType::TextList,
            _ => return None,
        };
        Some(field_type)
    }

    /// Whether the native representation is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Integer32 | FieldType::Integer64 | FieldType::Decimal
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entity attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Case-neutral field name as supplied by the caller
    pub name: String,
    /// Abstract field type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether absence/zero-value is rejected on create and full replace
    #[serde(default)]
    pub required: bool,
    /// Whether a uniqueness constraint is emitted
    #[serde(default)]
    pub unique: bool,
}

impl FieldSpec {
    /// Create an optional, non-unique field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            unique: false,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Governs which update code paths are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Full replacement only (PUT)
    ReplaceOnly,
    /// Partial update only (PATCH)
    PatchOnly,
    /// Both full replacement and partial update
    Both,
}

impl UpdatePolicy {
    /// Whether a full-replacement request/handler pair is planned
    pub fn plans_replace(&self) -> bool {
        matches!(self, UpdatePolicy::ReplaceOnly | UpdatePolicy::Both)
    }

    /// Whether a partial-update request/handler pair is planned
    pub fn plans_patch(&self) -> bool {
        matches!(self, UpdatePolicy::PatchOnly | UpdatePolicy::Both)
    }

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdatePolicy::ReplaceOnly => "replace_only",
            UpdatePolicy::PatchOnly => "patch_only",
            UpdatePolicy::Both => "both",
        }
    }
}

impl FromStr for UpdatePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "replaceonly" | "replace" | "put" => Ok(UpdatePolicy::ReplaceOnly),
            "patchonly" | "patch" => Ok(UpdatePolicy::PatchOnly),
            "both" => Ok(UpdatePolicy::Both),
            _ => Err(ValidationError::UnknownUpdatePolicy(s.to_string())),
        }
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpec {
    /// Singular lowercase identifier (e.g. `invoice`)
    pub name: String,
    /// Explicit plural override; derived by the naming engine when absent
    #[serde(default, rename = "plural")]
    pub plural_name: Option<String>,
    /// Ordered fields, insertion order is preserved into generated output
    pub fields: Vec<FieldSpec>,
    /// Update-semantics policy
    pub update_policy: UpdatePolicy,
}

impl EntitySpec {
    /// Create an entity with no fields
    pub fn new(name: impl Into<String>, update_policy: UpdatePolicy) -> Self {
        Self {
            name: name.into(),
            plural_name: None,
            fields: Vec::new(),
            update_policy,
        }
    }

    /// Append a field
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Override the derived plural
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural_name = Some(plural.into());
        self
    }
}

/// Storage backend family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendFamily {
    /// SQL database with an int64 surrogate key
    RelationalStore,
    /// Document database with string-encoded object ids
    DocumentStore,
}

/// SQL dialect for the relational family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationalDialect {
    /// PostgreSQL
    #[default]
    Postgres,
    /// MySQL / MariaDB
    MySql,
}

impl RelationalDialect {
    /// Dialect name
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationalDialect::Postgres => "postgres",
            RelationalDialect::MySql => "mysql",
        }
    }
}

/// How list-valued fields are stored on backends without list columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListEncoding {
    /// Only backends with native list columns accept text-list fields
    #[default]
    Native,
    /// Lower text-list fields to a comma-joined text column where needed
    CommaJoined,
}

/// A concrete storage backend, resolved from family and dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// PostgreSQL
    Postgres,
    /// MySQL
    MySql,
    /// MongoDB
    MongoDb,
}

impl StorageBackend {
    /// Every backend
    pub const ALL: [StorageBackend; 3] = [
        StorageBackend::Postgres,
        StorageBackend::MySql,
        StorageBackend::MongoDb,
    ];

    /// Family this backend belongs to
    pub fn family(&self) -> BackendFamily {
        match self {
            StorageBackend::Postgres | StorageBackend::MySql => BackendFamily::RelationalStore,
            StorageBackend::MongoDb => BackendFamily::DocumentStore,
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::MySql => "mysql",
            StorageBackend::MongoDb => "mongodb",
        }
    }

    /// Suffix used for the storage implementation file
    pub fn file_suffix(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::MySql => "mysql",
            StorageBackend::MongoDb => "mongo",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            "mysql" | "mariadb" => Ok(StorageBackend::MySql),
            "mongodb" | "mongo" => Ok(StorageBackend::MongoDb),
            _ => Err(ConfigurationError::UnknownBackend(s.to_string())),
        }
    }
}

/// Generation-time environment, immutable for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Import root for generated packages (a Go module path)
    pub module_root: String,
    /// Backend family
    pub backend_family: BackendFamily,
    /// SQL dialect, ignored for the document family
    #[serde(default)]
    pub dialect: RelationalDialect,
    /// Handling of list-valued fields
    #[serde(default)]
    pub list_encoding: ListEncoding,
    /// Token prefixed to relational migration files
    pub migration_stamp: MigrationStamp,
}

impl ProjectContext {
    /// Create a context stamped with the current time
    pub fn new(module_root: impl Into<String>, backend_family: BackendFamily) -> Self {
        Self {
            module_root: module_root.into(),
            backend_family,
            dialect: RelationalDialect::default(),
            list_encoding: ListEncoding::default(),
            migration_stamp: MigrationStamp::now(),
        }
    }

    /// Create a context for a concrete backend
    pub fn for_backend(module_root: impl Into<String>, backend: StorageBackend) -> Self {
        let context = Self::new(module_root, backend.family());
        match backend {
            StorageBackend::MySql => context.with_dialect(RelationalDialect::MySql),
            _ => context,
        }
    }

    /// Set the SQL dialect
    pub fn with_dialect(mut self, dialect: RelationalDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set list handling
    pub fn with_list_encoding(mut self, list_encoding: ListEncoding) -> Self {
        self.list_encoding = list_encoding;
        self
    }

    /// Set the migration stamp
    pub fn with_migration_stamp(mut self, stamp: MigrationStamp) -> Self {
        self.migration_stamp = stamp;
        self
    }

    /// Concrete backend selected by family and dialect
    pub fn storage_backend(&self) -> StorageBackend {
        match (self.backend_family, self.dialect) {
            (BackendFamily::DocumentStore, _) => StorageBackend::MongoDb,
            (BackendFamily::RelationalStore, RelationalDialect::Postgres) => {
                StorageBackend::Postgres
            }
            (BackendFamily::RelationalStore, RelationalDialect::MySql) => StorageBackend::MySql,
        }
    }

    /// Check the context is internally consistent
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let root = self.module_root.trim();
        if root.is_empty() {
            return Err(ConfigurationError::MissingModuleRoot);
        }

        let well_formed = root == self.module_root
            && !root.starts_with('/')
            && !root.ends_with('/')
            && !root.contains("//")
            && root
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '~' | '/'));
        if !well_formed {
            return Err(ConfigurationError::InvalidModuleRoot(
                self.module_root.clone(),
            ));
        }

        if self.backend_family == BackendFamily::DocumentStore
            && self.dialect != RelationalDialect::default()
        {
            return Err(ConfigurationError::DialectForDocumentStore(
                self.dialect.as_str().to_string(),
            ));
        }

        MigrationStamp::parse(self.migration_stamp.as_str())?;
        Ok(())
    }
}

/// Kind of a generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Data record and request payloads
    Model,
    /// Storage-access interface
    StorageContract,
    /// Backend-specific storage implementation
    StorageImpl,
    /// Business-logic layer
    Service,
    /// HTTP request handlers
    Handler,
    /// Route registration fragment
    RouteFragment,
    /// Relational forward migration
    MigrationUp,
    /// Relational rollback migration
    MigrationDown,
    /// Document-store initialization script
    InitScript,
    /// API documentation
    Documentation,
}

impl ArtifactKind {
    /// Kebab-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::StorageContract => "storage-contract",
            ArtifactKind::StorageImpl => "storage-impl",
            ArtifactKind::Service => "service",
            ArtifactKind::Handler => "handler",
            ArtifactKind::RouteFragment => "route-fragment",
            ArtifactKind::MigrationUp => "migration-up",
            ArtifactKind::MigrationDown => "migration-down",
            ArtifactKind::InitScript => "init-script",
            ArtifactKind::Documentation => "documentation",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Path relative to the output root, always `/`-separated
    pub path: String,
    /// Rendered content
    pub content: String,
    /// Language of the content (go, sql, javascript, markdown)
    pub language: String,
}

/// The complete, ordered artifact set for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Singular entity name
    pub entity: String,
    /// Artifacts in plan order
    pub artifacts: Vec<GeneratedArtifact>,
}

impl GenerationResult {
    /// Number of artifacts
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// First artifact of the given kind
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }

    /// All artifact paths in order
    pub fn paths(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.path.as_str()).collect()
    }

    /// Iterate over artifacts
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.artifacts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_aliases() {
        assert_eq!(FieldType::parse("string"), Some(FieldType::Text));
        assert_eq!(FieldType::parse("int64"), Some(FieldType::Integer64));
        assert_eq!(FieldType::parse("float64"), Some(FieldType::Decimal));
        assert_eq!(FieldType::parse("[]string"), Some(FieldType::TextList));
        assert_eq!(FieldType::parse("text_list"), Some(FieldType::TextList));
        assert_eq!(FieldType::parse("uuid"), None);
    }

    #[test]
    fn test_field_type_canonical_names_round_trip() {
        for field_type in FieldType::ALL {
            assert_eq!(FieldType::parse(field_type.as_str()), Some(field_type));
        }
    }

    #[test]
    fn test_update_policy_parsing() {
        assert_eq!("ReplaceOnly".parse::<UpdatePolicy>(), Ok(UpdatePolicy::ReplaceOnly));
        assert_eq!("patch_only".parse::<UpdatePolicy>(), Ok(UpdatePolicy::PatchOnly));
        assert_eq!("Both".parse::<UpdatePolicy>(), Ok(UpdatePolicy::Both));
        assert_eq!(
            "upsert".parse::<UpdatePolicy>(),
            Err(ValidationError::UnknownUpdatePolicy("upsert".to_string()))
        );
    }

    #[test]
    fn test_update_policy_planning_flags() {
        assert!(UpdatePolicy::ReplaceOnly.plans_replace());
        assert!(!UpdatePolicy::ReplaceOnly.plans_patch());
        assert!(UpdatePolicy::PatchOnly.plans_patch());
        assert!(!UpdatePolicy::PatchOnly.plans_replace());
        assert!(UpdatePolicy::Both.plans_replace() && UpdatePolicy::Both.plans_patch());
    }

    #[test]
    fn test_storage_backend_resolution() {
        let ctx = ProjectContext::for_backend("example.com/app", StorageBackend::MySql);
        assert_eq!(ctx.backend_family, BackendFamily::RelationalStore);
        assert_eq!(ctx.storage_backend(), StorageBackend::MySql);

        let ctx = ProjectContext::new("example.com/app", BackendFamily::DocumentStore)
            .with_dialect(RelationalDialect::MySql);
        assert_eq!(ctx.storage_backend(), StorageBackend::MongoDb);
    }

    #[test]
    fn test_context_validation() {
        let ctx = ProjectContext::new("github.com/acme/billing", BackendFamily::RelationalStore);
        assert!(ctx.validate().is_ok());

        let ctx = ProjectContext::new("  ", BackendFamily::RelationalStore);
        assert_eq!(ctx.validate(), Err(ConfigurationError::MissingModuleRoot));

        let ctx = ProjectContext::new("github.com/acme/billing/", BackendFamily::RelationalStore);
        assert!(matches!(
            ctx.validate(),
            Err(ConfigurationError::InvalidModuleRoot(_))
        ));

        let ctx = ProjectContext::new("github.com/acme bad", BackendFamily::RelationalStore);
        assert!(matches!(
            ctx.validate(),
            Err(ConfigurationError::InvalidModuleRoot(_))
        ));

        let ctx = ProjectContext::new("github.com/acme/billing", BackendFamily::DocumentStore)
            .with_dialect(RelationalDialect::MySql);
        assert!(matches!(
            ctx.validate(),
            Err(ConfigurationError::DialectForDocumentStore(_))
        ));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Postgres".parse::<StorageBackend>(), Ok(StorageBackend::Postgres));
        assert_eq!("mongo".parse::<StorageBackend>(), Ok(StorageBackend::MongoDb));
        assert!("oracle".parse::<StorageBackend>().is_err());
    }
}
