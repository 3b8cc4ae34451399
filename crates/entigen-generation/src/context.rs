//! Template data contexts
//!
//! Everything a template needs is precomputed here by the planner: identifier forms,
//! per-field type mappings, validation predicates, SQL fragments, import lists and
//! documentation examples. Templates only substitute and iterate.

use serde::Serialize;

use crate::{naming::NameForms, type_mapping::StorageCodec};

/// Shared data context for every artifact of one generation run
#[derive(Debug, Clone, Serialize)]
pub struct TemplateDataContext {
    /// Entity naming
    pub entity: EntityContext,
    /// Import root of the generated project
    pub module_root: String,
    /// Import path of the entity package
    pub import_path: String,
    /// Backend description
    pub backend: BackendContext,
    /// Primary key
    pub id: IdContext,
    /// Every field, in declaration order
    pub fields: Vec<FieldContext>,
    /// Fields accepted in request payloads (system-managed timestamps excluded)
    pub writable_fields: Vec<FieldContext>,
    /// Fields carrying a uniqueness constraint
    pub unique_fields: Vec<FieldContext>,
    /// Zero-value checks on the create path
    pub create_checks: Vec<CheckContext>,
    /// Zero-value checks on the full-replacement path
    pub replace_checks: Vec<CheckContext>,
    /// Zero-value checks on the partial-update path
    pub patch_checks: Vec<CheckContext>,
    /// Statements stamping system-managed timestamps on create
    pub create_stamps: Vec<String>,
    /// Statements refreshing system-managed timestamps on update and patch
    pub update_stamps: Vec<String>,
    /// Import lists per artifact
    pub imports: ImportContext,
    /// HTTP routes, in registration order
    pub routes: Vec<RouteContext>,
    /// Relational storage fragments; absent for document stores
    pub sql: Option<SqlContext>,
    /// Document storage fragments; absent for relational stores
    pub document: Option<DocumentContext>,
    /// Documentation examples
    pub examples: ExampleContext,
    /// Banner placed at the top of every generated file
    pub banner: String,
}

/// Entity identifier forms
#[derive(Debug, Clone, Serialize)]
pub struct EntityContext {
    /// Singular forms (`invoice`, `Invoice`)
    pub singular: NameForms,
    /// Plural forms (`invoices`, `Invoices`)
    pub plural: NameForms,
    /// Go package name
    pub package: String,
    /// Exported record type
    pub type_name: String,
    /// Update policy name
    pub update_policy: String,
}

/// Backend description
#[derive(Debug, Clone, Serialize)]
pub struct BackendContext {
    /// Backend name (`postgres`, `mysql`, `mongodb`)
    pub name: String,
    /// Family name (`relational_store`, `document_store`)
    pub family: String,
    /// Storage implementation type name
    pub repository_type: String,
    /// Struct tag key carrying the storage name (`db` or `bson`)
    pub tag_key: String,
}

/// Primary key description
#[derive(Debug, Clone, Serialize)]
pub struct IdContext {
    /// Go type (`int64` or `string`)
    pub native_type: String,
    /// Column definition or BSON type
    pub storage_type: String,
    /// Column or document key
    pub storage_name: String,
    /// Struct tag on the record
    pub record_tag: String,
    /// JSON example
    pub example: String,
}

/// One field with every derived form
#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    /// Name as supplied
    pub name: String,
    /// Exported identifier
    pub public: String,
    /// Serialization / column name
    pub serial: String,
    /// Local variable name
    pub variable: String,
    /// Abstract type name
    pub field_type: String,
    /// Record field type
    pub native_type: String,
    /// Create/replace payload type
    pub request_type: String,
    /// Patch payload type
    pub patch_type: String,
    /// Column / BSON type
    pub storage_type: String,
    /// JSON example value
    pub example: String,
    /// Whether the field is required
    pub required: bool,
    /// Whether the field is unique
    pub unique: bool,
    /// Whether the field is a system-managed timestamp
    pub system_managed: bool,
    /// "yes" / "no" for documentation tables
    pub required_label: String,
    /// "yes" / "no" for documentation tables
    pub unique_label: String,
    /// Struct tag on the record
    pub record_tag: String,
    /// Struct tag on create/replace payloads
    pub request_tag: String,
    /// Struct tag on patch payloads
    pub patch_tag: String,
    /// Expression converting the request value (receiver `r`) to the record value
    pub from_request: String,
    /// Query argument expression (receiver `e`)
    pub value_expr: String,
    /// Scan target expression (receiver `e`)
    pub scan_expr: String,
    /// Driver boundary handling
    pub codec: StorageCodec,
}

/// One generated zero-value check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckContext {
    /// Exported field name
    pub field: String,
    /// Serialization name
    pub serial: String,
    /// Go predicate that is true when the value is rejected
    pub predicate: String,
    /// Error detail
    pub message: String,
}

/// Go imports per artifact
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportContext {
    /// model.go
    pub model: Vec<String>,
    /// repository implementation
    pub storage_impl: Vec<String>,
    /// service.go
    pub service: Vec<String>,
    /// handler
    pub handler: Vec<String>,
    /// route fragment
    pub routes: Vec<String>,
}

/// One HTTP route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteContext {
    /// HTTP method
    pub method: String,
    /// Path pattern
    pub path: String,
    /// Handler method name
    pub handler: String,
    /// Short description
    pub summary: String,
}

/// Relational storage fragments
#[derive(Debug, Clone, Serialize)]
pub struct SqlContext {
    /// Table name
    pub table: String,
    /// Columns read by queries, id first
    pub select_columns: String,
    /// Columns written on insert
    pub insert_columns: String,
    /// Placeholders matching `insert_columns`
    pub insert_placeholders: String,
    /// Arguments matching `insert_columns`
    pub insert_args: String,
    /// Scan targets matching `select_columns`
    pub scan_args: String,
    /// `col = $n` pairs for updates
    pub update_assignments: String,
    /// Arguments matching `update_assignments`, id last
    pub update_args: String,
    /// Placeholder of the id in single-row queries
    pub id_placeholder: String,
    /// Placeholder of the id in the update statement
    pub update_id_placeholder: String,
    /// LIMIT placeholder in list queries
    pub limit_placeholder: String,
    /// OFFSET placeholder in list queries
    pub offset_placeholder: String,
    /// Column definitions including the primary key, separators included
    pub column_lines: Vec<String>,
    /// Unique index statements
    pub unique_indexes: Vec<String>,
    /// Trailing table options (engine, charset)
    pub table_options: String,
}

/// Document storage fragments
#[derive(Debug, Clone, Serialize)]
pub struct DocumentContext {
    /// Collection name
    pub collection: String,
    /// JSON array of required property names
    pub required_json: String,
    /// `$jsonSchema` property lines, separators included
    pub property_lines: Vec<String>,
    /// Index creation statements
    pub index_lines: Vec<String>,
}

/// Documentation examples
#[derive(Debug, Clone, Serialize)]
pub struct ExampleContext {
    /// Create payload
    pub create: String,
    /// Full replacement payload
    pub replace: String,
    /// Partial update payload
    pub patch: String,
    /// Response body
    pub response: String,
}
