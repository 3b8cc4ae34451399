//! Artifact planning
//!
//! Decides which artifacts an entity produces, where they land, which template sections
//! compose each one, and resolves the data context those sections expand. Every decision
//! that depends on backend, update policy or field type is taken here; templates only
//! substitute and iterate.

use std::{
    collections::{BTreeSet, HashSet},
    fmt,
    sync::Arc,
};

use serde::Serialize;
use tracing::debug;

use crate::{
    context::{
        BackendContext, CheckContext, DocumentContext, EntityContext, ExampleContext,
        FieldContext, IdContext, ImportContext, RouteContext, SqlContext, TemplateDataContext,
    },
    error::{GenerationError, TemplateError},
    models::{ArtifactKind, BackendFamily, EntitySpec, FieldType, ProjectContext, StorageBackend},
    naming::{pluralize, NameForms},
    type_mapping::{StorageCodec, TypeMapping, TypeMappingTable},
    validator::TimestampRole,
};

/// Banner placed at the top of generated files
pub const GENERATED_BANNER: &str = "Code generated by entigen. DO NOT EDIT.";

/// Characters of a MySQL TEXT column covered by a unique index
const MYSQL_TEXT_KEY_PREFIX: usize = 255;

/// A named template fragment. Artifacts are the concatenation of their sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Package clause, imports and sentinel errors
    ModelHeader,
    /// Stored record type
    Record,
    /// Create payload and its validation
    CreateRequest,
    /// Full-replacement payload and its validation
    UpdateRequest,
    /// Partial-update payload and its validation
    PatchRequest,
    /// Storage-access interface
    RepositoryContract,
    /// `database/sql` repository type and constructor
    SqlRepository,
    /// Insert returning the key through `RETURNING`
    PostgresInsert,
    /// Insert reading the key through `LastInsertId`
    MySqlInsert,
    /// Get, list, update and delete queries
    SqlQueries,
    /// Scanner for comma-joined list columns
    CommaListCodec,
    /// MongoDB repository
    MongoRepository,
    /// Service type with create, get, list and delete
    Service,
    /// Service full replacement
    ServiceUpdate,
    /// Service partial update
    ServicePatch,
    /// Handler type with list, get, create and delete
    Handler,
    /// Path id parsing for integer keys
    IntegerIdParser,
    /// Path id parsing for object ids
    ObjectIdParser,
    /// PUT handler
    HandlerUpdate,
    /// PATCH handler
    HandlerPatch,
    /// Route registration function
    Routes,
    /// CREATE TABLE and unique indexes
    MigrationUp,
    /// DROP TABLE
    MigrationDown,
    /// Collection creation, schema validator and indexes
    InitScript,
    /// API overview, field table, endpoints and create example
    Docs,
    /// Full-replacement example
    DocsUpdate,
    /// Partial-update example
    DocsPatch,
}

impl Section {
    /// Every section
    pub const ALL: [Section; 27] = [
        Section::ModelHeader,
        Section::Record,
        Section::CreateRequest,
        Section::UpdateRequest,
        Section::PatchRequest,
        Section::RepositoryContract,
        Section::SqlRepository,
        Section::PostgresInsert,
        Section::MySqlInsert,
        Section::SqlQueries,
        Section::CommaListCodec,
        Section::MongoRepository,
        Section::Service,
        Section::ServiceUpdate,
        Section::ServicePatch,
        Section::Handler,
        Section::IntegerIdParser,
        Section::ObjectIdParser,
        Section::HandlerUpdate,
        Section::HandlerPatch,
        Section::Routes,
        Section::MigrationUp,
        Section::MigrationDown,
        Section::InitScript,
        Section::Docs,
        Section::DocsUpdate,
        Section::DocsPatch,
    ];

    /// Template name, also the override file stem (`<name>.hbs`)
    pub fn name(&self) -> &'static str {
        match self {
            Section::ModelHeader => "model/header",
            Section::Record => "model/record",
            Section::CreateRequest => "model/create_request",
            Section::UpdateRequest => "model/update_request",
            Section::PatchRequest => "model/patch_request",
            Section::RepositoryContract => "repository/contract",
            Section::SqlRepository => "repository/sql",
            Section::PostgresInsert => "repository/postgres_insert",
            Section::MySqlInsert => "repository/mysql_insert",
            Section::SqlQueries => "repository/sql_queries",
            Section::CommaListCodec => "repository/comma_list",
            Section::MongoRepository => "repository/mongo",
            Section::Service => "service/core",
            Section::ServiceUpdate => "service/update",
            Section::ServicePatch => "service/patch",
            Section::Handler => "handler/core",
            Section::IntegerIdParser => "handler/integer_id",
            Section::ObjectIdParser => "handler/object_id",
            Section::HandlerUpdate => "handler/update",
            Section::HandlerPatch => "handler/patch",
            Section::Routes => "routes/fragment",
            Section::MigrationUp => "migration/up",
            Section::MigrationDown => "migration/down",
            Section::InitScript => "migration/init_script",
            Section::Docs => "docs/overview",
            Section::DocsUpdate => "docs/update",
            Section::DocsPatch => "docs/patch",
        }
    }

    /// Look a section up by template name
    pub fn from_name(name: &str) -> Option<Section> {
        Section::ALL.iter().copied().find(|s| s.name() == name)
    }

    /// Whether the section belongs to the full-replacement path
    pub fn is_update_path(&self) -> bool {
        matches!(
            self,
            Section::UpdateRequest
                | Section::ServiceUpdate
                | Section::HandlerUpdate
                | Section::DocsUpdate
        )
    }

    /// Whether the section belongs to the partial-update path
    pub fn is_patch_path(&self) -> bool {
        matches!(
            self,
            Section::PatchRequest | Section::ServicePatch | Section::HandlerPatch | Section::DocsPatch
        )
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One artifact to render
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactPlan {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Output path relative to the project root
    pub path: String,
    /// Content language
    pub language: String,
    /// Template sections, rendered and concatenated in order
    pub sections: Vec<Section>,
    /// Resolved data context
    #[serde(skip)]
    pub context: Arc<TemplateDataContext>,
}

/// The ordered plan for one entity
#[derive(Debug, Clone, Serialize)]
pub struct GenerationPlan {
    /// Singular entity name
    pub entity: String,
    /// Target backend
    pub backend: StorageBackend,
    /// Artifacts in output order
    pub artifacts: Vec<ArtifactPlan>,
}

impl GenerationPlan {
    /// Number of planned artifacts
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether nothing is planned
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// First plan of the given kind
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&ArtifactPlan> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }

    /// The shared data context, if anything is planned
    pub fn context(&self) -> Option<&TemplateDataContext> {
        self.artifacts.first().map(|a| a.context.as_ref())
    }
}

/// Validation result for a generation plan
#[derive(Debug, Clone)]
pub struct PlanValidation {
    /// Whether the plan is valid
    pub is_valid: bool,
    /// Validation errors
    pub errors: Vec<String>,
    /// Validation warnings
    pub warnings: Vec<String>,
}

/// Plural forms of an entity. An explicit override is used verbatim, never pluralized.
pub fn plural_forms(spec: &EntitySpec) -> NameForms {
    match &spec.plural_name {
        Some(plural) => NameForms::of(plural),
        None => NameForms::of(&pluralize(&spec.name)),
    }
}

/// Plans artifacts for an entity
#[derive(Debug, Clone, Default)]
pub struct ArtifactPlanner;

impl ArtifactPlanner {
    /// Create a planner
    pub fn new() -> Self {
        Self
    }

    /// Plan every artifact for `spec` in `context`.
    ///
    /// Pure: no I/O and no state. Fails only when a field type has no mapping.
    pub fn plan(
        &self,
        spec: &EntitySpec,
        context: &ProjectContext,
    ) -> Result<GenerationPlan, GenerationError> {
        let data = Arc::new(self.build_context(spec, context)?);
        let backend = context.storage_backend();
        let singular = &data.entity.singular.serial;
        let plural = &data.entity.plural.serial;
        let policy = spec.update_policy;
        let has_comma_lists = data
            .fields
            .iter()
            .any(|f| f.codec == StorageCodec::CommaJoined);

        let pick = |base: Vec<Section>, update: &[Section], patch: &[Section]| {
            let mut sections = base;
            if policy.plans_replace() {
                sections.extend_from_slice(update);
            }
            if policy.plans_patch() {
                sections.extend_from_slice(patch);
            }
            sections
        };

        let mut artifacts = Vec::new();
        let mut push = |kind: ArtifactKind, path: String, language: &str, sections: Vec<Section>| {
            artifacts.push(ArtifactPlan {
                kind,
                path,
                language: language.to_string(),
                sections,
                context: Arc::clone(&data),
            });
        };

        push(
            ArtifactKind::Model,
            format!("internal/{}/model.go", singular),
            "go",
            pick(
                vec![Section::ModelHeader, Section::Record, Section::CreateRequest],
                &[Section::UpdateRequest],
                &[Section::PatchRequest],
            ),
        );

        push(
            ArtifactKind::StorageContract,
            format!("internal/{}/repository.go", singular),
            "go",
            vec![Section::RepositoryContract],
        );

        let mut storage_sections = match backend {
            StorageBackend::Postgres => {
                vec![Section::SqlRepository, Section::PostgresInsert, Section::SqlQueries]
            }
            StorageBackend::MySql => {
                vec![Section::SqlRepository, Section::MySqlInsert, Section::SqlQueries]
            }
            StorageBackend::MongoDb => vec![Section::MongoRepository],
        };
        if has_comma_lists {
            storage_sections.push(Section::CommaListCodec);
        }
        push(
            ArtifactKind::StorageImpl,
            format!("internal/{}/repository_{}.go", singular, backend.file_suffix()),
            "go",
            storage_sections,
        );

        push(
            ArtifactKind::Service,
            format!("internal/{}/service.go", singular),
            "go",
            pick(
                vec![Section::Service],
                &[Section::ServiceUpdate],
                &[Section::ServicePatch],
            ),
        );

        let id_parser = match backend.family() {
            BackendFamily::RelationalStore => Section::IntegerIdParser,
            BackendFamily::DocumentStore => Section::ObjectIdParser,
        };
        push(
            ArtifactKind::Handler,
            format!("internal/handlers/{}.go", singular),
            "go",
            pick(
                vec![Section::Handler, id_parser],
                &[Section::HandlerUpdate],
                &[Section::HandlerPatch],
            ),
        );

        push(
            ArtifactKind::RouteFragment,
            format!("internal/routes/{}.go", singular),
            "go",
            vec![Section::Routes],
        );

        match backend.family() {
            BackendFamily::RelationalStore => {
                let stamp = context.migration_stamp.as_str();
                push(
                    ArtifactKind::MigrationUp,
                    format!("migrations/{}_create_{}.up.sql", stamp, plural),
                    "sql",
                    vec![Section::MigrationUp],
                );
                push(
                    ArtifactKind::MigrationDown,
                    format!("migrations/{}_create_{}.down.sql", stamp, plural),
                    "sql",
                    vec![Section::MigrationDown],
                );
            }
            BackendFamily::DocumentStore => {
                push(
                    ArtifactKind::InitScript,
                    format!("migrations/init_{}.js", plural),
                    "javascript",
                    vec![Section::InitScript],
                );
            }
        }

        push(
            ArtifactKind::Documentation,
            format!("docs/{}.md", singular),
            "markdown",
            pick(vec![Section::Docs], &[Section::DocsUpdate], &[Section::DocsPatch]),
        );

        debug!(
            entity = %spec.name,
            backend = %backend,
            policy = %policy,
            artifacts = artifacts.len(),
            "Planned artifacts"
        );

        Ok(GenerationPlan {
            entity: spec.name.clone(),
            backend,
            artifacts,
        })
    }

    /// Resolve the data context shared by every artifact of `spec`
    pub fn build_context(
        &self,
        spec: &EntitySpec,
        context: &ProjectContext,
    ) -> Result<TemplateDataContext, TemplateError> {
        let table = TypeMappingTable::for_context(context);
        let backend = table.backend();
        let family = backend.family();
        let policy = spec.update_policy;

        let singular = NameForms::of(&spec.name);
        let plural = plural_forms(spec);
        let package = singular.serial.clone();
        let import_path = format!("{}/internal/{}", context.module_root, package);

        let tag_key = match family {
            BackendFamily::RelationalStore => "db",
            BackendFamily::DocumentStore => "bson",
        };

        let id_mapping = table.identifier();
        let id_tag_value = match family {
            BackendFamily::RelationalStore => id_mapping.storage_name.to_string(),
            BackendFamily::DocumentStore => format!("{},omitempty", id_mapping.storage_name),
        };
        let id = IdContext {
            native_type: id_mapping.native_type.to_string(),
            storage_type: id_mapping.storage_type.to_string(),
            storage_name: id_mapping.storage_name.to_string(),
            record_tag: format!("json:\"id\" {}:\"{}\"", tag_key, id_tag_value),
            example: id_mapping.example_literal.to_string(),
        };

        let mut resolved: Vec<(FieldContext, TypeMapping, Option<TimestampRole>)> = Vec::new();
        for field in &spec.fields {
            let mapping = table.map_field(field)?;
            let role = TimestampRole::of(&field.name);
            let forms = NameForms::of(&field.name);
            let on_request = format!("r.{}", forms.public);
            let on_record = format!("e.{}", forms.public);

            let from_request = match field.field_type {
                FieldType::Boolean => format!("{0} != nil && *{0}", on_request),
                _ => on_request,
            };

            let yes_no = |flag: bool| if flag { "yes" } else { "no" }.to_string();

            let field_context = FieldContext {
                name: field.name.clone(),
                public: forms.public.clone(),
                serial: forms.serial.clone(),
                variable: forms.variable.clone(),
                field_type: field.field_type.as_str().to_string(),
                native_type: mapping.native_type.to_string(),
                request_type: mapping.request_type.to_string(),
                patch_type: mapping.patch_type.to_string(),
                storage_type: mapping.storage_type.to_string(),
                example: mapping.example_literal.to_string(),
                required: field.required,
                unique: field.unique,
                system_managed: role.is_some(),
                required_label: yes_no(field.required),
                unique_label: yes_no(field.unique),
                record_tag: format!("json:\"{0}\" {1}:\"{0}\"", forms.serial, tag_key),
                request_tag: format!("json:\"{}\"", forms.serial),
                patch_tag: format!("json:\"{},omitempty\"", forms.serial),
                from_request,
                value_expr: mapping.codec.value_expr(&on_record),
                scan_expr: mapping.codec.scan_expr(&on_record),
                codec: mapping.codec,
            };
            resolved.push((field_context, mapping, role));
        }

        let fields: Vec<FieldContext> = resolved.iter().map(|(f, _, _)| f.clone()).collect();
        let writable_fields: Vec<FieldContext> = resolved
            .iter()
            .filter(|(_, _, role)| role.is_none())
            .map(|(f, _, _)| f.clone())
            .collect();
        let unique_fields: Vec<FieldContext> =
            fields.iter().filter(|f| f.unique).cloned().collect();

        let checked = || {
            resolved
                .iter()
                .filter(|(f, _, role)| f.required && role.is_none())
        };
        let create_checks: Vec<CheckContext> = checked()
            .map(|(f, mapping, _)| CheckContext {
                field: f.public.clone(),
                serial: f.serial.clone(),
                predicate: mapping.zero_check.predicate(&format!("r.{}", f.public)),
                message: format!("{} is required", f.serial),
            })
            .collect();
        let replace_checks = create_checks.clone();
        let patch_checks: Vec<CheckContext> = checked()
            .filter_map(|(f, mapping, _)| {
                let predicate = mapping
                    .patch_zero_check
                    .patch_predicate(&format!("r.{}", f.public))?;
                Some(CheckContext {
                    field: f.public.clone(),
                    serial: f.serial.clone(),
                    predicate,
                    message: format!("{} must not be empty", f.serial),
                })
            })
            .collect();

        let role_field = |wanted: TimestampRole| {
            resolved
                .iter()
                .find(|(_, _, role)| *role == Some(wanted))
                .map(|(f, _, _)| f.public.clone())
        };
        let created = role_field(TimestampRole::CreatedAt);
        let updated = role_field(TimestampRole::UpdatedAt);

        let mut create_stamps = Vec::new();
        if created.is_some() || updated.is_some() {
            create_stamps.push("now := s.now().UTC()".to_string());
            for public in created.iter().chain(updated.iter()) {
                create_stamps.push(format!("e.{} = now", public));
            }
        }
        let update_stamps: Vec<String> = updated
            .iter()
            .map(|public| format!("e.{} = s.now().UTC()", public))
            .collect();

        let any_checks = !create_checks.is_empty()
            || (policy.plans_replace() && !replace_checks.is_empty())
            || (policy.plans_patch() && !patch_checks.is_empty());
        let has_time = resolved
            .iter()
            .any(|(f, _, _)| f.field_type == FieldType::Timestamp.as_str());

        let mut model_imports = vec!["errors"];
        if any_checks {
            model_imports.push("fmt");
        }
        if has_time {
            model_imports.push("time");
        }

        let codec_imports: Vec<&str> = resolved
            .iter()
            .filter_map(|(_, mapping, _)| mapping.codec.import())
            .collect();
        let storage_imports: Vec<&str> = match family {
            BackendFamily::RelationalStore => ["context", "database/sql", "errors"]
                .into_iter()
                .chain(codec_imports)
                .collect(),
            BackendFamily::DocumentStore => vec![
                "context",
                "errors",
                "go.mongodb.org/mongo-driver/bson",
                "go.mongodb.org/mongo-driver/bson/primitive",
                "go.mongodb.org/mongo-driver/mongo",
                "go.mongodb.org/mongo-driver/mongo/options",
            ],
        };

        let handler_imports = vec![
            "encoding/json",
            "errors",
            "net/http",
            "strconv",
            import_path.as_str(),
        ];
        let handlers_path = format!("{}/internal/handlers", context.module_root);

        let imports = ImportContext {
            model: go_imports(model_imports),
            storage_impl: go_imports(storage_imports),
            service: go_imports(vec!["context", "time"]),
            handler: go_imports(handler_imports),
            routes: go_imports(vec!["net/http", handlers_path.as_str()]),
        };

        let routes = build_routes(&singular, &plural, policy.plans_replace(), policy.plans_patch());

        let (sql, document) = match family {
            BackendFamily::RelationalStore => {
                (Some(build_sql(&table, &plural, &id, &resolved)), None)
            }
            BackendFamily::DocumentStore => (None, Some(build_document(&plural, &id, &resolved))),
        };

        let example_pairs = |subset: &[FieldContext]| -> Vec<(String, String)> {
            subset
                .iter()
                .map(|f| (f.serial.clone(), f.example.clone()))
                .collect()
        };
        let mut response_pairs = vec![("id".to_string(), id.example.clone())];
        response_pairs.extend(example_pairs(&fields));
        let examples = ExampleContext {
            create: json_object(&example_pairs(&writable_fields)),
            replace: json_object(&example_pairs(&writable_fields)),
            patch: json_object(&example_pairs(
                writable_fields.get(..1).unwrap_or_default(),
            )),
            response: json_object(&response_pairs),
        };

        let type_name = singular.public.clone();
        let repository_type = match backend {
            StorageBackend::Postgres => "PostgresRepository",
            StorageBackend::MySql => "MySQLRepository",
            StorageBackend::MongoDb => "MongoRepository",
        };

        Ok(TemplateDataContext {
            entity: EntityContext {
                singular,
                plural,
                package,
                type_name,
                update_policy: policy.as_str().to_string(),
            },
            module_root: context.module_root.clone(),
            import_path,
            backend: BackendContext {
                name: backend.name().to_string(),
                family: match family {
                    BackendFamily::RelationalStore => "relational_store",
                    BackendFamily::DocumentStore => "document_store",
                }
                .to_string(),
                repository_type: repository_type.to_string(),
                tag_key: tag_key.to_string(),
            },
            id,
            fields,
            writable_fields,
            unique_fields,
            create_checks,
            replace_checks,
            patch_checks,
            create_stamps,
            update_stamps,
            imports,
            routes,
            sql,
            document,
            examples,
            banner: GENERATED_BANNER.to_string(),
        })
    }

    /// Check a plan for internal consistency
    pub fn validate_plan(&self, plan: &GenerationPlan) -> PlanValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if plan.artifacts.is_empty() {
            errors.push("Generation plan has no artifacts".to_string());
        }

        let mut seen_paths = HashSet::new();
        for artifact in &plan.artifacts {
            if !seen_paths.insert(artifact.path.as_str()) {
                errors.push(format!("Duplicate artifact path: {}", artifact.path));
            }
            if artifact.sections.is_empty() {
                errors.push(format!("Artifact {} has no template sections", artifact.path));
            }
            let updates = artifact.sections.iter().filter(|s| s.is_update_path()).count();
            let patches = artifact.sections.iter().filter(|s| s.is_patch_path()).count();
            if updates > 1 || patches > 1 {
                errors.push(format!(
                    "Artifact {} repeats an update section",
                    artifact.path
                ));
            }
        }

        let kinds: BTreeSet<ArtifactKind> = plan.artifacts.iter().map(|a| a.kind).collect();
        for required in [
            ArtifactKind::Model,
            ArtifactKind::StorageContract,
            ArtifactKind::StorageImpl,
            ArtifactKind::Service,
            ArtifactKind::Handler,
            ArtifactKind::RouteFragment,
            ArtifactKind::Documentation,
        ] {
            if !kinds.contains(&required) {
                errors.push(format!("Missing {} artifact", required));
            }
        }

        let has_migrations =
            kinds.contains(&ArtifactKind::MigrationUp) && kinds.contains(&ArtifactKind::MigrationDown);
        let has_init = kinds.contains(&ArtifactKind::InitScript);
        match plan.backend.family() {
            BackendFamily::RelationalStore if !has_migrations || has_init => {
                errors.push("Relational plans need migrations and no init script".to_string());
            }
            BackendFamily::DocumentStore if !has_init || has_migrations => {
                errors.push("Document plans need an init script and no migrations".to_string());
            }
            _ => {}
        }

        if let Some(context) = plan.context() {
            if context.create_checks.is_empty() {
                warnings.push(format!(
                    "Entity {} has no required fields; create accepts an empty payload",
                    plan.entity
                ));
            }
            if context.writable_fields.is_empty() {
                warnings.push(format!(
                    "Entity {} has only system-managed fields; request payloads are empty",
                    plan.entity
                ));
            }
        }

        PlanValidation {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Deduplicate and order Go imports: standard library first, then module paths
fn go_imports(imports: Vec<&str>) -> Vec<String> {
    let unique: BTreeSet<(bool, &str)> = imports
        .into_iter()
        .map(|path| {
            let first = path.split('/').next().unwrap_or(path);
            (first.contains('.'), path)
        })
        .collect();
    unique.into_iter().map(|(_, path)| path.to_string()).collect()
}

fn build_routes(
    singular: &NameForms,
    plural: &NameForms,
    plans_replace: bool,
    plans_patch: bool,
) -> Vec<RouteContext> {
    let collection = format!("/{}", plural.serial);
    let item = format!("{}/{{id}}", collection);
    let route = |method: &str, path: &str, handler: &str, summary: String| RouteContext {
        method: method.to_string(),
        path: path.to_string(),
        handler: handler.to_string(),
        summary,
    };

    let mut routes = vec![
        route("GET", &collection, "List", format!("List {}", plural.serial)),
        route("POST", &collection, "Create", format!("Create a {}", singular.serial)),
        route("GET", &item, "Get", format!("Fetch one {} by id", singular.serial)),
    ];
    if plans_replace {
        routes.push(route("PUT", &item, "Update", format!("Replace a {}", singular.serial)));
    }
    if plans_patch {
        routes.push(route(
            "PATCH",
            &item,
            "Patch",
            format!("Partially update a {}", singular.serial),
        ));
    }
    routes.push(route("DELETE", &item, "Delete", format!("Delete a {}", singular.serial)));
    routes
}

fn build_sql(
    table: &TypeMappingTable,
    plural: &NameForms,
    id: &IdContext,
    resolved: &[(FieldContext, TypeMapping, Option<TimestampRole>)],
) -> SqlContext {
    let table_name = plural.serial.clone();
    let columns: Vec<&str> = resolved.iter().map(|(f, _, _)| f.serial.as_str()).collect();

    let insert_placeholders = (1..=columns.len())
        .map(|position| table.placeholder(position))
        .collect::<Vec<_>>()
        .join(", ");
    let insert_args = resolved
        .iter()
        .map(|(f, _, _)| f.value_expr.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let scan_args = std::iter::once("&e.ID")
        .chain(resolved.iter().map(|(f, _, _)| f.scan_expr.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    let updatable: Vec<&FieldContext> = resolved
        .iter()
        .filter(|(_, _, role)| *role != Some(TimestampRole::CreatedAt))
        .map(|(f, _, _)| f)
        .collect();
    let update_assignments = updatable
        .iter()
        .enumerate()
        .map(|(idx, f)| format!("{} = {}", f.serial, table.placeholder(idx + 1)))
        .collect::<Vec<_>>()
        .join(", ");
    let update_args = updatable
        .iter()
        .map(|f| f.value_expr.as_str())
        .chain(std::iter::once("e.ID"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut definitions = vec![format!("{} {}", id.storage_name, id.storage_type)];
    for (f, _, role) in resolved {
        let not_null = if f.required || role.is_some() { " NOT NULL" } else { "" };
        definitions.push(format!("{} {}{}", f.serial, f.storage_type, not_null));
    }
    let last = definitions.len() - 1;
    let column_lines = definitions
        .into_iter()
        .enumerate()
        .map(|(idx, line)| if idx < last { format!("{},", line) } else { line })
        .collect();

    let if_not_exists = match table.backend() {
        StorageBackend::Postgres => "IF NOT EXISTS ",
        _ => "",
    };
    let unique_indexes = resolved
        .iter()
        .filter(|(f, _, _)| f.unique)
        .map(|(f, _, _)| {
            format!(
                "CREATE UNIQUE INDEX {}uq_{}_{} ON {} ({});",
                if_not_exists,
                table_name,
                f.serial,
                table_name,
                index_key(table.backend(), f)
            )
        })
        .collect();

    let table_options = match table.backend() {
        StorageBackend::MySql => " ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        _ => "",
    };

    SqlContext {
        select_columns: format!("{}, {}", id.storage_name, columns.join(", ")),
        insert_columns: columns.join(", "),
        insert_placeholders,
        insert_args,
        scan_args,
        update_assignments,
        update_args,
        id_placeholder: table.placeholder(1),
        update_id_placeholder: table.placeholder(updatable.len() + 1),
        limit_placeholder: table.placeholder(1),
        offset_placeholder: table.placeholder(2),
        column_lines,
        unique_indexes,
        table_options: table_options.to_string(),
        table: table_name,
    }
}

/// Indexed column expression; MySQL only indexes TEXT columns through a key prefix
fn index_key(backend: StorageBackend, field: &FieldContext) -> String {
    match backend {
        StorageBackend::MySql if field.storage_type == "TEXT" => {
            format!("{}({})", field.serial, MYSQL_TEXT_KEY_PREFIX)
        }
        _ => field.serial.clone(),
    }
}

fn build_document(
    plural: &NameForms,
    id: &IdContext,
    resolved: &[(FieldContext, TypeMapping, Option<TimestampRole>)],
) -> DocumentContext {
    let collection = plural.serial.clone();

    let required: Vec<String> = resolved
        .iter()
        .filter(|(f, _, role)| f.required || role.is_some())
        .map(|(f, _, _)| format!("\"{}\"", f.serial))
        .collect();

    let mut properties = vec![format!(
        "{}: {{ bsonType: \"{}\" }}",
        id.storage_name, id.storage_type
    )];
    for (f, mapping, _) in resolved {
        properties.push(format!(
            "{}: {{ bsonType: \"{}\" }}",
            f.serial, mapping.storage_type
        ));
    }
    let last = properties.len() - 1;
    let property_lines = properties
        .into_iter()
        .enumerate()
        .map(|(idx, line)| if idx < last { format!("{},", line) } else { line })
        .collect();

    let index_lines = resolved
        .iter()
        .filter(|(f, _, _)| f.unique)
        .map(|(f, _, _)| {
            format!(
                "db.getCollection(\"{0}\").createIndex({{ {1}: 1 }}, {{ unique: true, name: \"uq_{0}_{1}\" }});",
                collection, f.serial
            )
        })
        .collect();

    DocumentContext {
        required_json: format!("[{}]", required.join(", ")),
        property_lines,
        index_lines,
        collection,
    }
}

/// Pretty-printed JSON object from pre-rendered literal values
fn json_object(pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return "{}".to_string();
    }
    let body = pairs
        .iter()
        .map(|(key, value)| format!("  \"{}\": {}", key, value))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n{}\n}}", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldSpec, ListEncoding, UpdatePolicy};

    fn invoice(policy: UpdatePolicy) -> EntitySpec {
        EntitySpec::new("invoice", policy)
            .with_field(FieldSpec::new("Amount", FieldType::Decimal).required())
            .with_field(FieldSpec::new("PaidBy", FieldType::Text).required().unique())
    }

    fn postgres() -> ProjectContext {
        ProjectContext::for_backend("github.com/acme/billing", StorageBackend::Postgres)
    }

    fn sections(plan: &GenerationPlan) -> Vec<Section> {
        plan.artifacts
            .iter()
            .flat_map(|a| a.sections.iter().copied())
            .collect()
    }

    #[test]
    fn test_relational_plan_paths() {
        let context = postgres()
            .with_migration_stamp(crate::migration::MigrationStamp::parse("20240101120000").unwrap());
        let plan = ArtifactPlanner::new()
            .plan(&invoice(UpdatePolicy::ReplaceOnly), &context)
            .unwrap();
        let paths: Vec<&str> = plan.artifacts.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "internal/invoice/model.go",
                "internal/invoice/repository.go",
                "internal/invoice/repository_postgres.go",
                "internal/invoice/service.go",
                "internal/handlers/invoice.go",
                "internal/routes/invoice.go",
                "migrations/20240101120000_create_invoices.up.sql",
                "migrations/20240101120000_create_invoices.down.sql",
                "docs/invoice.md",
            ]
        );
    }

    #[test]
    fn test_document_plan_has_init_script_only() {
        let context = ProjectContext::for_backend("github.com/acme/billing", StorageBackend::MongoDb);
        let plan = ArtifactPlanner::new()
            .plan(&invoice(UpdatePolicy::Both), &context)
            .unwrap();
        assert!(plan.artifact(ArtifactKind::InitScript).is_some());
        assert!(plan.artifact(ArtifactKind::MigrationUp).is_none());
        assert_eq!(
            plan.artifact(ArtifactKind::StorageImpl).unwrap().path,
            "internal/invoice/repository_mongo.go"
        );
        assert!(sections(&plan).contains(&Section::ObjectIdParser));
    }

    #[test]
    fn test_policy_decides_update_sections() {
        let planner = ArtifactPlanner::new();
        let replace = planner.plan(&invoice(UpdatePolicy::ReplaceOnly), &postgres()).unwrap();
        assert!(sections(&replace).iter().any(|s| s.is_update_path()));
        assert!(!sections(&replace).iter().any(|s| s.is_patch_path()));

        let patch = planner.plan(&invoice(UpdatePolicy::PatchOnly), &postgres()).unwrap();
        assert!(!sections(&patch).iter().any(|s| s.is_update_path()));
        assert!(sections(&patch).iter().any(|s| s.is_patch_path()));

        let both = planner.plan(&invoice(UpdatePolicy::Both), &postgres()).unwrap();
        let model = both.artifact(ArtifactKind::Model).unwrap();
        assert_eq!(
            model.sections.iter().filter(|s| **s == Section::UpdateRequest).count(),
            1
        );
        assert_eq!(
            model.sections.iter().filter(|s| **s == Section::PatchRequest).count(),
            1
        );
    }

    #[test]
    fn test_plural_override_used_verbatim() {
        let spec = EntitySpec::new("person", UpdatePolicy::Both)
            .with_plural("people")
            .with_field(FieldSpec::new("name", FieldType::Text));
        let plan = ArtifactPlanner::new().plan(&spec, &postgres()).unwrap();
        let context = plan.context().unwrap();
        assert_eq!(context.entity.plural.serial, "people");
        assert_eq!(context.sql.as_ref().unwrap().table, "people");
    }

    #[test]
    fn test_derived_plural() {
        let spec = EntitySpec::new("category", UpdatePolicy::Both)
            .with_field(FieldSpec::new("label", FieldType::Text));
        let context = ArtifactPlanner::new().build_context(&spec, &postgres()).unwrap();
        assert_eq!(context.entity.plural.serial, "categories");
    }

    #[test]
    fn test_checks_cover_required_non_timestamp_fields() {
        let spec = invoice(UpdatePolicy::Both)
            .with_field(FieldSpec::new("note", FieldType::Text))
            .with_field(FieldSpec::new("created_at", FieldType::Timestamp).required());
        let context = ArtifactPlanner::new().build_context(&spec, &postgres()).unwrap();
        let checked: Vec<&str> = context.create_checks.iter().map(|c| c.serial.as_str()).collect();
        assert_eq!(checked, vec!["amount", "paidby"]);
        assert_eq!(context.create_checks[0].predicate, "r.Amount == 0");
        assert_eq!(
            context.patch_checks[0].predicate,
            "r.Amount != nil && *r.Amount == 0"
        );
        assert_eq!(context.patch_checks[1].message, "paidby must not be empty");
    }

    #[test]
    fn test_timestamp_roles_excluded_from_payloads() {
        let spec = invoice(UpdatePolicy::Both)
            .with_field(FieldSpec::new("created_at", FieldType::Timestamp))
            .with_field(FieldSpec::new("UpdatedAt", FieldType::Timestamp));
        let context = ArtifactPlanner::new().build_context(&spec, &postgres()).unwrap();
        assert_eq!(context.writable_fields.len(), 2);
        assert_eq!(
            context.create_stamps,
            vec!["now := s.now().UTC()", "e.CreatedAt = now", "e.UpdatedAt = now"]
        );
        assert_eq!(context.update_stamps, vec!["e.UpdatedAt = s.now().UTC()"]);
        let sql = context.sql.unwrap();
        assert!(!sql.update_assignments.contains("created_at"));
        assert_eq!(sql.update_id_placeholder, "$4");
    }

    #[test]
    fn test_sql_fragments_per_dialect() {
        let spec = invoice(UpdatePolicy::ReplaceOnly);
        let pg = ArtifactPlanner::new().build_context(&spec, &postgres()).unwrap();
        let pg_sql = pg.sql.unwrap();
        assert_eq!(pg_sql.insert_placeholders, "$1, $2");
        assert_eq!(pg_sql.select_columns, "id, amount, paidby");
        assert_eq!(
            pg_sql.unique_indexes,
            vec!["CREATE UNIQUE INDEX IF NOT EXISTS uq_invoices_paidby ON invoices (paidby);"]
        );

        let mysql = ProjectContext::for_backend("github.com/acme/billing", StorageBackend::MySql);
        let my = ArtifactPlanner::new().build_context(&spec, &mysql).unwrap();
        let my_sql = my.sql.unwrap();
        assert_eq!(my_sql.insert_placeholders, "?, ?");
        assert_eq!(my_sql.update_assignments, "amount = ?, paidby = ?");
        assert!(my_sql.column_lines[0].starts_with("id BIGINT AUTO_INCREMENT"));
    }

    #[test]
    fn test_comma_list_codec_section_on_mysql() {
        let spec = invoice(UpdatePolicy::Both).with_field(FieldSpec::new("tags", FieldType::TextList));
        let mysql = ProjectContext::for_backend("github.com/acme/billing", StorageBackend::MySql)
            .with_list_encoding(ListEncoding::CommaJoined);
        let plan = ArtifactPlanner::new().plan(&spec, &mysql).unwrap();
        let storage = plan.artifact(ArtifactKind::StorageImpl).unwrap();
        assert!(storage.sections.contains(&Section::CommaListCodec));
        assert!(storage.context.imports.storage_impl.contains(&"strings".to_string()));
    }

    #[test]
    fn test_unique_comma_list_index_uses_key_prefix() {
        let spec = invoice(UpdatePolicy::Both)
            .with_field(FieldSpec::new("tags", FieldType::TextList).unique());
        let mysql = ProjectContext::for_backend("github.com/acme/billing", StorageBackend::MySql)
            .with_list_encoding(ListEncoding::CommaJoined);
        let sql = ArtifactPlanner::new()
            .build_context(&spec, &mysql)
            .unwrap()
            .sql
            .unwrap();
        assert_eq!(
            sql.unique_indexes,
            vec![
                "CREATE UNIQUE INDEX uq_invoices_paidby ON invoices (paidby);",
                "CREATE UNIQUE INDEX uq_invoices_tags ON invoices (tags(255));",
            ]
        );

        let pg_spec = invoice(UpdatePolicy::Both)
            .with_field(FieldSpec::new("Notes", FieldType::Text).unique());
        let pg_sql = ArtifactPlanner::new()
            .build_context(&pg_spec, &postgres())
            .unwrap()
            .sql
            .unwrap();
        assert!(pg_sql.unique_indexes[1].ends_with("ON invoices (notes);"));
    }

    #[test]
    fn test_unmapped_type_fails_planning() {
        let spec = invoice(UpdatePolicy::Both).with_field(FieldSpec::new("tags", FieldType::TextList));
        let mysql = ProjectContext::for_backend("github.com/acme/billing", StorageBackend::MySql);
        let err = ArtifactPlanner::new().plan(&spec, &mysql).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Template(TemplateError::UnmappedType { .. })
        ));
    }

    #[test]
    fn test_document_identifier_and_tags() {
        let context = ProjectContext::for_backend("github.com/acme/billing", StorageBackend::MongoDb);
        let data = ArtifactPlanner::new()
            .build_context(&invoice(UpdatePolicy::Both), &context)
            .unwrap();
        assert_eq!(data.id.native_type, "string");
        assert_eq!(data.id.record_tag, "json:\"id\" bson:\"_id,omitempty\"");
        assert_eq!(data.fields[1].record_tag, "json:\"paidby\" bson:\"paidby\"");
        let document = data.document.unwrap();
        assert_eq!(document.required_json, "[\"amount\", \"paidby\"]");
        assert_eq!(document.index_lines.len(), 1);
        assert!(data.sql.is_none());
    }

    #[test]
    fn test_go_imports_order() {
        let imports = go_imports(vec!["time", "github.com/lib/pq", "context", "time"]);
        assert_eq!(imports, vec!["context", "time", "github.com/lib/pq"]);
    }

    #[test]
    fn test_routes_follow_policy() {
        let planner = ArtifactPlanner::new();
        let data = planner
            .build_context(&invoice(UpdatePolicy::PatchOnly), &postgres())
            .unwrap();
        let methods: Vec<&str> = data.routes.iter().map(|r| r.method.as_str()).collect();
        assert_eq!(methods, vec!["GET", "POST", "GET", "PATCH", "DELETE"]);
        assert_eq!(data.routes[2].path, "/invoices/{id}");
    }

    #[test]
    fn test_validate_plan() {
        let planner = ArtifactPlanner::new();
        let mut plan = planner.plan(&invoice(UpdatePolicy::Both), &postgres()).unwrap();
        let validation = planner.validate_plan(&plan);
        assert!(validation.is_valid, "{:?}", validation.errors);

        let duplicate = plan.artifacts[0].clone();
        plan.artifacts.push(duplicate);
        let validation = planner.validate_plan(&plan);
        assert!(!validation.is_valid);
        assert!(validation.errors[0].contains("Duplicate artifact path"));
    }

    #[test]
    fn test_section_names_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_name(section.name()), Some(section));
        }
    }
}
