//! Structural validation of entity descriptions
//!
//! Runs before any planning or rendering. Checks are applied in a fixed order and the
//! first violation is reported.

use std::{collections::HashMap, sync::OnceLock};

use regex::Regex;
use tracing::debug;

use crate::{
    error::{GenerationError, ValidationError},
    models::{EntitySpec, FieldType, ProjectContext},
    naming::public_identifier,
    type_mapping::TypeMappingTable,
};

/// Go keywords and predeclared identifiers that cannot name a package or field
const RESERVED_WORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
    "package", "range", "return", "select", "struct", "switch", "type", "var",
];

/// Names that collide with the entity's primary key
const RESERVED_FIELDS: &[&str] = &["id", "_id"];

/// Exported identifiers the generated request and record types already declare
const GENERATED_MEMBERS: &[&str] = &["ID", "Id", "Validate", "ToRecord", "Apply"];

/// Packages shared by every entity in the generated tree
const SHARED_PACKAGES: &[&str] = &["handlers", "routes"];

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"))
}

/// Whether `name` is a valid identifier in the generated language whose exported form
/// starts with a letter
pub fn is_valid_identifier(name: &str) -> bool {
    identifier_pattern().is_match(name)
        && !RESERVED_WORDS.contains(&name.to_lowercase().as_str())
        && public_identifier(name)
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
}

/// System-managed timestamp roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampRole {
    /// Set once on create
    CreatedAt,
    /// Refreshed on every update and patch
    UpdatedAt,
}

impl TimestampRole {
    /// Role a field name fills, if any (`created_at`, `CreatedAt`, `createdat` all match)
    pub fn of(field_name: &str) -> Option<Self> {
        let normalized: String = field_name
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "createdat" => Some(TimestampRole::CreatedAt),
            "updatedat" => Some(TimestampRole::UpdatedAt),
            _ => None,
        }
    }

    /// Role name
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampRole::CreatedAt => "createdAt",
            TimestampRole::UpdatedAt => "updatedAt",
        }
    }
}

/// Validates entity descriptions
#[derive(Debug, Clone, Default)]
pub struct EntityValidator;

impl EntityValidator {
    /// Create a validator
    pub fn new() -> Self {
        Self
    }

    /// Validate an entity without project context.
    ///
    /// Order: identifiers, uniqueness, non-empty field list, timestamp roles. The update
    /// policy is a closed enum on [`EntitySpec`]; raw documents check it on conversion.
    pub fn validate(&self, spec: &EntitySpec) -> Result<(), ValidationError> {
        let field_names: Vec<&str> = spec.fields.iter().map(|f| f.name.as_str()).collect();
        self.validate_names(&spec.name, spec.plural_name.as_deref(), &field_names)?;
        self.check_timestamp_roles(spec)?;
        debug!(entity = %spec.name, fields = spec.fields.len(), "Entity passed validation");
        Ok(())
    }

    /// Name-level checks shared with raw entity documents: identifiers, the entity's
    /// package name, uniqueness and a non-empty field list
    pub fn validate_names(
        &self,
        entity: &str,
        plural: Option<&str>,
        field_names: &[&str],
    ) -> Result<(), ValidationError> {
        self.check_identifiers(entity, plural, field_names)?;
        self.check_package_name(entity)?;
        self.check_unique_names(field_names)?;
        self.check_non_empty(entity, field_names)
    }

    /// Validate an entity and check every field type is mapped for the context's backend
    pub fn validate_for_context(
        &self,
        spec: &EntitySpec,
        context: &ProjectContext,
    ) -> Result<(), GenerationError> {
        self.validate(spec)?;
        let table = TypeMappingTable::for_context(context);
        for field in &spec.fields {
            table.map_field(field)?;
        }
        Ok(())
    }

    fn check_identifiers(
        &self,
        entity: &str,
        plural: Option<&str>,
        field_names: &[&str],
    ) -> Result<(), ValidationError> {
        if !is_valid_identifier(entity) {
            return Err(ValidationError::InvalidIdentifier {
                subject: "entity name".to_string(),
                value: entity.to_string(),
            });
        }

        if let Some(plural) = plural {
            if !is_valid_identifier(plural) {
                return Err(ValidationError::InvalidIdentifier {
                    subject: "plural name".to_string(),
                    value: plural.to_string(),
                });
            }
        }

        for name in field_names {
            if !is_valid_identifier(name) {
                return Err(ValidationError::InvalidIdentifier {
                    subject: "field name".to_string(),
                    value: name.to_string(),
                });
            }
        }

        Ok(())
    }

    /// The entity name doubles as its Go package and directory
    fn check_package_name(&self, entity: &str) -> Result<(), ValidationError> {
        if entity != entity.to_lowercase() {
            return Err(ValidationError::EntityNameCase(entity.to_string()));
        }
        if SHARED_PACKAGES.contains(&entity) {
            return Err(ValidationError::SharedPackageName(entity.to_string()));
        }
        Ok(())
    }

    fn check_unique_names(&self, field_names: &[&str]) -> Result<(), ValidationError> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut exported: HashMap<String, &str> = HashMap::new();

        for name in field_names {
            let folded = name.to_lowercase();
            let public = public_identifier(name);
            if RESERVED_FIELDS.contains(&folded.as_str()) || public.eq_ignore_ascii_case("id") {
                return Err(ValidationError::ReservedField {
                    field: name.to_string(),
                });
            }
            if GENERATED_MEMBERS.contains(&public.as_str()) {
                return Err(ValidationError::GeneratedMemberClash {
                    field: name.to_string(),
                    identifier: public,
                });
            }
            if let Some(first) = seen.get(&folded) {
                return Err(ValidationError::DuplicateField {
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
            if let Some(first) = exported.get(&public) {
                return Err(ValidationError::IdentifierCollision {
                    first: first.to_string(),
                    second: name.to_string(),
                    identifier: public,
                });
            }
            seen.insert(folded, *name);
            exported.insert(public, *name);
        }

        Ok(())
    }

    fn check_non_empty(&self, entity: &str, field_names: &[&str]) -> Result<(), ValidationError> {
        if field_names.is_empty() {
            return Err(ValidationError::EmptyFields {
                entity: entity.to_string(),
            });
        }
        Ok(())
    }

    fn check_timestamp_roles(&self, spec: &EntitySpec) -> Result<(), ValidationError> {
        let mut claimed: HashMap<TimestampRole, &str> = HashMap::new();

        for field in &spec.fields {
            let Some(role) = TimestampRole::of(&field.name) else {
                continue;
            };

            if let Some(first) = claimed.get(&role) {
                return Err(ValidationError::DuplicateTimestampRole {
                    role: role.as_str().to_string(),
                    first: first.to_string(),
                    second: field.name.clone(),
                });
            }

            if field.field_type != FieldType::Timestamp {
                return Err(ValidationError::TimestampRoleType {
                    field: field.name.clone(),
                    role: role.as_str().to_string(),
                    found: field.field_type.to_string(),
                });
            }

            claimed.insert(role, &field.name);
        }

        Ok(())
    }
}
