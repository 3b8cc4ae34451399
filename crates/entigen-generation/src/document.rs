//! Entity documents
//!
//! YAML or JSON descriptions of an entity as a user writes them. Field types and the
//! update policy stay raw strings until conversion so that unknown values surface as the
//! right error kind, in the same order the validator checks a typed [`EntitySpec`].

use std::{fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{GenerationError, TemplateError},
    models::{EntitySpec, FieldSpec, FieldType, ProjectContext, UpdatePolicy},
    type_mapping::TypeMappingTable,
    validator::EntityValidator,
};

/// Backend label used when a type is unknown before any backend is chosen
const ANY_BACKEND: &str = "any";

/// One field as written in an entity document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDocument {
    /// Field name
    pub name: String,
    /// Type name, canonical or alias
    #[serde(rename = "type")]
    pub field_type: String,
    /// Required on create and full replace
    #[serde(default)]
    pub required: bool,
    /// Unique constraint
    #[serde(default)]
    pub unique: bool,
}

/// An entity as written in a YAML/JSON document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDocument {
    /// Singular entity name
    pub name: String,
    /// Explicit plural
    #[serde(default)]
    pub plural: Option<String>,
    /// Ordered fields
    #[serde(default)]
    pub fields: Vec<FieldDocument>,
    /// Update policy name
    #[serde(alias = "updatePolicy", alias = "policy")]
    pub update_policy: String,
}

impl EntityDocument {
    /// Parse a YAML document
    pub fn from_yaml_str(source: &str) -> Result<Self, GenerationError> {
        serde_yaml::from_str(source)
            .map_err(|e| GenerationError::Document(format!("invalid YAML: {}", e)))
    }

    /// Parse a JSON document
    pub fn from_json_str(source: &str) -> Result<Self, GenerationError> {
        serde_json::from_str(source)
            .map_err(|e| GenerationError::Document(format!("invalid JSON: {}", e)))
    }

    /// Load a document from disk; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_path(path: &Path) -> Result<Self, GenerationError> {
        let source = fs::read_to_string(path)?;
        debug!(path = %path.display(), "Loading entity document");

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }

    /// Convert to a typed entity.
    ///
    /// Checks run in order: identifiers, uniqueness, non-empty fields, update policy,
    /// field types (against the context's backend when one is given), timestamp roles.
    pub fn into_spec(self, context: Option<&ProjectContext>) -> Result<EntitySpec, GenerationError> {
        let validator = EntityValidator::new();

        let field_names: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        validator.validate_names(&self.name, self.plural.as_deref(), &field_names)?;

        let update_policy = UpdatePolicy::from_str(&self.update_policy)?;

        let table = context.map(TypeMappingTable::for_context);
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            let field_type =
                FieldType::parse(&field.field_type).ok_or_else(|| TemplateError::UnmappedType {
                    field: field.name.clone(),
                    field_type: field.field_type.clone(),
                    backend: table
                        .map(|t| t.backend().to_string())
                        .unwrap_or_else(|| ANY_BACKEND.to_string()),
                })?;

            let spec = FieldSpec {
                name: field.name,
                field_type,
                required: field.required,
                unique: field.unique,
            };
            if let Some(table) = &table {
                table.map_field(&spec)?;
            }
            fields.push(spec);
        }

        let spec = EntitySpec {
            name: self.name,
            plural_name: self.plural,
            fields,
            update_policy,
        };
        validator.validate(&spec)?;
        Ok(spec)
    }
}

impl From<&EntitySpec> for EntityDocument {
    fn from(spec: &EntitySpec) -> Self {
        Self {
            name: spec.name.clone(),
            plural: spec.plural_name.clone(),
            fields: spec
                .fields
                .iter()
                .map(|f| FieldDocument {
                    name: f.name.clone(),
                    field_type: f.field_type.as_str().to_string(),
                    required: f.required,
                    unique: f.unique,
                })
                .collect(),
            update_policy: spec.update_policy.as_str().to_string(),
        }
    }
}
