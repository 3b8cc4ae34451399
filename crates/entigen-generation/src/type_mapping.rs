//! Per-backend type mapping tables
//!
//! Maps an abstract [`FieldType`] to the generated record's native Go type, the
//! storage column/document type and an example literal for documentation. Every
//! lookup either yields a complete mapping or fails; there is no default-to-text
//! fallback.

use serde::Serialize;

use crate::{
    error::TemplateError,
    models::{FieldSpec, FieldType, ListEncoding, ProjectContext, StorageBackend},
};

/// How a value is checked for its zero value in generated validation code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroCheck {
    /// `x == ""`
    EmptyString,
    /// `x == 0`
    Zero,
    /// `x.IsZero()`
    ZeroTime,
    /// `len(x) == 0`
    EmptyList,
    /// `x == nil` (boxed values)
    Nil,
}

impl ZeroCheck {
    /// Predicate that is true when `expr` holds no usable value
    pub fn predicate(&self, expr: &str) -> String {
        match self {
            ZeroCheck::EmptyString => format!("{} == \"\"", expr),
            ZeroCheck::Zero => format!("{} == 0", expr),
            ZeroCheck::ZeroTime => format!("{}.IsZero()", expr),
            ZeroCheck::EmptyList => format!("len({}) == 0", expr),
            ZeroCheck::Nil => format!("{} == nil", expr),
        }
    }

    /// Predicate for a pointer field that was supplied but holds no usable value.
    ///
    /// `None` when a supplied value can never be empty (boxed booleans).
    pub fn patch_predicate(&self, expr: &str) -> Option<String> {
        let deref = format!("*{}", expr);
        let inner = match self {
            ZeroCheck::EmptyString => format!("{} == \"\"", deref),
            ZeroCheck::Zero => format!("{} == 0", deref),
            ZeroCheck::ZeroTime => format!("{}.IsZero()", expr),
            ZeroCheck::EmptyList => format!("len({}) == 0", deref),
            ZeroCheck::Nil => return None,
        };
        Some(format!("{} != nil && {}", expr, inner))
    }
}

/// How a field crosses the storage driver boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageCodec {
    /// Passed through unchanged
    Plain,
    /// Wrapped with `pq.Array` (Postgres list columns)
    PqArray,
    /// Joined with commas on write, split on read
    CommaJoined,
}

impl StorageCodec {
    /// Expression passed as a query argument
    pub fn value_expr(&self, expr: &str) -> String {
        match self {
            StorageCodec::Plain => expr.to_string(),
            StorageCodec::PqArray => format!("pq.Array({})", expr),
            StorageCodec::CommaJoined => format!("strings.Join({}, \",\")", expr),
        }
    }

    /// Expression passed to `Scan`
    pub fn scan_expr(&self, expr: &str) -> String {
        match self {
            StorageCodec::Plain => format!("&{}", expr),
            StorageCodec::PqArray => format!("pq.Array(&{})", expr),
            StorageCodec::CommaJoined => format!("commaList{{&{}}}", expr),
        }
    }

    /// Go import the codec needs, if any
    pub fn import(&self) -> Option<&'static str> {
        match self {
            StorageCodec::Plain => None,
            StorageCodec::PqArray => Some("github.com/lib/pq"),
            StorageCodec::CommaJoined => Some("strings"),
        }
    }
}

/// Complete mapping of one field type on one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMapping {
    /// Abstract type
    pub field_type: FieldType,
    /// Go type of the record field
    pub native_type: &'static str,
    /// Go type of the field in create/replace payloads
    pub request_type: &'static str,
    /// Go type of the field in patch payloads
    pub patch_type: &'static str,
    /// Column or BSON type
    pub storage_type: &'static str,
    /// JSON example value
    pub example_literal: &'static str,
    /// Zero-value check on create/replace payloads
    pub zero_check: ZeroCheck,
    /// Zero-value check on patch payloads (before the supplied guard)
    pub patch_zero_check: ZeroCheck,
    /// Driver boundary handling
    pub codec: StorageCodec,
}

/// Mapping of the entity's primary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierMapping {
    /// Go type of the identifier
    pub native_type: &'static str,
    /// Column definition or BSON type
    pub storage_type: &'static str,
    /// JSON example value
    pub example_literal: &'static str,
    /// Column / document key
    pub storage_name: &'static str,
}

/// Fixed mapping table for one backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMappingTable {
    backend: StorageBackend,
    list_encoding: ListEncoding,
}

impl TypeMappingTable {
    /// Create the table for a backend
    pub fn new(backend: StorageBackend, list_encoding: ListEncoding) -> Self {
        Self {
            backend,
            list_encoding,
        }
    }

    /// Table selected by a project context
    pub fn for_context(context: &ProjectContext) -> Self {
        Self::new(context.storage_backend(), context.list_encoding)
    }

    /// Backend this table describes
    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    /// Look up a field type; `None` when the backend cannot store it
    pub fn map(&self, field_type: FieldType) -> Option<TypeMapping> {
        let (native_type, patch_type, example_literal, zero_check) = match field_type {
            FieldType::Text => ("string", "*string", "\"example\"", ZeroCheck::EmptyString),
            FieldType::Integer32 => ("int32", "*int32", "42", ZeroCheck::Zero),
            FieldType::Integer64 => ("int64", "*int64", "1024", ZeroCheck::Zero),
            FieldType::Decimal => ("float64", "*float64", "99.95", ZeroCheck::Zero),
            FieldType::Boolean => ("bool", "*bool", "true", ZeroCheck::Nil),
            FieldType::Timestamp => (
                "time.Time",
                "*time.Time",
                "\"2024-01-01T00:00:00Z\"",
                ZeroCheck::ZeroTime,
            ),
            FieldType::TextList => (
                "[]string",
                "*[]string",
                "[\"alpha\", \"beta\"]",
                ZeroCheck::EmptyList,
            ),
        };

        let request_type = match field_type {
            FieldType::Boolean => "*bool",
            _ => native_type,
        };

        let patch_zero_check = match field_type {
            FieldType::Boolean => ZeroCheck::Nil,
            _ => zero_check,
        };

        let (storage_type, codec) = self.storage(field_type)?;

        Some(TypeMapping {
            field_type,
            native_type,
            request_type,
            patch_type,
            storage_type,
            example_literal,
            zero_check,
            patch_zero_check,
            codec,
        })
    }

    fn storage(&self, field_type: FieldType) -> Option<(&'static str, StorageCodec)> {
        use FieldType::*;
        use StorageCodec::Plain;

        let entry = match (self.backend, field_type) {
            (StorageBackend::Postgres, Text) => ("TEXT", Plain),
            (StorageBackend::Postgres, Integer32) => ("INTEGER", Plain),
            (StorageBackend::Postgres, Integer64) => ("BIGINT", Plain),
            (StorageBackend::Postgres, Decimal) => ("NUMERIC(18,4)", Plain),
            (StorageBackend::Postgres, Boolean) => ("BOOLEAN", Plain),
            (StorageBackend::Postgres, Timestamp) => ("TIMESTAMPTZ", Plain),
            (StorageBackend::Postgres, TextList) => ("TEXT[]", StorageCodec::PqArray),

            (StorageBackend::MySql, Text) => ("VARCHAR(255)", Plain),
            (StorageBackend::MySql, Integer32) => ("INT", Plain),
            (StorageBackend::MySql, Integer64) => ("BIGINT", Plain),
            (StorageBackend::MySql, Decimal) => ("DECIMAL(18,4)", Plain),
            (StorageBackend::MySql, Boolean) => ("TINYINT(1)", Plain),
            (StorageBackend::MySql, Timestamp) => ("DATETIME(6)", Plain),
            (StorageBackend::MySql, TextList) => match self.list_encoding {
                ListEncoding::CommaJoined => ("TEXT", StorageCodec::CommaJoined),
                ListEncoding::Native => return None,
            },

            (StorageBackend::MongoDb, Text) => ("string", Plain),
            (StorageBackend::MongoDb, Integer32) => ("int", Plain),
            (StorageBackend::MongoDb, Integer64) => ("long", Plain),
            (StorageBackend::MongoDb, Decimal) => ("double", Plain),
            (StorageBackend::MongoDb, Boolean) => ("bool", Plain),
            (StorageBackend::MongoDb, Timestamp) => ("date", Plain),
            (StorageBackend::MongoDb, TextList) => ("array", Plain),
        };
        Some(entry)
    }

    /// Look up the mapping for a field, failing with a typed error when unmapped
    pub fn map_field(&self, field: &FieldSpec) -> Result<TypeMapping, TemplateError> {
        self.map(field.field_type)
            .ok_or_else(|| TemplateError::UnmappedType {
                field: field.name.clone(),
                field_type: field.field_type.to_string(),
                backend: self.backend.to_string(),
            })
    }

    /// Mapping of the primary key
    pub fn identifier(&self) -> IdentifierMapping {
        match self.backend {
            StorageBackend::Postgres => IdentifierMapping {
                native_type: "int64",
                storage_type: "BIGSERIAL PRIMARY KEY",
                example_literal: "1",
                storage_name: "id",
            },
            StorageBackend::MySql => IdentifierMapping {
                native_type: "int64",
                storage_type: "BIGINT AUTO_INCREMENT PRIMARY KEY",
                example_literal: "1",
                storage_name: "id",
            },
            StorageBackend::MongoDb => IdentifierMapping {
                native_type: "string",
                storage_type: "string",
                example_literal: "\"507f1f77bcf86cd799439011\"",
                storage_name: "_id",
            },
        }
    }

    /// Query parameter placeholder for a 1-based argument position
    pub fn placeholder(&self, position: usize) -> String {
        match self.backend {
            StorageBackend::Postgres => format!("${}", position),
            StorageBackend::MySql => "?".to_string(),
            StorageBackend::MongoDb => String::new(),
        }
    }

    /// Every mapped type on this backend, in declaration order
    pub fn entries(&self) -> Vec<TypeMapping> {
        FieldType::ALL
            .iter()
            .filter_map(|field_type| self.map(*field_type))
            .collect()
    }
}

/// Map a field type on a backend
pub fn map_type(
    field_type: FieldType,
    backend: StorageBackend,
    list_encoding: ListEncoding,
) -> Option<TypeMapping> {
    TypeMappingTable::new(backend, list_encoding).map(field_type)
}
