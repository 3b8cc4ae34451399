// Print the field type mapping table for a backend

use entigen_generation::{FieldType, ListEncoding, StorageBackend, TypeMapping, TypeMappingTable};
use serde::Serialize;

use super::Command;
use crate::{
    error::{CliError, CliResult},
    output::OutputStyle,
    project::ProjectOptions,
};

/// `entigen types`
pub struct TypesCommand {
    pub options: ProjectOptions,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TypeListing<'a> {
    backend: StorageBackend,
    list_encoding: ListEncoding,
    mappings: &'a [TypeMapping],
    unmapped: Vec<&'static str>,
}

impl TypesCommand {
    pub fn new(options: ProjectOptions) -> Self {
        Self {
            options,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Backend table selected by configuration and flags
    pub fn table(&self) -> CliResult<(TypeMappingTable, ListEncoding)> {
        let config = self.options.load_config()?;
        let backend = config.storage_backend()?;
        Ok((TypeMappingTable::new(backend, config.list_encoding), config.list_encoding))
    }
}

/// Field types with no mapping on this table
pub fn unmapped_types(table: &TypeMappingTable) -> Vec<FieldType> {
    FieldType::ALL
        .iter()
        .copied()
        .filter(|field_type| table.map(*field_type).is_none())
        .collect()
}

/// Render the table as aligned columns
pub fn render_table(table: &TypeMappingTable, style: &OutputStyle) -> String {
    let mut lines = vec![style.section(&format!("Type mapping: {}", table.backend()))];
    lines.push(format!(
        "  {:<11} {:<10} {:<10} {:<10} {}",
        "FIELD", "NATIVE", "REQUEST", "PATCH", "STORAGE"
    ));

    let id = table.identifier();
    lines.push(format!(
        "  {:<11} {:<10} {:<10} {:<10} {}",
        "(id)", id.native_type, "-", "-", id.storage_type
    ));
    for mapping in table.entries() {
        lines.push(format!(
            "  {:<11} {:<10} {:<10} {:<10} {}",
            mapping.field_type.as_str(),
            mapping.native_type,
            mapping.request_type,
            mapping.patch_type,
            mapping.storage_type
        ));
    }

    let unmapped = unmapped_types(table);
    if !unmapped.is_empty() {
        let names: Vec<&str> = unmapped.iter().map(|t| t.as_str()).collect();
        lines.push(String::new());
        lines.push(style.warning(&format!(
            "Unmapped with this list encoding: {}",
            names.join(", ")
        )));
    }
    lines.join("\n")
}

#[async_trait::async_trait]
impl Command for TypesCommand {
    async fn execute(&self) -> CliResult<()> {
        let (table, list_encoding) = self.table()?;
        if self.json {
            let mappings = table.entries();
            let listing = TypeListing {
                backend: table.backend(),
                list_encoding,
                mappings: &mappings,
                unmapped: unmapped_types(&table).iter().map(|t| t.as_str()).collect(),
            };
            let json = serde_json::to_string_pretty(&listing)
                .map_err(|e| CliError::Internal(format!("Failed to serialize types: {}", e)))?;
            println!("{}", json);
        } else {
            println!("{}", render_table(&table, &OutputStyle::default()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_native_lists_are_unmapped() {
        let table = TypeMappingTable::new(StorageBackend::MySql, ListEncoding::Native);
        assert_eq!(unmapped_types(&table), vec![FieldType::TextList]);

        let text = render_table(&table, &OutputStyle { use_colors: false });
        assert!(text.contains("Unmapped with this list encoding: text-list"));
        assert!(text.contains("BIGINT AUTO_INCREMENT PRIMARY KEY"));
    }

    #[test]
    fn test_mongo_maps_everything() {
        let table = TypeMappingTable::new(StorageBackend::MongoDb, ListEncoding::Native);
        assert!(unmapped_types(&table).is_empty());
        let text = render_table(&table, &OutputStyle { use_colors: false });
        assert!(text.contains("Type mapping: mongodb"));
        assert!(text.contains("timestamp"));
    }
}
