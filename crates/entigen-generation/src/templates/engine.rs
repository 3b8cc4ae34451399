//! Template renderer
//!
//! Expands planned artifacts through `handlebars`. The registry runs in strict mode with
//! HTML escaping disabled, so a template referencing absent data fails instead of
//! printing nothing, and generated code is emitted byte for byte.

use handlebars::{no_escape, Handlebars, RenderError, RenderErrorReason};
use tracing::debug;

use crate::{
    context::TemplateDataContext,
    error::TemplateError,
    models::{ArtifactKind, GeneratedArtifact},
    planner::{ArtifactPlan, Section},
    templates::{builtin::builtin_source, loader::TemplateOverride},
};

#[allow(missing_docs)]
mod helpers {
    use handlebars::handlebars_helper;
    use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

    use crate::naming::pluralize;

    handlebars_helper!(pascal: |value: str| value.to_pascal_case());
    handlebars_helper!(camel: |value: str| value.to_lower_camel_case());
    handlebars_helper!(snake: |value: str| value.to_snake_case());
    handlebars_helper!(upper: |value: str| value.to_shouty_snake_case());
    handlebars_helper!(lower: |value: str| value.to_lowercase());
    handlebars_helper!(plural: |value: str| pluralize(value));
}

use helpers::{camel, lower, pascal, plural, snake, upper};

/// Renders artifact plans
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
    overridden: Vec<Section>,
}

impl TemplateRenderer {
    /// Create a renderer with every built-in section registered
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);

        registry.register_helper("pascal", Box::new(pascal));
        registry.register_helper("camel", Box::new(camel));
        registry.register_helper("snake", Box::new(snake));
        registry.register_helper("upper", Box::new(upper));
        registry.register_helper("lower", Box::new(lower));
        registry.register_helper("plural", Box::new(plural));

        let mut renderer = Self {
            registry,
            overridden: Vec::new(),
        };
        for section in Section::ALL {
            renderer.register(section, builtin_source(section))?;
        }
        Ok(renderer)
    }

    /// Create a renderer and apply project overrides on top of the built-ins
    pub fn with_overrides(overrides: Vec<TemplateOverride>) -> Result<Self, TemplateError> {
        let mut renderer = Self::new()?;
        for template in overrides {
            renderer.override_section(template.section, &template.source)?;
        }
        Ok(renderer)
    }

    /// Replace a section's template
    pub fn override_section(&mut self, section: Section, source: &str) -> Result<(), TemplateError> {
        self.register(section, source)?;
        if !self.overridden.contains(&section) {
            self.overridden.push(section);
        }
        debug!(section = %section, "Template section overridden");
        Ok(())
    }

    /// Replace a section's template by name
    pub fn override_named(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        let section =
            Section::from_name(name).ok_or_else(|| TemplateError::UnknownSection(name.to_string()))?;
        self.override_section(section, source)
    }

    /// Sections replaced by overrides
    pub fn overridden(&self) -> &[Section] {
        &self.overridden
    }

    fn register(&mut self, section: Section, source: &str) -> Result<(), TemplateError> {
        self.registry
            .register_template_string(section.name(), source)
            .map_err(|e| TemplateError::InvalidSource {
                section: section.name().to_string(),
                message: e.to_string(),
            })
    }

    /// Render one planned artifact.
    ///
    /// Sections are rendered in plan order and joined by a blank line.
    pub fn render(&self, plan: &ArtifactPlan) -> Result<GeneratedArtifact, TemplateError> {
        let mut parts = Vec::with_capacity(plan.sections.len());
        for section in &plan.sections {
            let rendered = self.render_section(*section, plan.kind, &plan.context)?;
            parts.push(rendered.trim_end().to_string());
        }

        let mut content = parts.join("\n\n");
        content.push('\n');

        debug!(
            kind = %plan.kind,
            path = %plan.path,
            sections = plan.sections.len(),
            bytes = content.len(),
            "Rendered artifact"
        );

        Ok(GeneratedArtifact {
            kind: plan.kind,
            path: plan.path.clone(),
            content,
            language: plan.language.clone(),
        })
    }

    /// Render a single section against a data context
    pub fn render_section(
        &self,
        section: Section,
        artifact: ArtifactKind,
        data: &TemplateDataContext,
    ) -> Result<String, TemplateError> {
        if !self.registry.has_template(section.name()) {
            return Err(TemplateError::UnknownSection(section.name().to_string()));
        }
        self.registry
            .render(section.name(), data)
            .map_err(|e| render_error(artifact, e))
    }

    /// Render an ad-hoc template string against a data context
    pub fn render_str(
        &self,
        artifact: ArtifactKind,
        source: &str,
        data: &TemplateDataContext,
    ) -> Result<String, TemplateError> {
        self.registry
            .render_template(source, data)
            .map_err(|e| render_error(artifact, e))
    }
}

fn render_error(artifact: ArtifactKind, err: RenderError) -> TemplateError {
    let artifact = artifact.as_str().to_string();
    match err.reason() {
        RenderErrorReason::MissingVariable(_) => TemplateError::MissingData {
            artifact,
            message: err.to_string(),
        },
        RenderErrorReason::HelperNotFound(helper) => TemplateError::UnknownHelper {
            artifact,
            helper: helper.clone(),
        },
        RenderErrorReason::TemplateNotFound(name) => TemplateError::UnknownSection(name.clone()),
        _ => TemplateError::Render {
            artifact,
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{EntitySpec, FieldSpec, FieldType, ProjectContext, StorageBackend, UpdatePolicy},
        planner::ArtifactPlanner,
    };

    fn invoice_context(backend: StorageBackend) -> TemplateDataContext {
        let spec = EntitySpec::new("invoice", UpdatePolicy::Both)
            .with_field(FieldSpec::new("Amount", FieldType::Decimal).required())
            .with_field(FieldSpec::new("PaidBy", FieldType::Text).required().unique());
        let context = ProjectContext::for_backend("github.com/acme/billing", backend);
        ArtifactPlanner::new().build_context(&spec, &context).unwrap()
    }

    #[test]
    fn test_record_section() {
        let renderer = TemplateRenderer::new().unwrap();
        let out = renderer
            .render_section(
                Section::Record,
                ArtifactKind::Model,
                &invoice_context(StorageBackend::Postgres),
            )
            .unwrap();
        assert!(out.contains("type Invoice struct {"));
        assert!(out.contains("ID int64 `json:\"id\" db:\"id\"`"));
        assert!(out.contains("PaidBy string `json:\"paidby\" db:\"paidby\"`"));
    }

    #[test]
    fn test_no_html_escaping() {
        let renderer = TemplateRenderer::new().unwrap();
        let out = renderer
            .render_section(
                Section::CreateRequest,
                ArtifactKind::Model,
                &invoice_context(StorageBackend::Postgres),
            )
            .unwrap();
        assert!(out.contains("if r.PaidBy == \"\" {"));
        assert!(!out.contains("&quot;"));
    }

    #[test]
    fn test_helpers() {
        let renderer = TemplateRenderer::new().unwrap();
        let data = invoice_context(StorageBackend::Postgres);
        let out = renderer
            .render_str(
                ArtifactKind::Documentation,
                "{{pascal entity.singular.raw}} {{plural entity.singular.raw}} {{upper \"paidBy\"}} {{snake \"PaidBy\"}} {{camel \"paid_by\"}} {{lower \"ABC\"}}",
                &data,
            )
            .unwrap();
        assert_eq!(out, "Invoice invoices PAID_BY paid_by paidBy abc");
    }

    #[test]
    fn test_unknown_helper() {
        let renderer = TemplateRenderer::new().unwrap();
        let err = renderer
            .render_str(
                ArtifactKind::Model,
                "{{shout entity.type_name}}",
                &invoice_context(StorageBackend::Postgres),
            )
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnknownHelper { ref helper, .. } if helper == "shout"));
    }

    #[test]
    fn test_missing_data_in_strict_mode() {
        let renderer = TemplateRenderer::new().unwrap();
        let err = renderer
            .render_section(
                Section::MigrationUp,
                ArtifactKind::MigrationUp,
                &invoice_context(StorageBackend::MongoDb),
            )
            .unwrap_err();
        assert!(matches!(err, TemplateError::MissingData { ref artifact, .. } if artifact == "migration-up"));
    }

    #[test]
    fn test_override_replaces_section() {
        let mut renderer = TemplateRenderer::new().unwrap();
        renderer
            .override_named("migration/down", "DROP TABLE {{sql.table}} CASCADE;")
            .unwrap();
        assert_eq!(renderer.overridden(), &[Section::MigrationDown]);

        let out = renderer
            .render_section(
                Section::MigrationDown,
                ArtifactKind::MigrationDown,
                &invoice_context(StorageBackend::Postgres),
            )
            .unwrap();
        assert_eq!(out, "DROP TABLE invoices CASCADE;");
    }

    #[test]
    fn test_override_with_unknown_name() {
        let mut renderer = TemplateRenderer::new().unwrap();
        let err = renderer.override_named("model/nope", "x").unwrap_err();
        assert!(matches!(err, TemplateError::UnknownSection(_)));
    }

    #[test]
    fn test_invalid_override_source() {
        let mut renderer = TemplateRenderer::new().unwrap();
        let err = renderer
            .override_section(Section::Record, "{{#each fields}}unterminated")
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidSource { .. }));
    }
}
