//! Template engine module for code generation
//!
//! Built-in section templates, project overrides and the handlebars renderer.

pub mod builtin;
pub mod engine;
pub mod loader;

pub use builtin::builtin_source;
pub use engine::TemplateRenderer;
pub use loader::{TemplateLoader, TemplateOverride};
