//! Template override loading
//!
//! A project may carry a templates directory holding `<section>.hbs` files, for example
//! `model/record.hbs`. Each file found replaces the built-in section of the same name.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{error::TemplateError, planner::Section};

/// One project-supplied section template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOverride {
    /// Section replaced
    pub section: Section,
    /// File the source was read from
    pub path: PathBuf,
    /// Template source
    pub source: String,
}

/// Loads template overrides from a directory
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    root: PathBuf,
}

impl TemplateLoader {
    /// Create a loader rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory searched for overrides
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that would override `section`
    pub fn override_path(&self, section: Section) -> PathBuf {
        let mut path = self.root.clone();
        for component in section.name().split('/') {
            path.push(component);
        }
        path.set_extension("hbs");
        path
    }

    /// Read every override present under the root.
    ///
    /// A missing root is an error; stray `.hbs` files that name no section are skipped
    /// with a warning.
    pub fn load(&self) -> Result<Vec<TemplateOverride>, TemplateError> {
        if !self.root.is_dir() {
            return Err(TemplateError::Load {
                path: self.root.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "template directory does not exist",
                ),
            });
        }

        let mut overrides = Vec::new();
        for section in Section::ALL {
            let path = self.override_path(section);
            if !path.is_file() {
                continue;
            }
            let source = fs::read_to_string(&path).map_err(|source| TemplateError::Load {
                path: path.clone(),
                source,
            })?;
            debug!(section = %section, path = %path.display(), "Loaded template override");
            overrides.push(TemplateOverride {
                section,
                path,
                source,
            });
        }

        for stray in self.unknown_files()? {
            warn!(path = %stray.display(), "Ignoring template file that names no section");
        }

        Ok(overrides)
    }

    /// `.hbs` files under the root that do not correspond to any section
    pub fn unknown_files(&self) -> Result<Vec<PathBuf>, TemplateError> {
        let mut found = Vec::new();
        collect_templates(&self.root, &mut found)?;

        let known: Vec<PathBuf> = Section::ALL.iter().map(|s| self.override_path(*s)).collect();
        found.retain(|path| !known.contains(path));
        found.sort();
        Ok(found)
    }
}

fn collect_templates(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), TemplateError> {
    let load_error = |source| TemplateError::Load {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(load_error)? {
        let path = entry.map_err(load_error)?.path();
        if path.is_dir() {
            collect_templates(&path, found)?;
        } else if path.extension().is_some_and(|ext| ext == "hbs") {
            found.push(path);
        }
    }
    Ok(())
}
