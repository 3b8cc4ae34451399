// Generation summary printed after `entigen generate`

use std::{path::PathBuf, time::Duration};

use entigen_generation::{ArtifactKind, GenerationResult, StorageBackend, WriteAction, WriteResult};
use serde::Serialize;

use crate::output::OutputStyle;

/// One line of the report
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Path on disk
    pub path: PathBuf,
    /// Content size
    pub bytes: usize,
    /// What the writer did
    pub action: String,
}

/// Summary of one generation run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Entity name
    pub entity: String,
    /// Target backend
    pub backend: StorageBackend,
    /// Artifacts in plan order
    pub entries: Vec<ReportEntry>,
    /// Time spent validating, planning and rendering
    #[serde(with = "millis")]
    pub render_duration: Duration,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Backups created for replaced files
    pub backups_created: usize,
}

impl GenerationReport {
    /// Build a report from the rendered batch and the writer's outcome
    pub fn new(
        result: &GenerationResult,
        written: &WriteResult,
        backend: StorageBackend,
        render_duration: Duration,
    ) -> Self {
        let entries = result
            .iter()
            .zip(&written.files)
            .map(|(artifact, file)| ReportEntry {
                kind: artifact.kind,
                path: file.path.clone(),
                bytes: file.bytes,
                action: file.action.as_str().to_string(),
            })
            .collect();

        Self {
            entity: result.entity.clone(),
            backend,
            entries,
            render_duration,
            dry_run: written.dry_run,
            backups_created: written.backups_created,
        }
    }

    /// Number of artifacts
    pub fn artifact_count(&self) -> usize {
        self.entries.len()
    }

    /// Total bytes across artifacts
    pub fn total_bytes(&self) -> usize {
        self.entries.iter().map(|e| e.bytes).sum()
    }

    /// Entries whose file replaced an existing one
    pub fn replaced(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                e.action == WriteAction::Replaced.as_str()
                    || e.action == WriteAction::WouldReplace.as_str()
            })
            .count()
    }

    /// Render the report for the terminal
    pub fn render(&self, style: &OutputStyle) -> String {
        let mut lines = Vec::new();
        let title = if self.dry_run {
            format!("Dry run: {} ({})", self.entity, self.backend)
        } else {
            format!("Generated {} ({})", self.entity, self.backend)
        };
        lines.push(style.section(&title));

        for entry in &self.entries {
            lines.push(style.list_item(&format!(
                "{:<16} {} [{}, {} bytes]",
                entry.kind.as_str(),
                style.code(&entry.path.display().to_string()),
                entry.action,
                entry.bytes
            )));
        }

        lines.push(String::new());
        lines.push(style.key_value("Artifacts", &self.artifact_count().to_string()));
        lines.push(style.key_value("Bytes", &self.total_bytes().to_string()));
        if self.replaced() > 0 {
            lines.push(style.key_value("Replaced", &self.replaced().to_string()));
        }
        if self.backups_created > 0 {
            lines.push(style.key_value("Backups", &self.backups_created.to_string()));
        }
        lines.push(style.key_value(
            "Render time",
            &format!("{} ms", self.render_duration.as_millis()),
        ));
        lines.join("\n")
    }
}

mod millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entigen_generation::{FileWriteResult, GeneratedArtifact};

    fn sample() -> GenerationReport {
        let result = GenerationResult {
            entity: "invoice".to_string(),
            artifacts: vec![
                GeneratedArtifact {
                    kind: ArtifactKind::Model,
                    path: "internal/models/invoice.go".to_string(),
                    content: "package models\n".to_string(),
                    language: "go".to_string(),
                },
                GeneratedArtifact {
                    kind: ArtifactKind::Documentation,
                    path: "docs/invoice.md".to_string(),
                    content: "# Invoice\n".to_string(),
                    language: "markdown".to_string(),
                },
            ],
        };
        let written = WriteResult {
            files: vec![
                FileWriteResult {
                    path: PathBuf::from("/out/internal/models/invoice.go"),
                    action: WriteAction::Created,
                    backup_path: None,
                    bytes: 15,
                },
                FileWriteResult {
                    path: PathBuf::from("/out/docs/invoice.md"),
                    action: WriteAction::Replaced,
                    backup_path: None,
                    bytes: 10,
                },
            ],
            files_written: 2,
            backups_created: 1,
            dry_run: false,
            rollback_info: None,
        };
        GenerationReport::new(
            &result,
            &written,
            StorageBackend::Postgres,
            Duration::from_millis(12),
        )
    }

    #[test]
    fn test_totals() {
        let report = sample();
        assert_eq!(report.artifact_count(), 2);
        assert_eq!(report.total_bytes(), 25);
        assert_eq!(report.replaced(), 1);
    }

    #[test]
    fn test_render_plain() {
        let style = OutputStyle { use_colors: false };
        let text = sample().render(&style);
        assert!(text.contains("Generated invoice (postgres)"));
        assert!(text.contains("/out/docs/invoice.md"));
        assert!(text.contains("Artifacts: 2"));
        assert!(text.contains("Backups: 1"));
        assert!(text.contains("Render time: 12 ms"));
    }

    #[test]
    fn test_serializes_duration_as_millis() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["render_duration"], 12);
        assert_eq!(json["entries"][0]["kind"], serde_json::json!(ArtifactKind::Model));
    }
}
