//! Output writer for generated artifacts
//!
//! Materializes a [`GenerationResult`] as one all-or-nothing batch. Every artifact is
//! first written to a staging directory inside the target root, then moved into place.
//! If any move fails, files already moved are removed and backups of replaced files are
//! restored. Dry-run mode reports what would happen without touching the disk.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::GenerationError,
    models::{GeneratedArtifact, GenerationResult},
};

const STAGING_PREFIX: &str = ".entigen-staging-";

/// Configuration for output writing
#[derive(Debug, Clone)]
pub struct OutputWriterConfig {
    /// Preview only
    pub dry_run: bool,
    /// Replace existing files instead of failing with a conflict
    pub overwrite: bool,
    /// Back up replaced files so a failed batch can restore them
    pub create_backups: bool,
    /// Keep backups after a successful batch
    pub keep_backups: bool,
}

impl Default for OutputWriterConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            overwrite: false,
            create_backups: true,
            keep_backups: false,
        }
    }
}

/// What happened (or would happen) to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    /// New file written
    Created,
    /// Existing file replaced
    Replaced,
    /// Dry run: would be created
    WouldCreate,
    /// Dry run: would replace an existing file
    WouldReplace,
}

impl WriteAction {
    /// Human-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteAction::Created => "created",
            WriteAction::Replaced => "replaced",
            WriteAction::WouldCreate => "would create",
            WriteAction::WouldReplace => "would replace",
        }
    }
}

/// Result of writing a single file
#[derive(Debug, Clone)]
pub struct FileWriteResult {
    /// Final path of the file
    pub path: PathBuf,
    /// Action taken
    pub action: WriteAction,
    /// Backup of the replaced file, when one was kept
    pub backup_path: Option<PathBuf>,
    /// Content size
    pub bytes: usize,
}

/// Result of writing a batch
#[derive(Debug, Clone)]
pub struct WriteResult {
    /// Per-file results in artifact order
    pub files: Vec<FileWriteResult>,
    /// Files written
    pub files_written: usize,
    /// Backups created
    pub backups_created: usize,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Backups kept after success; use with [`OutputWriter::rollback`]
    pub rollback_info: Option<RollbackInfo>,
}

/// Information for rolling back a batch
#[derive(Debug, Clone, Default)]
pub struct RollbackInfo {
    /// (original path, backup path)
    pub backups: Vec<(PathBuf, PathBuf)>,
    /// Files moved into place
    pub written_files: Vec<PathBuf>,
}

/// Writes generated artifacts to disk
#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    config: OutputWriterConfig,
}

impl OutputWriter {
    /// Create a writer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom configuration
    pub fn with_config(config: OutputWriterConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &OutputWriterConfig {
        &self.config
    }

    /// Write every artifact of `result` under `target_dir`
    pub fn write(
        &self,
        result: &GenerationResult,
        target_dir: &Path,
    ) -> Result<WriteResult, GenerationError> {
        let targets = result
            .iter()
            .map(|artifact| Ok((resolve_target(target_dir, &artifact.path)?, artifact)))
            .collect::<Result<Vec<_>, GenerationError>>()?;

        let existing: Vec<PathBuf> = targets
            .iter()
            .filter(|(path, _)| path.exists())
            .map(|(path, _)| path.clone())
            .collect();
        if !existing.is_empty() && !self.config.overwrite {
            return Err(GenerationError::Conflict(existing));
        }

        if self.config.dry_run {
            let files = targets
                .iter()
                .map(|(path, artifact)| FileWriteResult {
                    path: path.clone(),
                    action: if path.exists() {
                        WriteAction::WouldReplace
                    } else {
                        WriteAction::WouldCreate
                    },
                    backup_path: None,
                    bytes: artifact.content.len(),
                })
                .collect();
            return Ok(WriteResult {
                files,
                files_written: 0,
                backups_created: 0,
                dry_run: true,
                rollback_info: None,
            });
        }

        fs::create_dir_all(target_dir).map_err(|e| {
            GenerationError::WriteFailed(format!(
                "Failed to create directory {}: {}",
                target_dir.display(),
                e
            ))
        })?;

        let staging = target_dir.join(format!("{}{}", STAGING_PREFIX, Uuid::new_v4()));
        let outcome = self
            .stage(&staging, result)
            .and_then(|_| self.commit(&staging, &targets));

        if let Err(e) = fs::remove_dir_all(&staging) {
            if staging.exists() {
                warn!(path = %staging.display(), error = %e, "Failed to remove staging directory");
            }
        }

        let (files, info) = outcome?;

        let backups_created = info.backups.len();
        let rollback_info = if self.config.keep_backups && backups_created > 0 {
            Some(info)
        } else {
            discard_backups(&info);
            None
        };

        info!(
            target = %target_dir.display(),
            files = files.len(),
            backups = backups_created,
            "Artifacts written"
        );

        Ok(WriteResult {
            files_written: files.len(),
            files,
            backups_created,
            dry_run: false,
            rollback_info,
        })
    }

    /// Preview a batch without writing
    pub fn preview(
        &self,
        result: &GenerationResult,
        target_dir: &Path,
    ) -> Result<WriteResult, GenerationError> {
        let mut config = self.config.clone();
        config.dry_run = true;
        OutputWriter::with_config(config).write(result, target_dir)
    }

    fn stage(&self, staging: &Path, result: &GenerationResult) -> Result<(), GenerationError> {
        for artifact in result.iter() {
            let staged = resolve_target(staging, &artifact.path)?;
            if let Some(parent) = staged.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    GenerationError::WriteFailed(format!(
                        "Failed to create staging directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            fs::write(&staged, &artifact.content).map_err(|e| {
                GenerationError::WriteFailed(format!(
                    "Failed to stage {}: {}",
                    artifact.path, e
                ))
            })?;
        }
        debug!(path = %staging.display(), artifacts = result.len(), "Artifacts staged");
        Ok(())
    }

    fn commit(
        &self,
        staging: &Path,
        targets: &[(PathBuf, &GeneratedArtifact)],
    ) -> Result<(Vec<FileWriteResult>, RollbackInfo), GenerationError> {
        let mut info = RollbackInfo::default();
        let mut files = Vec::with_capacity(targets.len());

        for (target, artifact) in targets {
            match self.move_into_place(staging, target, artifact, &mut info) {
                Ok(result) => files.push(result),
                Err(error) => {
                    warn!(
                        path = %target.display(),
                        error = %error,
                        "Write failed, rolling back"
                    );
                    self.rollback(&info)?;
                    return Err(error);
                }
            }
        }

        Ok((files, info))
    }

    fn move_into_place(
        &self,
        staging: &Path,
        target: &Path,
        artifact: &GeneratedArtifact,
        info: &mut RollbackInfo,
    ) -> Result<FileWriteResult, GenerationError> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GenerationError::WriteFailed(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let replacing = target.exists();
        let backup_path = if replacing && self.config.create_backups {
            let backup = backup_path_for(target);
            fs::copy(target, &backup).map_err(|e| {
                GenerationError::WriteFailed(format!(
                    "Failed to back up {}: {}",
                    target.display(),
                    e
                ))
            })?;
            info.backups.push((target.to_path_buf(), backup.clone()));
            Some(backup)
        } else {
            None
        };

        let staged = resolve_target(staging, &artifact.path)?;
        fs::rename(&staged, target).map_err(|e| {
            GenerationError::WriteFailed(format!("Failed to write {}: {}", target.display(), e))
        })?;
        info.written_files.push(target.to_path_buf());

        Ok(FileWriteResult {
            path: target.to_path_buf(),
            action: if replacing {
                WriteAction::Replaced
            } else {
                WriteAction::Created
            },
            backup_path,
            bytes: artifact.content.len(),
        })
    }

    /// Undo a batch: remove written files, then restore backups over them
    pub fn rollback(&self, info: &RollbackInfo) -> Result<(), GenerationError> {
        for file_path in &info.written_files {
            if file_path.exists() {
                fs::remove_file(file_path).map_err(|e| {
                    GenerationError::RollbackFailed(format!(
                        "Failed to remove {}: {}",
                        file_path.display(),
                        e
                    ))
                })?;
            }
        }

        for (original_path, backup_path) in &info.backups {
            if backup_path.exists() {
                fs::rename(backup_path, original_path).map_err(|e| {
                    GenerationError::RollbackFailed(format!(
                        "Failed to restore {}: {}",
                        original_path.display(),
                        e
                    ))
                })?;
            }
        }

        warn!(
            removed = info.written_files.len(),
            restored = info.backups.len(),
            "Rolled back generated files"
        );
        Ok(())
    }

    /// One-line summary of a batch
    pub fn summarize_result(&self, result: &WriteResult) -> String {
        format!(
            "Files written: {}, Backups created: {}{}",
            result.files_written,
            result.backups_created,
            if result.dry_run { " (dry-run)" } else { "" }
        )
    }
}

/// Join an artifact path onto a root, rejecting absolute paths and parent components
fn resolve_target(root: &Path, relative: &str) -> Result<PathBuf, GenerationError> {
    let relative_path = Path::new(relative);
    let escapes = relative_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if relative.is_empty() || escapes {
        return Err(GenerationError::WriteFailed(format!(
            "Artifact path '{}' must be relative to the output root",
            relative
        )));
    }
    Ok(root.join(relative_path))
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

fn discard_backups(info: &RollbackInfo) {
    for (_, backup) in &info.backups {
        if let Err(e) = fs::remove_file(backup) {
            warn!(path = %backup.display(), error = %e, "Failed to remove backup");
        }
    }
}
