//! Applying scanned files to a destination tree
//!
//! [`FileSync::update_file`] replaces one file at the descriptor's relative
//! location. When the existing file cannot be removed (typically because
//! another process holds it open) it is renamed to `<name>.bak` instead, so
//! nothing is lost and the new content can still be written.
//!
//! Each call stands alone. There is no locking between calls and no rollback
//! across files.

use crate::io::{self, RobustnessConfig};
use crate::notify::MessageSink;
use crate::scan::FileDescriptor;
use crate::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Suffix appended to a file that had to be moved aside.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Result of one [`FileSync::update_file`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The previous file was kept as `<name>.bak` rather than deleted
    pub renamed_existing_to_backup: bool,
}

/// Result of trying to remove a single file.
#[derive(Debug)]
pub enum RemoveAttempt {
    Removed,
    Missing,
    /// The file exists but could not be removed
    Blocked(std::io::Error),
}

/// Remove the file at `path` and report what happened.
pub fn try_remove(path: &Path) -> RemoveAttempt {
    match fs::remove_file(path) {
        Ok(()) => RemoveAttempt::Removed,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => RemoveAttempt::Missing,
        Err(e) => RemoveAttempt::Blocked(e),
    }
}

/// Result of [`delete_file`].
#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing existed at the path
    NotFound,
    Failed(std::io::Error),
}

impl DeleteOutcome {
    /// `true` unless the file is still there.
    pub fn is_gone(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Report the outcome to the user. Successful deletions are only
    /// announced when `announce_deleted` is set.
    pub fn notify(&self, sink: &dyn MessageSink, announce_deleted: bool) {
        match self {
            Self::Deleted if announce_deleted => {
                sink.show_message("The specified file has been deleted.");
            }
            Self::Deleted => {}
            Self::NotFound => sink.show_warning("The specified file was not found."),
            Self::Failed(_) => sink.show_warning("The specified file could not be deleted."),
        }
    }
}

impl From<RemoveAttempt> for DeleteOutcome {
    fn from(attempt: RemoveAttempt) -> Self {
        match attempt {
            RemoveAttempt::Removed => Self::Deleted,
            RemoveAttempt::Missing => Self::NotFound,
            RemoveAttempt::Blocked(e) => Self::Failed(e),
        }
    }
}

/// Delete a single file.
pub fn delete_file(path: &Path) -> DeleteOutcome {
    let outcome = DeleteOutcome::from(try_remove(path));
    tracing::debug!(path = %path.display(), ?outcome, "Delete file");
    outcome
}

type Remover = Box<dyn Fn(&Path) -> RemoveAttempt + Send + Sync>;

/// Writes file content into a destination tree.
pub struct FileSync {
    robustness: RobustnessConfig,
    remover: Remover,
}

impl Default for FileSync {
    fn default() -> Self {
        Self {
            robustness: RobustnessConfig::default(),
            remover: Box::new(try_remove),
        }
    }
}

impl FileSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    /// Replace how existing files are removed, e.g. to simulate a file that
    /// is held open elsewhere.
    pub fn with_remover(
        mut self,
        remover: impl Fn(&Path) -> RemoveAttempt + Send + Sync + 'static,
    ) -> Self {
        self.remover = Box::new(remover);
        self
    }

    /// Write `bytes` to `destination_root / relative_path / name`.
    ///
    /// Missing directories are created. An existing file is removed first,
    /// or renamed to `<name>.bak` if it cannot be removed; a stale backup
    /// from an earlier call is replaced.
    ///
    /// # Errors
    ///
    /// [`Error::UnsafePath`] if the descriptor points outside the
    /// destination root, [`Error::Sync`] if a directory cannot be created,
    /// the existing file can neither be removed nor renamed, or the new
    /// content cannot be written.
    pub fn update_file(
        &self,
        descriptor: &FileDescriptor,
        destination_root: &Path,
        bytes: &[u8],
    ) -> Result<SyncOutcome> {
        let target = target_path(descriptor, destination_root)?;
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| Error::sync(dir, "cannot create directory", e))?;
        }

        let mut outcome = SyncOutcome::default();
        match (self.remover)(&target) {
            RemoveAttempt::Removed | RemoveAttempt::Missing => {}
            RemoveAttempt::Blocked(reason) => {
                let backup = backup_path(&target);
                if let RemoveAttempt::Blocked(e) = (self.remover)(&backup) {
                    tracing::debug!(
                        path = %backup.display(),
                        error = %e,
                        "Stale backup not removed"
                    );
                }
                fs::rename(&target, &backup).map_err(|e| {
                    Error::sync(
                        &target,
                        format!("existing file can be neither removed ({reason}) nor backed up"),
                        e,
                    )
                })?;
                tracing::warn!(
                    path = %target.display(),
                    backup = %backup.display(),
                    %reason,
                    "Existing file in use, kept as backup"
                );
                outcome.renamed_existing_to_backup = true;
            }
        }

        io::write_atomic(&target, bytes, self.robustness).map_err(|e| match e {
            Error::Io { path, source } => Error::sync(path, "cannot write file", source),
            other => other,
        })?;

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "Updated file");
        Ok(outcome)
    }
}

/// [`FileSync::update_file`] with default settings.
pub fn update_file(
    descriptor: &FileDescriptor,
    destination_root: &Path,
    bytes: &[u8],
) -> Result<SyncOutcome> {
    FileSync::default().update_file(descriptor, destination_root, bytes)
}

/// Where `descriptor` lands under `destination_root`.
///
/// The relative path may only descend, and the name must be a single
/// path component.
pub fn target_path(descriptor: &FileDescriptor, destination_root: &Path) -> Result<PathBuf> {
    let unsafe_path = || Error::UnsafePath {
        path: descriptor.relative_path.join(&descriptor.name),
    };

    let descends = descriptor
        .relative_path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !descends || !is_single_component(&descriptor.name) {
        return Err(unsafe_path());
    }

    Ok(destination_root
        .join(&descriptor.relative_path)
        .join(&descriptor.name))
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// `<name>.bak` next to `target`.
pub fn backup_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(BACKUP_SUFFIX);
    target.with_file_name(name)
}

/// Save `bytes` as `name` in the system temp directory.
///
/// An already staged file of the same name is left untouched.
pub fn stage_temp_file(bytes: &[u8], name: &str) -> Result<PathBuf> {
    stage_file_in(&std::env::temp_dir(), bytes, name)
}

/// Save `bytes` as `dir/name` unless that file already exists.
pub fn stage_file_in(dir: &Path, bytes: &[u8], name: &str) -> Result<PathBuf> {
    if !is_single_component(name) {
        return Err(Error::UnsafePath {
            path: PathBuf::from(name),
        });
    }

    let path = dir.join(name);
    if !path.exists() {
        io::write_atomic(&path, bytes, RobustnessConfig::default())?;
    }
    Ok(path)
}
