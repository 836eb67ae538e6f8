//! Recursive file tree scanning
//!
//! A scan walks every directory under a root and describes each file that
//! passes the extension filter. Descriptors are plain data: they are built
//! fresh on every scan and never updated afterwards.

use crate::hash::path_id;
use crate::version::{PeVersionReader, VersionReader};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

/// Metadata identifying one scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Hash of `full_path`; changes when the file moves, not when it is edited
    pub id: String,
    /// File name including extension
    pub name: String,
    /// Containing directory relative to the scan root, empty for the root itself
    pub relative_path: PathBuf,
    pub full_path: PathBuf,
    /// Embedded file version, empty when the file has none
    pub version: String,
}

/// Which files a scan reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtensionFilter {
    #[default]
    Any,
    /// Extensions with a leading dot, stored lowercase
    Only(BTreeSet<String>),
}

impl ExtensionFilter {
    /// Filter on the given extensions. A missing leading dot is added.
    pub fn only<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext != ".")
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        Self::Only(set)
    }

    /// Whether a file at `path` passes. Extension comparison ignores ASCII case.
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            Self::Any => true,
            Self::Only(set) => path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
                .is_some_and(|ext| set.contains(&ext)),
        }
    }
}

impl FromStr for ExtensionFilter {
    type Err = Infallible;

    /// Parses `*.*`, `*` or an empty string as [`ExtensionFilter::Any`], and
    /// otherwise a `|`-separated list such as `.exe|.dll`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "*" || s == "*.*" {
            return Ok(Self::Any);
        }
        Ok(Self::only(s.split('|')))
    }
}

/// What to do with a directory that cannot be read during a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnreadablePolicy {
    /// Log a warning and continue with the rest of the tree
    #[default]
    Skip,
    /// Abort the scan with [`Error::Scan`]
    Fail,
}

/// Configurable tree scanner.
pub struct Scanner {
    root: PathBuf,
    filter: ExtensionFilter,
    on_unreadable: UnreadablePolicy,
    version_reader: Box<dyn VersionReader>,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: ExtensionFilter::Any,
            on_unreadable: UnreadablePolicy::default(),
            version_reader: Box::new(PeVersionReader),
        }
    }

    pub fn filter(mut self, filter: ExtensionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn on_unreadable(mut self, policy: UnreadablePolicy) -> Self {
        self.on_unreadable = policy;
        self
    }

    pub fn version_reader(mut self, reader: impl VersionReader + 'static) -> Self {
        self.version_reader = Box::new(reader);
        self
    }

    /// Walk the tree and describe every matching file.
    ///
    /// Files within one directory come back sorted by name. Subdirectories
    /// are always descended into, whatever the filter. Symbolic links are
    /// followed and reported under their own path.
    ///
    /// Entries that cannot be described (unreadable directories, dangling
    /// links, link loops, names that are not valid UTF-8) are handled by the
    /// scanner's [`UnreadablePolicy`].
    ///
    /// # Errors
    ///
    /// [`Error::Scan`] if the root is missing, is not a directory or cannot
    /// be listed, and for undescribable entries under
    /// [`UnreadablePolicy::Fail`].
    pub fn scan(&self) -> Result<Vec<FileDescriptor>> {
        let root = self.checked_root()?;
        let mut descriptors = Vec::new();

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                    self.unreadable(path, e.to_string())?;
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.filter.matches(entry.path()) {
                continue;
            }
            match self.describe(&root, entry.path()) {
                Some(descriptor) => descriptors.push(descriptor),
                None => {
                    let message = "file name is not valid UTF-8";
                    self.unreadable(entry.path().to_path_buf(), message)?;
                }
            }
        }

        tracing::debug!(root = %root.display(), files = descriptors.len(), "Scan complete");
        Ok(descriptors)
    }

    fn checked_root(&self) -> Result<PathBuf> {
        let scan_error = |message: String| Error::Scan {
            path: self.root.clone(),
            message,
        };

        let root = dunce::canonicalize(&self.root).map_err(|e| scan_error(e.to_string()))?;
        if !root.is_dir() {
            return Err(scan_error("not a directory".into()));
        }
        std::fs::read_dir(&root).map_err(|e| scan_error(e.to_string()))?;
        Ok(root)
    }

    /// Apply the unreadable policy to an entry the walk could not describe.
    fn unreadable(&self, path: PathBuf, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        match self.on_unreadable {
            UnreadablePolicy::Skip => {
                tracing::warn!(
                    path = %path.display(),
                    error = %message,
                    "Skipping unreadable entry"
                );
                Ok(())
            }
            UnreadablePolicy::Fail => Err(Error::Scan { path, message }),
        }
    }

    /// `None` when the file name has no exact string form.
    fn describe(&self, root: &Path, path: &Path) -> Option<FileDescriptor> {
        let name = path.file_name()?.to_str()?.to_string();
        let relative_path = path
            .parent()
            .and_then(|dir| dir.strip_prefix(root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Some(FileDescriptor {
            id: path_id(path),
            name,
            relative_path,
            full_path: path.to_path_buf(),
            version: self.version_reader.read_version(path).unwrap_or_default(),
        })
    }
}

/// Scan `root` with the default version reader and skip policy.
pub fn scan(root: &Path, filter: &ExtensionFilter) -> Result<Vec<FileDescriptor>> {
    Scanner::new(root).filter(filter.clone()).scan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("*.*", ExtensionFilter::Any)]
    #[case("*", ExtensionFilter::Any)]
    #[case("", ExtensionFilter::Any)]
    #[case(".exe|.dll", ExtensionFilter::only([".exe", ".dll"]))]
    #[case(" .EXE | dll ", ExtensionFilter::only([".exe", ".dll"]))]
    fn parses_filter(#[case] input: &str, #[case] expected: ExtensionFilter) {
        assert_eq!(input.parse::<ExtensionFilter>().unwrap(), expected);
    }

    #[rstest]
    #[case("lib/app.dll", true)]
    #[case("lib/APP.DLL", true)]
    #[case("notes.txt", false)]
    #[case("Makefile", false)]
    #[case("archive.dll.bak", false)]
    fn matches_extension(#[case] path: &str, #[case] expected: bool) {
        let filter = ExtensionFilter::only([".dll"]);
        assert_eq!(filter.matches(Path::new(path)), expected);
    }

    #[test]
    fn descriptor_wire_shape() {
        let descriptor = FileDescriptor {
            id: "ABC".into(),
            name: "app.dll".into(),
            relative_path: PathBuf::from("bin"),
            full_path: PathBuf::from("/srv/bin/app.dll"),
            version: "1.0.0.0".into(),
        };
        insta::assert_snapshot!(serde_json::to_string_pretty(&descriptor).unwrap(), @r#"
        {
          "id": "ABC",
          "name": "app.dll",
          "relative_path": "bin",
          "full_path": "/srv/bin/app.dll",
          "version": "1.0.0.0"
        }
        "#);
    }

    #[test]
    fn any_matches_files_without_extension() {
        assert!(ExtensionFilter::Any.matches(Path::new("Makefile")));
    }
}
