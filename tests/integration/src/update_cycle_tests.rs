//! End-to-end update cycle
//!
//! A publisher scans a release tree and ships its manifest inside an
//! envelope. A client compares the manifest with its own install, pulls the
//! changed files as compressed bytes and applies them, keeping any file that
//! is in use as a backup.

use insight_data::{ColumnType, Envelope, Field, Record, from_table, to_table};
use insight_fs::sync::try_remove;
use insight_fs::{
    ExtensionFilter, FileDescriptor, FileSync, RemoveAttempt, Scanner, compress, decompress, scan,
};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest line as the client stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ManifestEntry {
    name: String,
    folder: String,
    version: String,
}

impl Record for ManifestEntry {
    fn schema() -> &'static [Field] {
        const FIELDS: &[Field] = &[
            Field::new("name", ColumnType::Text).alias("FileName"),
            Field::new("folder", ColumnType::Text).alias("Path"),
            Field::new("version", ColumnType::Text).alias("Version"),
        ];
        FIELDS
    }
}

impl From<&FileDescriptor> for ManifestEntry {
    fn from(d: &FileDescriptor) -> Self {
        Self {
            name: d.name.clone(),
            folder: d.relative_path.to_string_lossy().into_owned(),
            version: d.version.clone(),
        }
    }
}

fn write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Version readers keyed on content so both sides agree without real PE files.
fn content_version(path: &Path) -> Option<String> {
    let bytes = fs::read(path).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.strip_prefix("v").map(|rest| rest.split(':').next().unwrap_or("").to_string())
}

fn publish(release: &Path) -> Envelope {
    let manifest = Scanner::new(release)
        .filter(".dll|.exe".parse().unwrap())
        .version_reader(content_version)
        .scan()
        .unwrap();
    Envelope::success(&manifest).unwrap()
}

fn key(d: &FileDescriptor) -> (PathBuf, String) {
    (d.relative_path.clone(), d.name.clone())
}

#[test]
fn client_applies_changed_files_and_keeps_busy_ones() {
    let release = TempDir::new().unwrap();
    write(release.path(), "app.exe", b"v2:app");
    write(release.path(), "lib/core.dll", b"v2:core");
    write(release.path(), "lib/util.dll", b"v1:util");
    write(release.path(), "readme.txt", b"not shipped");

    let install = TempDir::new().unwrap();
    write(install.path(), "app.exe", b"v1:app");
    write(install.path(), "lib/util.dll", b"v1:util");

    // Wire transfer of the manifest.
    let wire = insight_data::serialize(&publish(release.path())).unwrap();
    let envelope: Envelope = insight_data::deserialize(Some(&wire)).unwrap();
    assert!(envelope.successful);
    let manifest: Vec<FileDescriptor> = envelope.payload().unwrap();
    assert_eq!(manifest.len(), 3);

    let local = Scanner::new(install.path())
        .filter(ExtensionFilter::Any)
        .version_reader(content_version)
        .scan()
        .unwrap();

    let outdated: Vec<&FileDescriptor> = manifest
        .iter()
        .filter(|remote| {
            !local
                .iter()
                .any(|l| key(l) == key(remote) && l.version == remote.version)
        })
        .collect();
    let mut outdated_names: Vec<&str> = outdated.iter().map(|d| d.name.as_str()).collect();
    outdated_names.sort();
    assert_eq!(outdated_names, vec!["app.exe", "core.dll"]);

    // app.exe is running on the client.
    let running = install.path().join("app.exe");
    let sync = FileSync::new().with_remover({
        let running = running.clone();
        move |path: &Path| {
            if path == running {
                RemoveAttempt::Blocked(std::io::Error::other("in use"))
            } else {
                try_remove(path)
            }
        }
    });

    let mut backups = 0;
    for remote in outdated {
        let packed = compress(&fs::read(&remote.full_path).unwrap()).unwrap();
        let bytes = decompress(&packed).unwrap();
        let outcome = sync.update_file(remote, install.path(), &bytes).unwrap();
        if outcome.renamed_existing_to_backup {
            backups += 1;
        }
    }

    assert_eq!(backups, 1);
    assert_eq!(fs::read(&running).unwrap(), b"v2:app");
    assert_eq!(fs::read(install.path().join("app.exe.bak")).unwrap(), b"v1:app");
    assert_eq!(
        fs::read(install.path().join("lib").join("core.dll")).unwrap(),
        b"v2:core"
    );
    assert!(!install.path().join("readme.txt").exists());
}

#[test]
fn manifest_survives_table_round_trip() {
    let release = TempDir::new().unwrap();
    write(release.path(), "bin/a.dll", b"v3:a");
    write(release.path(), "b.exe", b"plain");

    let descriptors = Scanner::new(release.path())
        .version_reader(content_version)
        .scan()
        .unwrap();
    let entries: Vec<ManifestEntry> = descriptors.iter().map(ManifestEntry::from).collect();

    let table = to_table(&entries).unwrap();
    let columns: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["FileName", "Path", "Version"]);

    let restored: Vec<ManifestEntry> = from_table(&table).unwrap();
    assert_eq!(restored, entries);
    assert!(restored.iter().any(|e| e.name == "a.dll" && e.version == "3"));
    assert!(restored.iter().any(|e| e.name == "b.exe" && e.version.is_empty()));
}

#[test]
fn compressed_tree_round_trip() {
    let source = TempDir::new().unwrap();
    write(source.path(), "empty.dat", b"");
    write(source.path(), "nested/deep/data.bin", &[7u8; 4096]);

    let dest = TempDir::new().unwrap();
    for d in scan(source.path(), &ExtensionFilter::Any).unwrap() {
        let packed = compress(&fs::read(&d.full_path).unwrap()).unwrap();
        insight_fs::update_file(&d, dest.path(), &decompress(&packed).unwrap()).unwrap();
    }

    assert_eq!(fs::read(dest.path().join("empty.dat")).unwrap(), b"");
    assert_eq!(
        fs::read(dest.path().join("nested").join("deep").join("data.bin")).unwrap(),
        vec![7u8; 4096]
    );
}
