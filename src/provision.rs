//! Folder provisioning: materialize a working folder from the template tree.
//!
//! The destination is `<destination_root>/<iid>`. An already-existing
//! destination is reused, not wiped — copies overwrite entries with the same
//! relative path and leave everything else alone, so re-running is safe.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::FilesystemError;

/// Copy the template tree into `<destination_root>/<iid>` and return the
/// destination path. Hidden entries are copied like any other.
pub fn provision(
    template_dir: &Path,
    destination_root: &Path,
    iid: i64,
) -> Result<PathBuf, FilesystemError> {
    let destination = destination_root.join(iid.to_string());
    fs::create_dir_all(&destination).map_err(|source| FilesystemError::DestinationUnwritable {
        path: destination.clone(),
        source,
    })?;

    let entries = fs::read_dir(template_dir).map_err(|source| {
        FilesystemError::TemplateUnreadable {
            path: template_dir.to_path_buf(),
            source,
        }
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| FilesystemError::TemplateUnreadable {
            path: template_dir.to_path_buf(),
            source,
        })?;
        let from = entry.path();
        let to = destination.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|source| FilesystemError::TemplateUnreadable {
                path: from.clone(),
                source,
            })?;

        if file_type.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }

    Ok(destination)
}

/// Recursively copy a directory, overwriting files that already exist.
fn copy_tree(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| from.to_path_buf());
            FilesystemError::TemplateUnreadable {
                path,
                source: err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk failed")),
            }
        })?;

        // WalkDir only yields paths under `from`.
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|source| {
                FilesystemError::DestinationUnwritable {
                    path: target.clone(),
                    source,
                }
            })?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| FilesystemError::CopyFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_provision_creates_destination_named_after_issue_id() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template");
        fs::create_dir(&template).unwrap();
        let root = dir.path().join("work");

        let dest = provision(&template, &root, 101).unwrap();
        assert_eq!(dest, root.join("101"));
        assert!(dest.is_dir());
    }

    #[test]
    fn test_provision_copies_top_level_files() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template");
        write(&template.join("notes.md"), "notes");
        write(&template.join(".hidden"), "hidden");
        let root = dir.path().join("work");

        let dest = provision(&template, &root, 7).unwrap();
        assert_eq!(read(&dest.join("notes.md")), "notes");
        assert_eq!(read(&dest.join(".hidden")), "hidden");
    }

    #[test]
    fn test_provision_copies_nested_directories() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template");
        write(&template.join("docs/deep/readme.md"), "deep");
        write(&template.join("docs/top.md"), "top");
        let root = dir.path().join("work");

        let dest = provision(&template, &root, 7).unwrap();
        assert_eq!(read(&dest.join("docs/deep/readme.md")), "deep");
        assert_eq!(read(&dest.join("docs/top.md")), "top");
    }

    #[test]
    fn test_provision_reuses_existing_destination() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template");
        write(&template.join("from_template.md"), "template");
        let root = dir.path().join("work");
        // Pre-existing destination with an unrelated file.
        write(&root.join("7/already_here.md"), "keep me");

        let dest = provision(&template, &root, 7).unwrap();
        assert_eq!(read(&dest.join("already_here.md")), "keep me");
        assert_eq!(read(&dest.join("from_template.md")), "template");
    }

    #[test]
    fn test_provision_overwrites_same_named_entries() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template");
        write(&template.join("shared.md"), "new content");
        write(&template.join("sub/inner.md"), "new inner");
        let root = dir.path().join("work");
        write(&root.join("7/shared.md"), "old content");
        write(&root.join("7/sub/inner.md"), "old inner");

        let dest = provision(&template, &root, 7).unwrap();
        assert_eq!(read(&dest.join("shared.md")), "new content");
        assert_eq!(read(&dest.join("sub/inner.md")), "new inner");
    }

    #[test]
    fn test_provision_is_idempotent() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("template");
        write(&template.join("a.md"), "a");
        write(&template.join("sub/b.md"), "b");
        let root = dir.path().join("work");

        let first = provision(&template, &root, 7).unwrap();
        let second = provision(&template, &root, 7).unwrap();
        assert_eq!(first, second);
        assert_eq!(read(&second.join("a.md")), "a");
        assert_eq!(read(&second.join("sub/b.md")), "b");
    }

    #[test]
    fn test_provision_missing_template_is_template_unreadable() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("nonexistent");
        let root = dir.path().join("work");

        let err = provision(&template, &root, 7).unwrap_err();
        assert!(matches!(err, FilesystemError::TemplateUnreadable { .. }));
    }
}
