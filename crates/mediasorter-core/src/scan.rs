use std::fs;
use std::path::Path;

use anyhow::Context;
use log::warn;
use walkdir::{DirEntry, WalkDir};

use crate::media::MediaFile;

/// Every regular file below `source`, in a stable order. Symlinks to files are
/// included; symlinked directories are not descended into.
///
/// The listing is taken up front, so files copied during the run (when the
/// target lives inside the source) are never visited.
pub fn scan_source(source: &Path) -> anyhow::Result<Vec<MediaFile>> {
    let root = source
        .canonicalize()
        .with_context(|| format!("resolve source directory {}", source.display()))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if is_file(&entry) => files.push(MediaFile::new(entry.into_path())),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry under {}: {}", root.display(), e),
        }
    }
    Ok(files)
}

fn is_file(entry: &DirEntry) -> bool {
    if entry.path_is_symlink() {
        return fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false);
    }
    entry.file_type().is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scan_recurses_and_sorts() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/nested")).unwrap();
        fs::write(dir.path().join("z.jpg"), b"z").unwrap();
        fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        fs::write(dir.path().join("b/nested/c.avi"), b"c").unwrap();
        fs::write(dir.path().join(".hidden.png"), b"h").unwrap();

        let files = scan_source(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec![".hidden.png", "a.jpg", "c.avi", "z.jpg"]);
        assert!(files.iter().all(|f| f.path.is_absolute()));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_follows_file_symlinks() {
        let dir = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        fs::write(elsewhere.path().join("real.jpg"), b"r").unwrap();
        fs::create_dir(elsewhere.path().join("album")).unwrap();
        fs::write(elsewhere.path().join("album/inner.jpg"), b"i").unwrap();
        std::os::unix::fs::symlink(elsewhere.path().join("real.jpg"), dir.path().join("link.jpg")).unwrap();
        std::os::unix::fs::symlink(elsewhere.path().join("album"), dir.path().join("album")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.jpg"), dir.path().join("dangling.jpg")).unwrap();

        let files = scan_source(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["link.jpg"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(scan_source(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempdir().unwrap();
        assert!(scan_source(&dir.path().join("nope")).is_err());
    }
}
