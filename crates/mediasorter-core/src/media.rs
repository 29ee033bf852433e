use std::path::{Path, PathBuf};

/// Kind of a scanned file, decided from its content signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Video,
    Unclassified,
}

#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Just the filename
    pub filename: String,
    /// Extension without the dot, as found on disk (case preserved)
    pub extension: Option<String>,
    /// Directory containing the file
    pub parent: PathBuf,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = std::path::absolute(&path).unwrap_or(path);
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned());
        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            path,
            filename,
            extension,
            parent,
        }
    }

    /// Filename without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn has_extension(&self, ext: &str) -> bool {
        self.extension
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    }
}
