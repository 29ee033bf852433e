use std::path::PathBuf;

use crate::media::MediaFile;

/// Side-car extensions in lookup order.
const SIDECAR_EXTENSIONS: &[&str] = &["THM", "thm"];

/// Companion metadata file stored next to a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidecar {
    pub path: PathBuf,
    pub filename: String,
}

/// Only AVI videos are paired with side-cars.
pub fn wants_sidecar(file: &MediaFile) -> bool {
    file.has_extension("avi")
}

/// Find `<stem>.THM` or `<stem>.thm` next to the file, uppercase first.
pub fn find_sidecar(file: &MediaFile) -> Option<Sidecar> {
    let stem = file.stem();
    SIDECAR_EXTENSIONS.iter().find_map(|ext| {
        let filename = format!("{}.{}", stem, ext);
        let path = file.parent.join(&filename);
        path.is_file().then_some(Sidecar { path, filename })
    })
}
