use std::path::Path;

use file_format::FileFormat;
use log::debug;

use crate::media::FileKind;

/// Map a MIME type (`image/jpeg`, `video/avi`, ...) to a kind by its major type.
pub fn kind_from_mime(mime: &str) -> FileKind {
    match mime.split('/').next() {
        Some("image") => FileKind::Image,
        Some("video") => FileKind::Video,
        _ => FileKind::Unclassified,
    }
}

/// Detect the kind of a file from its leading bytes, never from its name.
/// Unreadable and empty files are unclassified.
pub fn classify(path: &Path) -> FileKind {
    match FileFormat::from_file(path) {
        Ok(format) => {
            let kind = kind_from_mime(format.media_type());
            debug!("{}: detected {} ({:?})", path.display(), format.media_type(), kind);
            kind
        }
        Err(e) => {
            debug!("{}: signature unreadable: {}", path.display(), e);
            FileKind::Unclassified
        }
    }
}
