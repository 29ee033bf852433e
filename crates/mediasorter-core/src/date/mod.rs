pub mod container;
pub mod exif;
pub mod sidecar;

use chrono::NaiveDateTime;
use log::debug;

use crate::media::{FileKind, MediaFile};
use sidecar::Sidecar;

/// Where the timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Exif,
    Sidecar,
    Container,
}

/// Result of date resolution: the timestamp plus any side-car that travels with the file.
#[derive(Debug, Clone)]
pub struct ResolvedDate {
    pub timestamp: Option<NaiveDateTime>,
    pub source: Option<DateSource>,
    pub sidecar: Option<Sidecar>,
}

impl ResolvedDate {
    fn absent(sidecar: Option<Sidecar>) -> Self {
        Self {
            timestamp: None,
            source: None,
            sidecar,
        }
    }

    fn found(timestamp: Option<NaiveDateTime>, source: DateSource, sidecar: Option<Sidecar>) -> Self {
        Self {
            source: timestamp.map(|_| source),
            timestamp,
            sidecar,
        }
    }
}

/// Resolve the creation timestamp of a classified file.
///
/// Images are read through the EXIF reader chain. AVI videos with a `.THM`
/// side-car are dated from the side-car's tags; every other video falls back
/// to the container's own creation date. A missing date is not an error.
pub fn resolve_date(file: &MediaFile, kind: FileKind) -> ResolvedDate {
    match kind {
        FileKind::Image => {
            let date = exif::extract_exif_date(&file.path);
            ResolvedDate::found(date, DateSource::Exif, None)
        }
        FileKind::Video => {
            let sidecar = if sidecar::wants_sidecar(file) {
                sidecar::find_sidecar(file)
            } else {
                None
            };
            match sidecar {
                Some(sc) => {
                    debug!("{}: reading tags from side-car {}", file.filename, sc.filename);
                    let date = exif::extract_exif_date(&sc.path);
                    ResolvedDate::found(date, DateSource::Sidecar, Some(sc))
                }
                None => {
                    let date = container::extract_container_date(&file.path);
                    ResolvedDate::found(date, DateSource::Container, None)
                }
            }
        }
        FileKind::Unclassified => ResolvedDate::absent(None),
    }
}
